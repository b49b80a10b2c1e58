//! Message tokenizer - Splits a message body into argument tokens

use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Separator characters, including the non-ASCII spaces chat clients insert
/// (no-break, ideographic, the U+2000 block, BOM).
const WHITESPACE: &str = "\t\n\u{b}\u{c}\r \u{a0}\u{1680}\u{2000}-\u{200a}\u{2028}\u{2029}\u{202f}\u{205f}\u{3000}\u{feff}";

/// One token: a run of quoted strings and non-space characters.
static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r#"(".+?"|[^{}]+?)+"#, WHITESPACE)).expect("valid token regex")
});

/// A closed `"..."` pair inside a token.
static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""(.+?)""#).expect("valid quote regex"));

/// Split `raw` on whitespace, keeping each `"..."` run as part of a single
/// token with its quote characters removed.
///
/// Returns `None` when there is nothing to dispatch. An unmatched quote is
/// kept as literal text.
pub fn tokenize(raw: &str) -> Option<Vec<String>> {
    let tokens: Vec<String> = TOKEN
        .find_iter(raw)
        .map(|m| QUOTED.replace_all(m.as_str(), "$1").into_owned())
        .collect();

    if tokens.is_empty() {
        None
    } else {
        Some(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_input_has_nothing_to_dispatch() {
        assert_eq!(tokenize(""), None);
        assert_eq!(tokenize("   "), None);
        assert_eq!(tokenize("\t \n  "), None);
    }

    #[test]
    fn test_unicode_spaces_are_blank() {
        assert_eq!(tokenize("\u{3000}"), None);
        assert_eq!(tokenize("\u{a0}\u{a0}"), None);
        assert_eq!(tokenize("\u{2003}\u{feff} \u{202f}"), None);
    }

    #[test]
    fn test_unicode_spaces_split_tokens() {
        assert_eq!(tokenize("!echo\u{3000}hi").unwrap(), vec!["!echo", "hi"]);
        assert_eq!(tokenize("\u{feff}!ping\u{a0}now").unwrap(), vec!["!ping", "now"]);
        assert_eq!(tokenize("!echo \"\u{3000}你好 世界\"").unwrap(), vec!["!echo", "\u{3000}你好 世界"]);
    }

    #[test]
    fn test_splits_on_whitespace() {
        assert_eq!(
            tokenize("  !roll  2d6\tnow ").unwrap(),
            vec!["!roll", "2d6", "now"]
        );
    }

    #[test]
    fn test_quoted_run_is_one_token() {
        assert_eq!(
            tokenize(r#"!echo hello "big world""#).unwrap(),
            vec!["!echo", "hello", "big world"]
        );
    }

    #[test]
    fn test_quotes_inside_token_are_stripped() {
        assert_eq!(tokenize(r#"!set name="Ada Lovelace""#).unwrap(), vec!["!set", "name=Ada Lovelace"]);
    }

    #[test]
    fn test_unmatched_quote_is_literal() {
        assert_eq!(tokenize(r#"!say "hi there"#).unwrap(), vec!["!say", "\"hi", "there"]);
    }

    #[test]
    fn test_command_name_is_first_token() {
        let tokens = tokenize("!helloworld").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0], "!helloworld");
    }
}
