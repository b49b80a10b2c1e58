use std::fmt;

/// Author of an inbound message
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct User {
    pub id: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub is_bot: bool,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: None,
            first_name: None,
            is_bot: false,
        }
    }

    /// Build a user flagged as a bot account
    pub fn bot(id: impl Into<String>) -> Self {
        Self {
            is_bot: true,
            ..Self::new(id)
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_first_name(mut self, first: impl Into<String>) -> Self {
        self.first_name = Some(first.into());
        self
    }

    pub fn display_name(&self) -> String {
        if let Some(ref username) = self.username {
            username.clone()
        } else if let Some(ref first) = self.first_name {
            first.clone()
        } else {
            self.id.clone()
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_prefers_username() {
        let user = User::new("42").with_first_name("Ada").with_username("ada");
        assert_eq!(user.to_string(), "ada");
        assert_eq!(User::new("42").with_first_name("Ada").to_string(), "Ada");
        assert_eq!(User::new("42").to_string(), "42");
    }

    #[test]
    fn test_bot_flag() {
        assert!(User::bot("7").is_bot);
        assert!(!User::new("7").is_bot);
    }
}
