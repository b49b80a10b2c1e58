//! Message handling - Tokenizing and routing inbound messages

pub mod dispatcher;
pub mod tokenizer;

pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use tokenizer::tokenize;
