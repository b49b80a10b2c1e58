//! Domain entities - Core business objects

pub mod user;
pub mod message;
pub mod command;

pub use user::User;
pub use message::{Message, Reply, ReplySink};
pub use command::{CommandHandler, CommandRegistry};
