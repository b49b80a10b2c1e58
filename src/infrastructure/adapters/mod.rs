//! Chat service transports

pub mod console;
pub mod telegram;

pub use console::ConsoleTransport;
pub use telegram::TelegramTransport;
