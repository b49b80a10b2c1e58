//! Application services - Startup, dispatch loop and shutdown orchestration

pub mod host;
pub mod runner;

pub use host::BotHost;
pub use runner::BotRunner;
