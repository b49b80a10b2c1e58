//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Errors: Error taxonomy for config, plugins and handlers
//! - Messaging: Tokenizer and dispatcher
//! - Lifecycle: Ready/Exit events and the shutdown state machine
//! - Services: Host startup and the dispatch loop

pub mod errors;
pub mod lifecycle;
pub mod messaging;
pub mod services;
