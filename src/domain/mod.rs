//! Domain layer - Core objects shared by the host and plugins
//!
//! This layer contains:
//! - Entities: User, Message, per-plugin CommandRegistry
//! - Traits: Transport abstraction for the chat service

pub mod entities;
pub mod traits;
