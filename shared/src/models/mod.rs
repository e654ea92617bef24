//! Data models
//!
//! Domain entities handed to callers of the order client. Built fresh from
//! wire records on every call; nothing here is persisted.

pub mod order;

// Re-exports
pub use order::*;
