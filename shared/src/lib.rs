//! Shared types for the order client
//!
//! Common types used by the order client and its peers, including the
//! message bus envelope, the order service wire schema and domain models.

pub mod message;
pub mod models;
pub mod order;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Message bus re-exports (for convenient access)
pub use message::{BusMessage, EventType};
