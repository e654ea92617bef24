//! Order service wire schema
//!
//! This module mirrors the message schema of the remote order service:
//! - Records: `OrderDto`, `OrderPlanDto`, `PlanDto`, `AnyBlob`
//! - Operations: one request/response pair per remote call, addressed on the
//!   bus by the names in [`rpc::action`]

pub mod rpc;
pub mod types;

// Re-exports
pub use rpc::*;
pub use types::*;
