//! Order Client - adapter for the remote order service
//!
//! Wraps the order service's remote operations behind [`OrderRpcApi`], which
//! speaks in domain [`Order`] entities. Calls travel over the message bus
//! (TCP, TLS or in-memory) through [`BusOrderChannel`].

pub mod adapter;
pub mod channel;
pub mod config;
pub mod error;
pub mod message;
pub mod status;

pub use adapter::{OrderRpcApi, encode_notification};
pub use channel::{BusOrderChannel, OrderServiceChannel, OrderStream};
pub use config::{AdapterConfig, BlobEncoding, ClientConfig};
pub use error::{AdapterError, AdapterResult, MessageError, Operation};
pub use status::{RpcCode, RpcStatus};

// Message types and clients
pub use message::{BusMessage, EventType, MessageClient, MessageClientConfig};

// Re-export shared types for convenience
pub use shared::models::{CreateOrderRequest, Order, OrderPlan};
pub use shared::order::{AnyBlob, OrderDto, OrderPlanDto, OrderStatus, PlanDto};
pub use tokio_util::sync::CancellationToken;
