//! Client error types

use crate::status::RpcStatus;
use std::fmt;
use thiserror::Error;

/// Adapter operation that issued a remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateOrder,
    ProcessOrder,
    GetUserOrderDetail,
    GetUserOrderHistory,
    /// Receiving from an already opened history stream
    GetUserOrderHistoryStream,
}

impl Operation {
    /// Fixed label naming the adapter, the operation and the remote call
    pub fn label(&self) -> &'static str {
        match self {
            Self::CreateOrder => "OrderRpcApi - CreateOrder - OrderService.CreateOrder",
            Self::ProcessOrder => "OrderRpcApi - ProcessOrder - OrderService.ProcessOrderSaga",
            Self::GetUserOrderDetail => {
                "OrderRpcApi - GetUserOrderDetail - OrderService.GetUserOrderDetail"
            }
            Self::GetUserOrderHistory => {
                "OrderRpcApi - GetUserOrderHistory - OrderService.GetUserOrderHistory"
            }
            Self::GetUserOrderHistoryStream => {
                "OrderRpcApi - GetUserOrderHistory - OrderService.GetUserOrderHistory (stream)"
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Order adapter error type
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Remote call failed
    #[error("{operation}: {source}")]
    Rpc {
        operation: Operation,
        #[source]
        source: RpcStatus,
    },

    /// Caller cancelled before the remote call completed
    #[error("{operation}: cancelled by caller")]
    Cancelled { operation: Operation },

    /// Response lacked a required record
    #[error("{operation}: response missing `{field}`")]
    InvalidResponse {
        operation: Operation,
        field: &'static str,
    },

    /// Notification value could not be encoded (strict encoding only)
    #[error("failed to encode notification value for key `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Detached create task did not complete
    #[error("detached create task failed: {0}")]
    Detached(#[from] tokio::task::JoinError),
}

impl AdapterError {
    /// Remote status behind this error, if the remote call failed
    pub fn rpc_status(&self) -> Option<&RpcStatus> {
        match self {
            Self::Rpc { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Rpc { operation, .. }
            | Self::Cancelled { operation }
            | Self::InvalidResponse { operation, .. } => Some(*operation),
            Self::Encode { .. } => Some(Operation::ProcessOrder),
            Self::Detached(_) => Some(Operation::CreateOrder),
        }
    }
}

/// Result type for adapter operations
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Message bus error type
#[derive(Debug, Error)]
pub enum MessageError {
    /// Connection failed or was lost
    #[error("Connection error: {0}")]
    Connection(String),

    /// Transport I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No response within the configured timeout
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Malformed frame or unexpected message
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Payload (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TLS configuration error
    #[error("TLS error: {0}")]
    Tls(String),
}

impl From<MessageError> for RpcStatus {
    fn from(err: MessageError) -> Self {
        match err {
            MessageError::Timeout(msg) => RpcStatus::deadline_exceeded(msg),
            MessageError::Serialization(e) => RpcStatus::internal(e.to_string()),
            MessageError::InvalidMessage(msg) => RpcStatus::internal(msg),
            other => RpcStatus::unavailable(other.to_string()),
        }
    }
}
