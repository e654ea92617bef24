//! Remote call status
//!
//! The failure value returned by every [`OrderServiceChannel`] call. Codes
//! follow the usual RPC status vocabulary and travel on the bus as the
//! `error_code` of a failed [`ResponsePayload`].
//!
//! [`OrderServiceChannel`]: crate::channel::OrderServiceChannel

use shared::message::ResponsePayload;
use std::fmt;
use std::str::FromStr;

/// RPC status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcCode {
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    FailedPrecondition,
    Aborted,
    Unimplemented,
    Internal,
    Unavailable,
    Unauthenticated,
}

impl RpcCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::FailedPrecondition => "FAILED_PRECONDITION",
            Self::Aborted => "ABORTED",
            Self::Unimplemented => "UNIMPLEMENTED",
            Self::Internal => "INTERNAL",
            Self::Unavailable => "UNAVAILABLE",
            Self::Unauthenticated => "UNAUTHENTICATED",
        }
    }
}

impl FromStr for RpcCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CANCELLED" => Ok(Self::Cancelled),
            "UNKNOWN" => Ok(Self::Unknown),
            "INVALID_ARGUMENT" => Ok(Self::InvalidArgument),
            "DEADLINE_EXCEEDED" => Ok(Self::DeadlineExceeded),
            "NOT_FOUND" => Ok(Self::NotFound),
            "ALREADY_EXISTS" => Ok(Self::AlreadyExists),
            "PERMISSION_DENIED" => Ok(Self::PermissionDenied),
            "FAILED_PRECONDITION" => Ok(Self::FailedPrecondition),
            "ABORTED" => Ok(Self::Aborted),
            "UNIMPLEMENTED" => Ok(Self::Unimplemented),
            "INTERNAL" => Ok(Self::Internal),
            "UNAVAILABLE" => Ok(Self::Unavailable),
            "UNAUTHENTICATED" => Ok(Self::Unauthenticated),
            _ => Err(()),
        }
    }
}

impl fmt::Display for RpcCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failed remote call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("status: {code}, message: {message:?}")]
pub struct RpcStatus {
    pub code: RpcCode,
    pub message: String,
}

impl RpcStatus {
    pub fn new(code: RpcCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(RpcCode::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(RpcCode::Internal, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(RpcCode::Unavailable, message)
    }

    pub fn deadline_exceeded(message: impl Into<String>) -> Self {
        Self::new(RpcCode::DeadlineExceeded, message)
    }

    /// Build the failed response payload carrying this status
    pub fn to_response(&self) -> ResponsePayload {
        ResponsePayload::failure(self.message.clone(), Some(self.code.as_str().to_string()))
    }
}

impl From<&ResponsePayload> for RpcStatus {
    /// Unrecognised or missing codes become `UNKNOWN`.
    fn from(payload: &ResponsePayload) -> Self {
        let code = payload
            .error_code
            .as_deref()
            .and_then(|c| c.parse().ok())
            .unwrap_or(RpcCode::Unknown);
        Self::new(code, payload.message.clone())
    }
}
