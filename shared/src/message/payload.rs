//! Payloads carried inside [`BusMessage`](super::BusMessage)
//!
//! All payloads are JSON. Requests address a remote operation by `action`;
//! every reply (unary response, stream item, stream end) is a
//! [`ResponsePayload`].

use serde::{Deserialize, Serialize};

/// 握手载荷 (客户端 -> 订单服务)，连接建立后的第一帧
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakePayload {
    /// 协议版本，服务端据此拒绝不兼容的客户端
    pub version: u16,
    pub client_name: String,
    pub client_version: String,
}

impl HandshakePayload {
    /// Handshake for the current [`PROTOCOL_VERSION`](super::PROTOCOL_VERSION)
    pub fn new(client_name: impl Into<String>, client_version: impl Into<String>) -> Self {
        Self {
            version: super::PROTOCOL_VERSION,
            client_name: client_name.into(),
            client_version: client_version.into(),
        }
    }
}

/// Remote operation call
///
/// `params` is the operation's request message, e.g. for
/// `order.user_detail`: `{ "order_id": "...", "user_id": "..." }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestCommandPayload {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl RequestCommandPayload {
    pub fn new(action: impl Into<String>, params: Option<serde_json::Value>) -> Self {
        Self {
            action: action.into(),
            params,
        }
    }
}

/// Reply to a command
///
/// On failure `error_code` holds an RPC status code name such as
/// `NOT_FOUND`; `data` is only meaningful on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsePayload {
    pub success: bool,
    /// 描述信息 (失败时为错误原因)
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl ResponsePayload {
    pub fn ok(message: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            error_code: None,
        }
    }

    pub fn failure(message: impl Into<String>, code: Option<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error_code: code,
        }
    }
}
