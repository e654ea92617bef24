//! Message bus envelope
//!
//! Every frame between the order client and the order service is a
//! [`BusMessage`]. Replies and stream messages point back at the request
//! they answer through `correlation_id`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub mod payload;
pub use payload::*;

/// 协议版本号 (v3: 增加流式响应)
pub const PROTOCOL_VERSION: u16 = 3;

/// Frame kind, encoded as the first byte of every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventType {
    Handshake = 0,
    RequestCommand = 1,
    /// Unary reply, or a failure that ends a stream
    Response = 2,
    StreamItem = 3,
    /// Stream terminator; carries success or the stream's error
    StreamEnd = 4,
}

impl EventType {
    const ALL: [EventType; 5] = [
        Self::Handshake,
        Self::RequestCommand,
        Self::Response,
        Self::StreamItem,
        Self::StreamEnd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Handshake => "handshake",
            Self::RequestCommand => "request_command",
            Self::Response => "response",
            Self::StreamItem => "stream_item",
            Self::StreamEnd => "stream_end",
        }
    }
}

impl TryFrom<u8> for EventType {
    /// The unrecognised byte
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|t| *t as u8 == value)
            .ok_or(value)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 消息总线消息体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusMessage {
    pub request_id: Uuid,
    pub event_type: EventType,
    /// 指向被响应请求的 request_id (RPC 响应 / 流消息)
    pub correlation_id: Option<Uuid>,
    pub payload: Vec<u8>,
}

impl BusMessage {
    pub fn new(event_type: EventType, payload: Vec<u8>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            event_type,
            correlation_id: None,
            payload,
        }
    }

    /// 序列化载荷并创建消息
    pub fn encode<T: Serialize>(event_type: EventType, payload: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(event_type, serde_json::to_vec(payload)?))
    }

    pub fn with_correlation_id(mut self, id: Uuid) -> Self {
        self.correlation_id = Some(id);
        self
    }

    pub fn handshake(payload: &HandshakePayload) -> Result<Self, serde_json::Error> {
        Self::encode(EventType::Handshake, payload)
    }

    pub fn request_command(payload: &RequestCommandPayload) -> Result<Self, serde_json::Error> {
        Self::encode(EventType::RequestCommand, payload)
    }

    /// Unary reply to `request_id`
    pub fn response(request_id: Uuid, payload: &ResponsePayload) -> Result<Self, serde_json::Error> {
        Self::reply(EventType::Response, request_id, payload)
    }

    /// One record of the stream opened by `request_id`
    pub fn stream_item(request_id: Uuid, payload: &ResponsePayload) -> Result<Self, serde_json::Error> {
        Self::reply(EventType::StreamItem, request_id, payload)
    }

    /// End of the stream opened by `request_id`
    pub fn stream_end(request_id: Uuid, payload: &ResponsePayload) -> Result<Self, serde_json::Error> {
        Self::reply(EventType::StreamEnd, request_id, payload)
    }

    fn reply(
        event_type: EventType,
        request_id: Uuid,
        payload: &ResponsePayload,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::encode(event_type, payload)?.with_correlation_id(request_id))
    }

    /// 是否终止某个流 (结束标记或失败响应)
    pub fn terminates_stream(&self) -> bool {
        matches!(self.event_type, EventType::StreamEnd | EventType::Response)
    }

    /// 解析载荷为指定类型
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}
