// order-client/src/message/mod.rs
// 消息总线客户端：帧编码、传输层、请求关联

pub use shared::message::{BusMessage, EventType};

mod client;
pub mod codec;
pub mod tls;
pub mod transport;

pub use client::{MessageClient, StreamReceiver};
pub use transport::{MemoryTransport, StreamTransport, TcpTransport, TlsTransport, Transport};

use std::time::Duration;

/// Message client tuning
///
/// `request_timeout` bounds a unary call from send to reply, and separately
/// each receive on an open stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageClientConfig {
    pub request_timeout: Duration,
    /// 每个打开的流最多缓存的未读消息数
    pub stream_buffer: usize,
}

impl Default for MessageClientConfig {
    fn default() -> Self {
        Self::lan()
    }
}

impl MessageClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same data centre as the order service (default)
    pub fn lan() -> Self {
        Self {
            request_timeout: Duration::from_secs(3),
            stream_buffer: 64,
        }
    }

    /// Cross-region or internet links: slower replies, longer histories in flight
    pub fn wan() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            stream_buffer: 256,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// 流缓冲至少为 1
    pub fn with_stream_buffer(mut self, buffer: usize) -> Self {
        self.stream_buffer = buffer.max(1);
        self
    }
}
