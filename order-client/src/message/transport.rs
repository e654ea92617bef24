//! Transport layer abstraction for the message client
//!
//! ```text
//!            ┌─────────────────┐
//!            │ Transport Trait │  ◄── 可插拔
//!            └────────┬────────┘
//!                     │
//!          ┌──────────┴──────────┐
//!          ▼                     ▼
//!  StreamTransport<S>     MemoryTransport
//!  (TCP / TLS 字节流)      (同进程 mpsc)
//! ```

use async_trait::async_trait;
use rustls::ClientConfig;
use rustls_pki_types::ServerName;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc};
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;

use super::codec::{read_frame, write_frame};
use crate::error::MessageError;
use shared::message::BusMessage;

/// Bidirectional carrier of [`BusMessage`] frames
///
/// Reads and writes may run concurrently; each direction is serialised
/// internally so whole frames never interleave.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn read_message(&self) -> Result<BusMessage, MessageError>;
    async fn write_message(&self, msg: &BusMessage) -> Result<(), MessageError>;
    async fn close(&self) -> Result<(), MessageError>;
}

// ========== Byte Stream Transport ==========

/// Framed transport over any byte stream, split into independently locked halves
#[derive(Debug)]
pub struct StreamTransport<S> {
    reader: Mutex<ReadHalf<S>>,
    writer: Mutex<WriteHalf<S>>,
}

/// Plain TCP
pub type TcpTransport = StreamTransport<TcpStream>;

/// TLS over TCP
pub type TlsTransport = StreamTransport<TlsStream<TcpStream>>;

impl<S: AsyncRead + AsyncWrite> StreamTransport<S> {
    /// Wrap an already connected stream (server side or tests)
    pub fn from_stream(stream: S) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        Self {
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
        }
    }
}

async fn dial(addr: &str) -> Result<TcpStream, MessageError> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|e| MessageError::Connection(format!("TCP connect to {} failed: {}", addr, e)))?;
    // 小帧请求/响应，关闭 Nagle
    stream.set_nodelay(true)?;
    Ok(stream)
}

impl StreamTransport<TcpStream> {
    pub async fn connect(addr: &str) -> Result<Self, MessageError> {
        Ok(Self::from_stream(dial(addr).await?))
    }
}

impl StreamTransport<TlsStream<TcpStream>> {
    /// Connect and complete the TLS handshake, verifying the server as `domain`
    pub async fn connect(
        addr: &str,
        domain: &str,
        config: ClientConfig,
    ) -> Result<Self, MessageError> {
        let server_name = ServerName::try_from(domain.to_string())
            .map_err(|e| MessageError::Tls(format!("Invalid server name {}: {}", domain, e)))?;

        let stream = dial(addr).await?;
        let stream = TlsConnector::from(Arc::new(config))
            .connect(server_name, stream)
            .await
            .map_err(|e| MessageError::Connection(format!("TLS handshake with {} failed: {}", domain, e)))?;

        Ok(Self::from_stream(stream))
    }
}

#[async_trait]
impl<S> Transport for StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Send + Unpin + std::fmt::Debug + 'static,
{
    async fn read_message(&self) -> Result<BusMessage, MessageError> {
        read_frame(&mut *self.reader.lock().await).await
    }

    async fn write_message(&self, msg: &BusMessage) -> Result<(), MessageError> {
        write_frame(&mut *self.writer.lock().await, msg).await
    }

    async fn close(&self) -> Result<(), MessageError> {
        self.writer.lock().await.shutdown().await?;
        Ok(())
    }
}

// ========== Memory Transport ==========

/// In-process transport; one end of a [`MemoryTransport::pair`]
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    inbound: Arc<Mutex<mpsc::Receiver<BusMessage>>>,
    outbound: mpsc::Sender<BusMessage>,
}

impl MemoryTransport {
    /// Create a connected (client, server) pair, each direction buffering `capacity` messages
    pub fn pair(capacity: usize) -> (Self, Self) {
        let capacity = capacity.max(1);
        let (to_client, client_rx) = mpsc::channel(capacity);
        let (to_server, server_rx) = mpsc::channel(capacity);

        let client = Self {
            inbound: Arc::new(Mutex::new(client_rx)),
            outbound: to_server,
        };
        let server = Self {
            inbound: Arc::new(Mutex::new(server_rx)),
            outbound: to_client,
        };
        (client, server)
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn read_message(&self) -> Result<BusMessage, MessageError> {
        self.inbound
            .lock()
            .await
            .recv()
            .await
            .ok_or_else(|| MessageError::Connection("Memory peer closed".to_string()))
    }

    async fn write_message(&self, msg: &BusMessage) -> Result<(), MessageError> {
        self.outbound
            .send(msg.clone())
            .await
            .map_err(|_| MessageError::Connection("Memory peer closed".to_string()))
    }

    async fn close(&self) -> Result<(), MessageError> {
        Ok(())
    }
}
