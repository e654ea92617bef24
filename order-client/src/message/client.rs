use dashmap::DashMap;
use rustls::ClientConfig;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use super::MessageClientConfig;
use super::transport::{MemoryTransport, TcpTransport, TlsTransport, Transport};
use crate::error::MessageError;
use shared::message::{BusMessage, HandshakePayload};

type PendingRequests = Arc<DashMap<Uuid, oneshot::Sender<BusMessage>>>;
type PendingStreams = Arc<DashMap<Uuid, mpsc::Sender<BusMessage>>>;

/// Message Client
///
/// Correlates replies from the order service with the requests that caused
/// them. Supports unary request/response and server streams. A single
/// background task reads the transport and routes every correlated message.
#[derive(Debug, Clone)]
pub struct MessageClient {
    transport: Arc<dyn Transport>,
    config: MessageClientConfig,
    pending_requests: PendingRequests,
    pending_streams: PendingStreams,
}

impl MessageClient {
    /// Connect via TCP and perform the handshake
    pub async fn connect(
        addr: &str,
        client_name: &str,
        config: MessageClientConfig,
    ) -> Result<Self, MessageError> {
        let transport = TcpTransport::connect(addr).await?;
        Self::handshake(&transport, client_name).await?;
        tracing::info!(addr = %addr, "Connected to order service");
        Ok(Self::new(Arc::new(transport), config))
    }

    /// Connect via TLS and perform the handshake
    pub async fn connect_tls(
        addr: &str,
        domain: &str,
        tls: ClientConfig,
        client_name: &str,
        config: MessageClientConfig,
    ) -> Result<Self, MessageError> {
        let transport = TlsTransport::connect(addr, domain, tls).await?;
        Self::handshake(&transport, client_name).await?;
        tracing::info!(addr = %addr, domain = %domain, "Connected to order service (TLS)");
        Ok(Self::new(Arc::new(transport), config))
    }

    /// Create in-memory client (no handshake)
    pub fn memory(transport: MemoryTransport, config: MessageClientConfig) -> Self {
        Self::new(Arc::new(transport), config)
    }

    async fn handshake(transport: &dyn Transport, client_name: &str) -> Result<(), MessageError> {
        let payload = HandshakePayload::new(client_name, env!("CARGO_PKG_VERSION"));
        tracing::debug!(version = payload.version, client_name = %client_name, "Sending handshake");
        transport.write_message(&BusMessage::handshake(&payload)?).await
    }

    /// Wrap a transport and spawn the dispatcher
    pub fn new(transport: Arc<dyn Transport>, config: MessageClientConfig) -> Self {
        let client = Self {
            transport,
            config,
            pending_requests: Arc::new(DashMap::new()),
            pending_streams: Arc::new(DashMap::new()),
        };

        tokio::spawn(Self::dispatch(
            client.transport.clone(),
            client.pending_requests.clone(),
            client.pending_streams.clone(),
        ));

        client
    }

    pub fn config(&self) -> &MessageClientConfig {
        &self.config
    }

    async fn dispatch(
        transport: Arc<dyn Transport>,
        pending_requests: PendingRequests,
        pending_streams: PendingStreams,
    ) {
        loop {
            let msg = match transport.read_message().await {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("Transport read error: {}", e);
                    break;
                }
            };

            let Some(correlation_id) = msg.correlation_id else {
                tracing::debug!(event_type = %msg.event_type, "Dropping uncorrelated message");
                continue;
            };

            if let Some((_, tx)) = pending_requests.remove(&correlation_id) {
                let _ = tx.send(msg);
                continue;
            }

            let terminal = msg.terminates_stream();
            let sender = if terminal {
                pending_streams.remove(&correlation_id).map(|(_, tx)| tx)
            } else {
                pending_streams.get(&correlation_id).map(|tx| tx.value().clone())
            };

            match sender {
                Some(tx) => {
                    if tx.send(msg).await.is_err() {
                        // 接收方已放弃该流
                        pending_streams.remove(&correlation_id);
                    }
                }
                None => {
                    tracing::warn!(
                        correlation_id = %correlation_id,
                        event_type = %msg.event_type,
                        "No pending request for message"
                    );
                }
            }
        }

        // 连接断开，释放所有等待者
        pending_requests.clear();
        pending_streams.clear();
    }

    /// Send a message (Fire and Forget)
    pub async fn send(&self, msg: &BusMessage) -> Result<(), MessageError> {
        self.transport.write_message(msg).await
    }

    /// Send a message and await the correlated reply
    pub async fn request(&self, msg: &BusMessage) -> Result<BusMessage, MessageError> {
        let request_id = msg.request_id;
        let (tx, rx) = oneshot::channel();
        self.pending_requests.insert(request_id, tx);
        // 无论应答、超时、发送失败还是调用方丢弃 future，都移除等待项
        let _pending = Registration::new(&*self.pending_requests, request_id);

        self.send(msg).await?;

        match tokio::time::timeout(self.config.request_timeout, rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(MessageError::Connection(
                "Response channel closed".to_string(),
            )),
            Err(_) => Err(MessageError::Timeout(format!(
                "No response within {:?}",
                self.config.request_timeout
            ))),
        }
    }

    /// Send a message and open a stream of correlated replies
    ///
    /// The receiver yields every `StreamItem` and finally the terminating
    /// `StreamEnd` (or failed `Response`); it closes early if the
    /// connection is lost.
    pub async fn open_stream(&self, msg: &BusMessage) -> Result<StreamReceiver, MessageError> {
        let request_id = msg.request_id;
        let (tx, rx) = mpsc::channel(self.config.stream_buffer.max(1));
        self.pending_streams.insert(request_id, tx);
        let pending = Registration::new(&*self.pending_streams, request_id);

        self.send(msg).await?;
        // 之后由 StreamReceiver::drop 负责清理
        pending.disarm();

        Ok(StreamReceiver {
            rx,
            request_id,
            timeout: self.config.request_timeout,
            pending_streams: self.pending_streams.clone(),
        })
    }

    /// Close the client connection
    pub async fn close(&self) -> Result<(), MessageError> {
        self.transport.close().await
    }
}

/// Pending-map entry owned by an in-flight call
///
/// Dropping it removes the entry, so a call abandoned at any await point
/// leaves nothing behind for the dispatcher.
struct Registration<'a, V> {
    map: &'a DashMap<Uuid, V>,
    id: Uuid,
    armed: bool,
}

impl<'a, V> Registration<'a, V> {
    fn new(map: &'a DashMap<Uuid, V>, id: Uuid) -> Self {
        Self { map, id, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<V> Drop for Registration<'_, V> {
    fn drop(&mut self) {
        if self.armed {
            self.map.remove(&self.id);
        }
    }
}

/// Receiving half of an open server stream
#[derive(Debug)]
pub struct StreamReceiver {
    rx: mpsc::Receiver<BusMessage>,
    request_id: Uuid,
    timeout: std::time::Duration,
    pending_streams: PendingStreams,
}

impl StreamReceiver {
    /// Next message of the stream; `Ok(None)` once the connection dropped it
    pub async fn recv(&mut self) -> Result<Option<BusMessage>, MessageError> {
        match tokio::time::timeout(self.timeout, self.rx.recv()).await {
            Ok(msg) => Ok(msg),
            Err(_) => Err(MessageError::Timeout(format!(
                "No stream message within {:?}",
                self.timeout
            ))),
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }
}

impl Drop for StreamReceiver {
    fn drop(&mut self) {
        self.pending_streams.remove(&self.request_id);
    }
}
