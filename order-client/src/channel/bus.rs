// order-client/src/channel/bus.rs
// 基于消息总线的订单服务通道

use async_trait::async_trait;
use futures::StreamExt;
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};

use super::{OrderServiceChannel, OrderStream};
use crate::config::ClientConfig;
use crate::error::MessageError;
use crate::message::{MessageClient, StreamReceiver};
use crate::status::RpcStatus;
use shared::message::{BusMessage, EventType, RequestCommandPayload, ResponsePayload};
use shared::order::{
    CreateOrderRpcRequest, CreateOrderRpcResponse, GetUserOrderDetailRequest,
    GetUserOrderDetailResponse, GetUserOrderHistoryRequest, GetUserOrderHistoryResponse,
    ProcessOrderRpcRequest, action,
};

/// Order service channel over the message bus
///
/// Each remote operation is a `RequestCommand` addressed by its action name.
/// Unary calls wait for the correlated `Response`; the history call reads
/// `StreamItem` messages until a `StreamEnd`.
#[derive(Debug, Clone)]
pub struct BusOrderChannel {
    client: MessageClient,
}

impl BusOrderChannel {
    pub fn new(client: MessageClient) -> Self {
        Self { client }
    }

    /// Connect using the given configuration
    ///
    /// Plain TCP unless `tls` is supplied. The TLS server name is
    /// `config.tls_domain`, falling back to the host part of `config.addr`.
    pub async fn connect(
        config: &ClientConfig,
        tls: Option<rustls::ClientConfig>,
    ) -> Result<Self, MessageError> {
        let client = match tls {
            Some(tls) => {
                let domain = config
                    .tls_domain
                    .clone()
                    .unwrap_or_else(|| host_of(&config.addr).to_string());
                MessageClient::connect_tls(
                    &config.addr,
                    &domain,
                    tls,
                    &config.client_name,
                    config.message.clone(),
                )
                .await?
            }
            None if config.tls_domain.is_some() => {
                return Err(MessageError::Tls(
                    "TLS domain configured but no TLS client config supplied".to_string(),
                ));
            }
            None => {
                MessageClient::connect(&config.addr, &config.client_name, config.message.clone())
                    .await?
            }
        };
        Ok(Self::new(client))
    }

    pub fn message_client(&self) -> &MessageClient {
        &self.client
    }

    async fn unary<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        action: &str,
        request: &Req,
    ) -> Result<Resp, RpcStatus> {
        let msg = command(action, request)?;
        tracing::debug!(action = %action, request_id = %msg.request_id, "Sending order service request");
        let reply = self.client.request(&msg).await?;
        decode_reply(&reply)
    }
}

#[async_trait]
impl OrderServiceChannel for BusOrderChannel {
    async fn create_order(
        &self,
        request: CreateOrderRpcRequest,
    ) -> Result<CreateOrderRpcResponse, RpcStatus> {
        self.unary(action::CREATE_ORDER, &request).await
    }

    async fn process_order_saga(&self, request: ProcessOrderRpcRequest) -> Result<(), RpcStatus> {
        // 应答为空消息，`{}` 或缺省 data 都接受
        let _: IgnoredAny = self.unary(action::PROCESS_ORDER_SAGA, &request).await?;
        Ok(())
    }

    async fn get_user_order_detail(
        &self,
        request: GetUserOrderDetailRequest,
    ) -> Result<GetUserOrderDetailResponse, RpcStatus> {
        self.unary(action::GET_USER_ORDER_DETAIL, &request).await
    }

    async fn get_user_order_history(
        &self,
        request: GetUserOrderHistoryRequest,
    ) -> Result<OrderStream, RpcStatus> {
        let msg = command(action::GET_USER_ORDER_HISTORY, &request)?;
        tracing::debug!(request_id = %msg.request_id, "Opening order history stream");
        let receiver = self.client.open_stream(&msg).await?;
        Ok(history_stream(receiver))
    }
}

fn command<Req: Serialize>(action: &str, request: &Req) -> Result<BusMessage, RpcStatus> {
    let params = serde_json::to_value(request)
        .map_err(|e| RpcStatus::internal(format!("Failed to encode request: {}", e)))?;
    BusMessage::request_command(&RequestCommandPayload::new(action, Some(params)))
        .map_err(|e| RpcStatus::internal(format!("Failed to encode command: {}", e)))
}

fn parse_response(msg: &BusMessage) -> Result<ResponsePayload, RpcStatus> {
    msg.parse_payload()
        .map_err(|e| RpcStatus::internal(format!("Malformed response payload: {}", e)))
}

fn decode_reply<Resp: DeserializeOwned>(msg: &BusMessage) -> Result<Resp, RpcStatus> {
    let payload = parse_response(msg)?;
    if !payload.success {
        return Err(RpcStatus::from(&payload));
    }
    serde_json::from_value(payload.data.unwrap_or(serde_json::Value::Null))
        .map_err(|e| RpcStatus::internal(format!("Malformed response data: {}", e)))
}

/// Adapt a stream receiver into an [`OrderStream`]
///
/// The stream ends after the first error it yields.
fn history_stream(receiver: StreamReceiver) -> OrderStream {
    futures::stream::unfold(Some(receiver), |state| async move {
        let mut receiver = state?;
        match receiver.recv().await {
            Ok(Some(msg)) => match msg.event_type {
                EventType::StreamItem => {
                    let item = decode_reply::<GetUserOrderHistoryResponse>(&msg);
                    let next = item.is_ok().then_some(receiver);
                    Some((item, next))
                }
                EventType::StreamEnd | EventType::Response => match parse_response(&msg) {
                    Ok(end) if end.success => None,
                    Ok(end) => Some((Err(RpcStatus::from(&end)), None)),
                    Err(status) => Some((Err(status), None)),
                },
                other => Some((
                    Err(RpcStatus::internal(format!(
                        "Unexpected {} message on stream",
                        other
                    ))),
                    None,
                )),
            },
            Ok(None) => Some((
                Err(RpcStatus::unavailable("Stream closed before end marker")),
                None,
            )),
            Err(e) => Some((Err(e.into()), None)),
        }
    })
    .boxed()
}

/// Host part of `host:port`; IPv6 literals lose their brackets
fn host_of(addr: &str) -> &str {
    if let Some(rest) = addr.strip_prefix('[') {
        return rest.split_once(']').map(|(host, _)| host).unwrap_or(rest);
    }
    match addr.rsplit_once(':') {
        // 多个冒号且无方括号: 裸 IPv6 地址，没有端口
        Some((host, _)) if !host.contains(':') => host,
        Some(_) => addr,
        None => addr,
    }
}
