// order-client/tests/bus_channel.rs
// 消息总线端到端测试 - 内存传输上的模拟订单服务 + TCP 帧编码

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use order_client::message::codec::{read_frame, write_frame};
use order_client::message::{MemoryTransport, Transport};
use order_client::{
    AdapterError, BusOrderChannel, CancellationToken, ClientConfig, CreateOrderRequest,
    MessageClient, MessageClientConfig, MessageError, Operation, OrderDto, OrderPlanDto,
    OrderRpcApi, OrderStatus, PlanDto, RpcCode, RpcStatus,
};
use shared::message::{BusMessage, EventType, RequestCommandPayload, ResponsePayload};
use shared::order::{
    CreateOrderRpcRequest, CreateOrderRpcResponse, GetUserOrderDetailRequest,
    GetUserOrderDetailResponse, GetUserOrderHistoryRequest, GetUserOrderHistoryResponse,
    ProcessOrderRpcRequest, action,
};

fn record(id: &str, user_id: &str) -> OrderDto {
    OrderDto {
        id: id.into(),
        user_id: user_id.into(),
        price: 54_000,
        order_status: OrderStatus::Approved.into(),
        payment_id: format!("pay-{id}"),
        failure_messages: String::new(),
        plan: Some(OrderPlanDto {
            id: format!("plan-{id}"),
            plan_id: 1,
            price: 54_000,
            sub_total: 54_000,
        }),
    }
}

fn data<T: serde::Serialize>(value: &T) -> ResponsePayload {
    ResponsePayload::ok("ok", Some(serde_json::to_value(value).unwrap()))
}

/// Answer a single command the way the order service would
///
/// - `order.user_detail` for order `missing` fails with NOT_FOUND
/// - `order.user_history` for user `broken` fails after one record
/// - anything addressed to `silent` gets no reply at all
async fn handle(server: &MemoryTransport, msg: BusMessage) {
    let command: RequestCommandPayload = msg.parse_payload().unwrap();
    let params = command.params.unwrap_or_default();
    let id = msg.request_id;

    let replies = match command.action.as_str() {
        action::CREATE_ORDER => {
            let request: CreateOrderRpcRequest = serde_json::from_value(params).unwrap();
            let response = CreateOrderRpcResponse {
                created_order: request.order,
            };
            vec![BusMessage::response(id, &data(&response)).unwrap()]
        }
        action::PROCESS_ORDER_SAGA => {
            let request: ProcessOrderRpcRequest = serde_json::from_value(params).unwrap();
            let keys = request.payment_notification.unwrap().notification_res.len();
            assert!(keys > 0);
            // 空消息按 JSON 序列化为 `{}`
            vec![BusMessage::response(id, &ResponsePayload::ok("accepted", Some(json!({})))).unwrap()]
        }
        action::GET_USER_ORDER_DETAIL => {
            let request: GetUserOrderDetailRequest = serde_json::from_value(params).unwrap();
            match request.order_id.as_str() {
                "silent" => vec![],
                "missing" => vec![
                    BusMessage::response(id, &RpcStatus::not_found("order not found").to_response())
                        .unwrap(),
                ],
                order_id => {
                    let response = GetUserOrderDetailResponse {
                        order_dto: Some(record(order_id, &request.user_id)),
                    };
                    vec![BusMessage::response(id, &data(&response)).unwrap()]
                }
            }
        }
        action::GET_USER_ORDER_HISTORY => {
            let request: GetUserOrderHistoryRequest = serde_json::from_value(params).unwrap();
            let item = |order_id: &str| {
                let response = GetUserOrderHistoryResponse {
                    order_dto: Some(record(order_id, &request.user_id)),
                };
                BusMessage::stream_item(id, &data(&response)).unwrap()
            };
            match request.user_id.as_str() {
                "silent" => vec![],
                "broken" => vec![
                    item("h-1"),
                    BusMessage::stream_end(id, &RpcStatus::unavailable("replica lost").to_response())
                        .unwrap(),
                ],
                _ => vec![
                    item("h-1"),
                    item("h-2"),
                    item("h-3"),
                    BusMessage::stream_end(id, &ResponsePayload::ok("done", None)).unwrap(),
                ],
            }
        }
        other => vec![
            BusMessage::response(
                id,
                &ResponsePayload::failure(format!("unknown action {other}"), Some("UNIMPLEMENTED".into())),
            )
            .unwrap(),
        ],
    };

    for reply in replies {
        server.write_message(&reply).await.unwrap();
    }
}

/// Spin up a fake order service and an adapter connected to it
fn connect() -> OrderRpcApi {
    let (client, server) = MemoryTransport::pair(64);

    tokio::spawn(async move {
        while let Ok(msg) = server.read_message().await {
            if msg.event_type == EventType::RequestCommand {
                handle(&server, msg).await;
            }
        }
    });

    let config = MessageClientConfig::new().with_request_timeout(Duration::from_millis(200));
    let channel = BusOrderChannel::new(MessageClient::memory(client, config));
    OrderRpcApi::new(Arc::new(channel))
}

fn plan() -> PlanDto {
    PlanDto {
        plan_id: 3,
        name: "Premium".into(),
        description: "4K, four screens".into(),
        price: 186_000,
    }
}

#[tokio::test]
async fn test_create_order_over_bus() {
    let api = connect();
    let cancel = CancellationToken::new();

    let order = api
        .create_order(&cancel, &CreateOrderRequest { plan_id: 3 }, &plan(), "user-1")
        .await
        .unwrap();

    assert_eq!(order.order_status, "PENDING");
    assert_eq!(order.plan.id, order.id);
    assert_eq!(order.plan.name, "Premium");
    assert_eq!(order.plan.plan_id, 3);
    assert_eq!(order.price, 186_000);
}

#[tokio::test]
async fn test_process_order_over_bus() {
    let api = connect();
    let cancel = CancellationToken::new();

    api.process_order(
        &cancel,
        [
            ("transaction_status", json!("settlement")),
            ("gross_amount", json!("186000.00")),
        ],
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_detail_over_bus() {
    let api = connect();
    let cancel = CancellationToken::new();

    let order = api
        .get_user_order_detail(&cancel, "order-9", "user-1")
        .await
        .unwrap();

    assert_eq!(order.id, "order-9");
    assert_eq!(order.user_id, "user-1");
    assert_eq!(order.order_status, "APPROVED");
    assert!(order.plan.name.is_empty());
}

#[tokio::test]
async fn test_detail_not_found_over_bus() {
    let api = connect();
    let cancel = CancellationToken::new();

    let err = api
        .get_user_order_detail(&cancel, "missing", "user-1")
        .await
        .unwrap_err();

    assert_eq!(err.operation(), Some(Operation::GetUserOrderDetail));
    assert_eq!(err.rpc_status(), Some(&RpcStatus::not_found("order not found")));
}

#[tokio::test]
async fn test_detail_timeout_is_deadline_exceeded() {
    let api = connect();
    let cancel = CancellationToken::new();

    let err = api
        .get_user_order_detail(&cancel, "silent", "user-1")
        .await
        .unwrap_err();

    assert_eq!(err.rpc_status().map(|s| s.code), Some(RpcCode::DeadlineExceeded));
}

#[tokio::test]
async fn test_history_over_bus() {
    let api = connect();
    let cancel = CancellationToken::new();

    let orders = api.get_user_order_history(&cancel, "user-1").await.unwrap();

    let ids: Vec<_> = orders.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, ["h-1", "h-2", "h-3"]);
    assert!(orders.iter().all(|o| o.plan.id == o.id));
}

#[tokio::test]
async fn test_history_failure_over_bus() {
    let api = connect();
    let cancel = CancellationToken::new();

    // 第一条记录已到达，但结果整体作废
    let err = api.get_user_order_history(&cancel, "broken").await.unwrap_err();
    assert_eq!(err.operation(), Some(Operation::GetUserOrderHistoryStream));
    assert_eq!(err.rpc_status(), Some(&RpcStatus::unavailable("replica lost")));
}

#[tokio::test]
async fn test_history_stream_timeout() {
    let api = connect();
    let cancel = CancellationToken::new();

    let err = api.get_user_order_history(&cancel, "silent").await.unwrap_err();

    assert_eq!(err.operation(), Some(Operation::GetUserOrderHistoryStream));
    assert_eq!(err.rpc_status().map(|s| s.code), Some(RpcCode::DeadlineExceeded));
}

#[tokio::test]
async fn test_cancel_while_waiting_for_reply() {
    let api = connect();
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = api
        .get_user_order_detail(&cancel, "silent", "user-1")
        .await
        .unwrap_err();
    assert!(matches!(err, AdapterError::Cancelled { .. }));
}

// ========== TCP ==========

#[tokio::test]
async fn test_detail_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        let handshake = read_frame(&mut stream).await.unwrap();
        assert_eq!(handshake.event_type, EventType::Handshake);

        let request = read_frame(&mut stream).await.unwrap();
        let command: RequestCommandPayload = request.parse_payload().unwrap();
        assert_eq!(command.action, action::GET_USER_ORDER_DETAIL);

        let response = GetUserOrderDetailResponse {
            order_dto: Some(record("order-tcp", "user-1")),
        };
        let reply = BusMessage::response(request.request_id, &data(&response)).unwrap();
        write_frame(&mut stream, &reply).await.unwrap();

        // 等待客户端关闭连接
        let _ = read_frame(&mut stream).await;
    });

    let channel = BusOrderChannel::connect(&ClientConfig::new(addr), None)
        .await
        .unwrap();
    let api = OrderRpcApi::new(Arc::new(channel.clone()));
    let cancel = CancellationToken::new();

    let order = api
        .get_user_order_detail(&cancel, "order-tcp", "user-1")
        .await
        .unwrap();
    assert_eq!(order.id, "order-tcp");
    assert_eq!(order.order_status, "APPROVED");

    channel.message_client().close().await.unwrap();
    server.await.unwrap();
}

#[tokio::test]
async fn test_connect_refused_is_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let err = BusOrderChannel::connect(&ClientConfig::new(addr), None)
        .await
        .unwrap_err();
    assert_eq!(RpcStatus::from(err).code, RpcCode::Unavailable);
}

#[tokio::test]
async fn test_tls_domain_requires_tls_config() {
    let config = ClientConfig::new("127.0.0.1:9090").with_tls_domain("orders.internal");

    let err = BusOrderChannel::connect(&config, None).await.unwrap_err();
    assert!(matches!(err, MessageError::Tls(_)));
}
