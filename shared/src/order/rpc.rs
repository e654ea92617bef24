//! Request/response messages of the order service's remote operations

use super::{AnyBlob, OrderDto};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Action names addressing each remote operation on the message bus
pub mod action {
    pub const CREATE_ORDER: &str = "order.create";
    pub const PROCESS_ORDER_SAGA: &str = "order.process_saga";
    pub const GET_USER_ORDER_DETAIL: &str = "order.user_detail";
    pub const GET_USER_ORDER_HISTORY: &str = "order.user_history";
}

// ==================== CreateOrder ====================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateOrderRpcRequest {
    pub order: Option<OrderDto>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateOrderRpcResponse {
    pub created_order: Option<OrderDto>,
}

// ==================== ProcessOrderSaga ====================

/// 支付通知：键到不透明数据块的映射
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentNotification {
    pub notification_res: HashMap<String, AnyBlob>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessOrderRpcRequest {
    pub payment_notification: Option<PaymentNotification>,
}

// ==================== GetUserOrderDetail ====================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GetUserOrderDetailRequest {
    pub order_id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GetUserOrderDetailResponse {
    pub order_dto: Option<OrderDto>,
}

// ==================== GetUserOrderHistory ====================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GetUserOrderHistoryRequest {
    pub user_id: String,
}

/// One message of the history server stream
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GetUserOrderHistoryResponse {
    pub order_dto: Option<OrderDto>,
}
