//! Order Model

use serde::{Deserialize, Serialize};

/// Plan embedded in an order
///
/// `id` always equals the owning order's id. `name` and `description` are
/// only filled on the create path, where the caller supplies the plan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderPlan {
    pub id: String,
    pub name: String,
    pub description: String,
    pub plan_id: i64,
    /// Price in minor currency units
    pub price: i64,
    /// Subtotal in minor currency units
    pub subtotal: i64,
}

/// Order entity
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    /// Price in minor currency units
    pub price: i64,
    /// Canonical status name, e.g. "PENDING"
    pub order_status: String,
    pub payment_id: String,
    /// Empty when the order has not failed
    pub failure_messages: String,
    pub plan: OrderPlan,
}

/// Create order payload
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub plan_id: i64,
}
