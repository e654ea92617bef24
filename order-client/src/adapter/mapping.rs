//! Wire record <-> domain entity mapping

use uuid::Uuid;

use shared::models::{Order, OrderPlan};
use shared::order::{OrderDto, OrderPlanDto, OrderStatus, PlanDto};

/// Outbound record for a new order
///
/// Order, payment and plan sub-record each get a fresh id. Status is always
/// PENDING and the plan subtotal is a copy of the plan price.
pub(crate) fn new_order_record(user_id: &str, plan: &PlanDto) -> OrderDto {
    OrderDto {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        price: plan.price,
        order_status: OrderStatus::Pending.into(),
        payment_id: Uuid::new_v4().to_string(),
        failure_messages: String::new(),
        plan: Some(OrderPlanDto {
            id: Uuid::new_v4().to_string(),
            plan_id: plan.plan_id,
            price: plan.price,
            sub_total: plan.price,
        }),
    }
}

/// Order returned by CreateOrder
///
/// Plan name, description and price come from the caller's plan.
pub(crate) fn created_order(record: OrderDto, plan: &PlanDto) -> Order {
    let price = i64::from(plan.price);
    order_with_plan(
        record,
        plan.name.clone(),
        plan.description.clone(),
        price,
    )
}

/// Order returned by the read paths (detail and history)
///
/// Plan name and description stay empty; plan price mirrors the order price.
pub(crate) fn stored_order(record: OrderDto) -> Order {
    let price = i64::from(record.price);
    order_with_plan(record, String::new(), String::new(), price)
}

fn order_with_plan(record: OrderDto, name: String, description: String, plan_price: i64) -> Order {
    let order_status = record.order_status_name();
    let plan_id = i64::from(record.plan_id());

    Order {
        // 计划 id 与订单 id 相同
        plan: OrderPlan {
            id: record.id.clone(),
            name,
            description,
            plan_id,
            price: plan_price,
            subtotal: plan_price,
        },
        id: record.id,
        user_id: record.user_id,
        price: i64::from(record.price),
        order_status,
        payment_id: record.payment_id,
        failure_messages: record.failure_messages,
    }
}
