//! Order service adapter
//!
//! Translates domain requests into order service calls and the replies back
//! into [`Order`] entities. Stateless apart from the shared channel handle,
//! so one instance can be cloned and used from any number of tasks.
//!
//! # Cancellation
//!
//! Every operation takes the caller's [`CancellationToken`] and races each
//! outbound call against it. CreateOrder is the one exception when
//! [`AdapterConfig::detach_create`] is set: the call then runs on its own
//! task and completes even if the caller gives up.

mod mapping;
mod notification;

pub use notification::encode_notification;

use futures::StreamExt;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::channel::OrderServiceChannel;
use crate::config::AdapterConfig;
use crate::error::{AdapterError, AdapterResult, Operation};
use crate::status::RpcStatus;
use shared::models::{CreateOrderRequest, Order};
use shared::order::{
    AnyBlob, CreateOrderRpcRequest, GetUserOrderDetailRequest, GetUserOrderHistoryRequest,
    OrderDto, PaymentNotification, PlanDto, ProcessOrderRpcRequest,
};

/// Order service adapter
#[derive(Debug, Clone)]
pub struct OrderRpcApi {
    channel: Arc<dyn OrderServiceChannel>,
    config: AdapterConfig,
}

impl OrderRpcApi {
    pub fn new(channel: Arc<dyn OrderServiceChannel>) -> Self {
        Self::with_config(channel, AdapterConfig::default())
    }

    pub fn with_config(channel: Arc<dyn OrderServiceChannel>, config: AdapterConfig) -> Self {
        Self { channel, config }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Create a PENDING order for `user_id` on `plan`
    ///
    /// Order and payment ids are generated here and never reused.
    #[instrument(skip_all, fields(user_id = %user_id, plan_id = plan.plan_id))]
    pub async fn create_order(
        &self,
        cancel: &CancellationToken,
        request: &CreateOrderRequest,
        plan: &PlanDto,
        user_id: &str,
    ) -> AdapterResult<Order> {
        let record = mapping::new_order_record(user_id, plan);
        tracing::debug!(
            order_id = %record.id,
            payment_id = %record.payment_id,
            requested_plan_id = request.plan_id,
            "Creating order"
        );
        let rpc_request = CreateOrderRpcRequest {
            order: Some(record),
        };

        let response = if self.config.detach_create {
            let channel = Arc::clone(&self.channel);
            tokio::spawn(async move { channel.create_order(rpc_request).await })
                .await?
                .map_err(|source| AdapterError::Rpc {
                    operation: Operation::CreateOrder,
                    source,
                })?
        } else {
            guarded(
                cancel,
                Operation::CreateOrder,
                self.channel.create_order(rpc_request),
            )
            .await?
        };

        let created = required(response.created_order, Operation::CreateOrder, "created_order")?;
        let order = mapping::created_order(created, plan);
        tracing::info!(order_id = %order.id, status = %order.order_status, "Order created");
        Ok(order)
    }

    /// Forward a payment notification for asynchronous processing
    ///
    /// Each value is encoded on its own; see [`encode_notification`] for how
    /// values that fail to encode are handled.
    #[instrument(skip_all)]
    pub async fn process_order<I, K, V>(
        &self,
        cancel: &CancellationToken,
        notification: I,
    ) -> AdapterResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Serialize,
    {
        let blobs = encode_notification(notification, self.config.blob_encoding)?;
        self.process_order_encoded(cancel, blobs).await
    }

    /// Forward a notification whose values are already encoded
    #[instrument(skip_all, fields(keys = blobs.len()))]
    pub async fn process_order_encoded(
        &self,
        cancel: &CancellationToken,
        blobs: HashMap<String, AnyBlob>,
    ) -> AdapterResult<()> {
        let request = ProcessOrderRpcRequest {
            payment_notification: Some(PaymentNotification {
                notification_res: blobs,
            }),
        };
        guarded(
            cancel,
            Operation::ProcessOrder,
            self.channel.process_order_saga(request),
        )
        .await
    }

    /// Fetch one order of a user
    #[instrument(skip_all, fields(order_id = %order_id, user_id = %user_id))]
    pub async fn get_user_order_detail(
        &self,
        cancel: &CancellationToken,
        order_id: &str,
        user_id: &str,
    ) -> AdapterResult<Order> {
        let request = GetUserOrderDetailRequest {
            order_id: order_id.to_string(),
            user_id: user_id.to_string(),
        };
        let response = guarded(
            cancel,
            Operation::GetUserOrderDetail,
            self.channel.get_user_order_detail(request),
        )
        .await?;

        let record = required(response.order_dto, Operation::GetUserOrderDetail, "order_dto")?;
        Ok(mapping::stored_order(record))
    }

    /// Fetch the complete order history of a user, in arrival order
    ///
    /// All or nothing: any failure after the stream opened discards the
    /// orders received so far.
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn get_user_order_history(
        &self,
        cancel: &CancellationToken,
        user_id: &str,
    ) -> AdapterResult<Vec<Order>> {
        let request = GetUserOrderHistoryRequest {
            user_id: user_id.to_string(),
        };
        let mut stream = guarded(
            cancel,
            Operation::GetUserOrderHistory,
            self.channel.get_user_order_history(request),
        )
        .await?;

        let operation = Operation::GetUserOrderHistoryStream;
        let mut orders = Vec::new();
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(discarded = orders.len(), "History stream cancelled");
                    return Err(AdapterError::Cancelled { operation });
                }
                next = stream.next() => next,
            };

            match next {
                None => break,
                Some(Ok(response)) => {
                    let record = required(response.order_dto, operation, "order_dto")?;
                    orders.push(mapping::stored_order(record));
                }
                Some(Err(source)) => {
                    tracing::warn!(discarded = orders.len(), error = %source, "History stream failed");
                    return Err(AdapterError::Rpc { operation, source });
                }
            }
        }

        tracing::debug!(count = orders.len(), "History stream complete");
        Ok(orders)
    }
}

/// Race a remote call against the caller's cancellation
async fn guarded<T>(
    cancel: &CancellationToken,
    operation: Operation,
    call: impl Future<Output = Result<T, RpcStatus>>,
) -> AdapterResult<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AdapterError::Cancelled { operation }),
        result = call => result.map_err(|source| AdapterError::Rpc { operation, source }),
    }
}

fn required(
    record: Option<OrderDto>,
    operation: Operation,
    field: &'static str,
) -> AdapterResult<OrderDto> {
    record.ok_or(AdapterError::InvalidResponse { operation, field })
}
