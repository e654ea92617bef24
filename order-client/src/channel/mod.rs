//! RPC channel to the remote order service
//!
//! [`OrderServiceChannel`] is the seam between the adapter and whatever
//! carries the calls. Connection setup, TLS and timeouts all live behind it.

mod bus;

pub use bus::BusOrderChannel;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::status::RpcStatus;
use shared::order::{
    CreateOrderRpcRequest, CreateOrderRpcResponse, GetUserOrderDetailRequest,
    GetUserOrderDetailResponse, GetUserOrderHistoryRequest, GetUserOrderHistoryResponse,
    ProcessOrderRpcRequest,
};

/// Server stream of history messages; `None` is the clean end-of-stream
pub type OrderStream = BoxStream<'static, Result<GetUserOrderHistoryResponse, RpcStatus>>;

/// The four remote operations of the order service
#[async_trait]
pub trait OrderServiceChannel: Send + Sync + std::fmt::Debug {
    async fn create_order(
        &self,
        request: CreateOrderRpcRequest,
    ) -> Result<CreateOrderRpcResponse, RpcStatus>;

    async fn process_order_saga(&self, request: ProcessOrderRpcRequest) -> Result<(), RpcStatus>;

    async fn get_user_order_detail(
        &self,
        request: GetUserOrderDetailRequest,
    ) -> Result<GetUserOrderDetailResponse, RpcStatus>;

    async fn get_user_order_history(
        &self,
        request: GetUserOrderHistoryRequest,
    ) -> Result<OrderStream, RpcStatus>;
}
