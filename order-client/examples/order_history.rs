//! Order History Example
//!
//! Connects to the order service with settings from the environment (or a
//! `.env` file) and prints the order history of one user. Set
//! `ORDER_TLS_CA_PEM` (and optionally `ORDER_TLS_DOMAIN`) to connect over TLS.
//!
//! Run: cargo run --example order_history -- <user_id>

use order_client::{BusOrderChannel, CancellationToken, ClientConfig, OrderRpcApi};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let user_id = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: order_history <user_id>"))?;

    let config = ClientConfig::from_env();
    tracing::info!(addr = %config.addr, "Connecting to order service");

    // 设置 ORDER_TLS_CA_PEM 即走 TLS
    let tls = config.tls_client_config()?;
    let channel = BusOrderChannel::connect(&config, tls).await?;
    let api = OrderRpcApi::with_config(Arc::new(channel), config.adapter);

    // Ctrl-C 取消正在进行的调用
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    let orders = api.get_user_order_history(&cancel, &user_id).await?;

    println!("\n📦 {} order(s) for {}", orders.len(), user_id);
    for order in &orders {
        println!(
            "  {}  {:<10}  plan #{}  price {}  payment {}",
            order.id, order.order_status, order.plan.plan_id, order.price, order.payment_id
        );
        if !order.failure_messages.is_empty() {
            println!("      ⚠️  {}", order.failure_messages);
        }
    }

    Ok(())
}
