//! # Order Orchestrator Demo
//!
//! Runs the orchestrator against the in-memory order store and bus:
//! 1. A checkout simulator authorizes a new order every few seconds.
//! 2. The orchestrator forwards authorized orders on its poll interval.
//! 3. An inventory consumer drains the bus and logs each stock decrement request.
//!
//! Press Ctrl-C to stop.

use hosted_service::tracing::setup_tracing;
use order_orchestrator::clients::InMemoryOrderQueries;
use order_orchestrator::config::OrchestratorConfig;
use order_orchestrator::lifecycle::OrderOrchestrator;
use order_orchestrator::model::AuthorizedOrder;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let config = OrchestratorConfig::from_env()?;
    info!(?config, "Starting order orchestrator");

    let (mut orchestrator, orders, mut events) = OrderOrchestrator::in_memory(&config)?;
    let host = CancellationToken::new();

    let inventory = tokio::spawn(
        async move {
            while let Some(event) = events.recv().await {
                let units: u32 = event.items.values().sum();
                info!(
                    order_id = %event.order_id,
                    customer_id = %event.customer_id,
                    products = event.items.len(),
                    units,
                    "Stock decrement requested"
                );
            }
            info!("Bus closed");
        }
        .instrument(info_span!("inventory")),
    );

    let checkout = tokio::spawn(
        simulate_checkout(orders, host.child_token()).instrument(info_span!("checkout")),
    );

    orchestrator.start(&host)?;

    tokio::signal::ctrl_c().await?;
    warn!("Received SIGINT, shutting down");

    host.cancel();
    orchestrator.stop(&host)?;
    let metrics = orchestrator.metrics().snapshot();
    orchestrator.dispose();
    // Dropping the orchestrator drops its bus handle; the consumer exits once in-flight
    // cycles release theirs.
    drop(orchestrator);

    let _ = checkout.await;
    if tokio::time::timeout(Duration::from_secs(5), inventory)
        .await
        .is_err()
    {
        warn!("Inventory consumer still draining, exiting anyway");
    }

    info!(
        started = metrics.started,
        succeeded = metrics.succeeded,
        failed = metrics.failed,
        "Order orchestrator stopped"
    );
    Ok(())
}

/// Authorizes a small order every 5 seconds until cancelled.
async fn simulate_checkout(orders: InMemoryOrderQueries, cancel: CancellationToken) {
    let mut next_id = 1_u64;
    let mut ticker = tokio::time::interval(Duration::from_secs(5));
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let customer = 100 + next_id % 3;
                let order = AuthorizedOrder::new(
                    next_id,
                    customer,
                    [(1000 + next_id % 4, 1), (2000, (next_id % 5) as u32 + 1)],
                );
                orders.authorize(order);
                info!(order_id = next_id, pending = orders.pending(), "Order authorized");
                next_id += 1;
            }
        }
    }
}
