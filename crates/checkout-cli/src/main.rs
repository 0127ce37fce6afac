//! Checkout CLI entry point.
//!
//! Processes exactly one order per run: connect, migrate, run the flow,
//! then exit 0 on success or log and exit 1 on any failure.

mod config;

use checkout::{Money, OrderProcessor, OrderRequest, ProductId, SimulatedCourier};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::Config;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if let Err(err) = run(&config).await {
        tracing::error!(error = %err, "order processing failed");
        std::process::exit(1);
    }
}

async fn run(config: &Config) -> checkout::Result<()> {
    let pool = checkout::connect(&config.database_url).await?;

    let processor = OrderProcessor::new(pool, SimulatedCourier::new());
    processor.run_migrations().await?;

    let request = OrderRequest {
        product_id: ProductId::new(config.product_id),
        quantity: config.quantity,
        amount: Money::from_cents(config.amount_cents),
        address: config.address.clone(),
    };

    let order_id = processor.process_order(&request).await?;
    println!("Order {order_id} processed successfully!");
    Ok(())
}
