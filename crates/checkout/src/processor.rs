//! Order processing: four dependent writes under one transaction.

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool};

use crate::courier::Courier;
use crate::error::{CheckoutError, Result};
use crate::types::{Money, OrderId, ProductId};

/// Parameters for a single order.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    /// Product to purchase.
    pub product_id: ProductId,
    /// Number of units to purchase.
    pub quantity: i32,
    /// Amount to charge. Accepted as-is; no sign validation.
    pub amount: Money,
    /// Free-text delivery address.
    pub address: String,
}

/// Connects an eager pool to the store.
///
/// Fails with [`CheckoutError::Connectivity`] before any transaction
/// exists if the server is unreachable.
pub async fn connect(database_url: &str) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(CheckoutError::Connectivity)
}

/// Processes one order end-to-end against PostgreSQL.
///
/// All four writes (order, payment, inventory decrement, delivery) run
/// inside a single transaction: either every row persists or none do.
#[derive(Clone)]
pub struct OrderProcessor<C: Courier> {
    pool: PgPool,
    courier: C,
}

impl<C: Courier> OrderProcessor<C> {
    /// Creates a new order processor.
    pub fn new(pool: PgPool, courier: C) -> Self {
        Self { pool, courier }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Executes the checkout flow for one order and returns the
    /// generated order ID on commit.
    ///
    /// Steps run strictly in order; the first failure aborts the rest.
    /// The transaction guard rolls back on every exit path except the
    /// explicit commit at the end, so a failing step leaves no partial
    /// writes behind.
    #[tracing::instrument(skip(self, request), fields(product_id = %request.product_id, quantity = request.quantity))]
    pub async fn process_order(&self, request: &OrderRequest) -> Result<OrderId> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(CheckoutError::BeginTransaction)?;

        let order_id = create_order(&mut tx, "new").await?;
        record_payment(&mut tx, order_id, request.amount).await?;
        adjust_inventory(&mut tx, request.product_id, request.quantity).await?;
        record_delivery(&mut tx, order_id, &request.address).await?;

        tracing::info!(%order_id, address = %request.address, "dispatching delivery");
        self.courier.dispatch(order_id, &request.address).await?;

        tx.commit()
            .await
            .map_err(CheckoutError::CommitTransaction)?;

        tracing::info!(%order_id, "order processed");
        Ok(order_id)
    }
}

/// Inserts the order row and returns the store-generated ID.
async fn create_order(conn: &mut PgConnection, status: &str) -> Result<OrderId> {
    let order_id: i64 =
        sqlx::query_scalar("INSERT INTO orders (status) VALUES ($1) RETURNING order_id")
            .bind(status)
            .fetch_one(conn)
            .await
            .map_err(CheckoutError::OrderCreation)?;

    tracing::info!(order_id, status, "order created");
    Ok(OrderId::new(order_id))
}

/// Inserts the payment row for the order.
async fn record_payment(conn: &mut PgConnection, order_id: OrderId, amount: Money) -> Result<()> {
    sqlx::query("INSERT INTO payments (order_id, amount_cents) VALUES ($1, $2)")
        .bind(order_id.as_i64())
        .bind(amount.as_cents())
        .execute(conn)
        .await
        .map_err(CheckoutError::Payment)?;

    tracing::info!(%order_id, %amount, "payment recorded");
    Ok(())
}

/// Decrements stock with a guarded update.
///
/// The WHERE clause encodes the non-negative invariant: zero affected
/// rows means insufficient stock (or an unknown product), which is a
/// business-rule failure rather than a store error.
async fn adjust_inventory(
    conn: &mut PgConnection,
    product_id: ProductId,
    quantity: i32,
) -> Result<()> {
    let result = sqlx::query(
        "UPDATE inventory SET quantity = quantity - $1 WHERE product_id = $2 AND quantity >= $1",
    )
    .bind(quantity)
    .bind(product_id.as_i32())
    .execute(conn)
    .await
    .map_err(CheckoutError::Inventory)?;

    if result.rows_affected() == 0 {
        return Err(CheckoutError::InsufficientInventory {
            product_id,
            requested: quantity,
        });
    }

    tracing::info!(%product_id, quantity, "inventory decremented");
    Ok(())
}

/// Inserts the delivery row with status "in progress".
///
/// The row is written before the courier is asked to dispatch, so it
/// only survives if the dispatch (and the rest of the flow) succeeds.
async fn record_delivery(conn: &mut PgConnection, order_id: OrderId, address: &str) -> Result<()> {
    sqlx::query("INSERT INTO deliveries (order_id, address, status) VALUES ($1, $2, $3)")
        .bind(order_id.as_i64())
        .bind(address)
        .bind("in progress")
        .execute(conn)
        .await
        .map_err(CheckoutError::DeliveryRecord)?;

    tracing::info!(%order_id, address, "delivery recorded");
    Ok(())
}
