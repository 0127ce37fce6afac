use thiserror::Error;

use crate::types::{OrderId, ProductId};

/// Errors that can occur while processing an order.
///
/// Each step of the flow wraps its underlying store error exactly once,
/// so the variant identifies which step failed. `InsufficientInventory`
/// and `DeliveryFailed` are business-rule failures, not store errors.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The store connection could not be established.
    #[error("failed to connect to the store: {0}")]
    Connectivity(#[source] sqlx::Error),

    /// A transaction could not be opened.
    #[error("failed to begin transaction: {0}")]
    BeginTransaction(#[source] sqlx::Error),

    /// The transaction could not be committed.
    #[error("failed to commit transaction: {0}")]
    CommitTransaction(#[source] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The order row could not be inserted or its generated ID read back.
    #[error("order creation failed: {0}")]
    OrderCreation(#[source] sqlx::Error),

    /// The payment row could not be inserted.
    #[error("payment processing failed: {0}")]
    Payment(#[source] sqlx::Error),

    /// The inventory decrement statement failed to execute.
    #[error("inventory update failed: {0}")]
    Inventory(#[source] sqlx::Error),

    /// The guarded decrement affected zero rows: not enough stock on
    /// hand (or no such product).
    #[error("not enough inventory for product {product_id} (requested {requested})")]
    InsufficientInventory {
        product_id: ProductId,
        requested: i32,
    },

    /// The delivery row could not be inserted.
    #[error("failed to record delivery: {0}")]
    DeliveryRecord(#[source] sqlx::Error),

    /// The courier reported a downstream fulfillment fault.
    #[error("delivery failed for order {order_id}")]
    DeliveryFailed { order_id: OrderId },
}

impl CheckoutError {
    /// Returns true for business-rule failures, as opposed to
    /// connectivity or statement failures in the store.
    pub fn is_business_rule(&self) -> bool {
        matches!(
            self,
            CheckoutError::InsufficientInventory { .. } | CheckoutError::DeliveryFailed { .. }
        )
    }
}

/// Result type for checkout operations.
pub type Result<T> = std::result::Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_inventory_message_names_the_product() {
        let err = CheckoutError::InsufficientInventory {
            product_id: ProductId::new(1),
            requested: 2,
        };
        assert_eq!(
            err.to_string(),
            "not enough inventory for product 1 (requested 2)"
        );
        assert!(err.is_business_rule());
    }

    #[test]
    fn delivery_failure_is_a_business_rule() {
        let err = CheckoutError::DeliveryFailed {
            order_id: OrderId::new(9),
        };
        assert_eq!(err.to_string(), "delivery failed for order 9");
        assert!(err.is_business_rule());
    }

    #[test]
    fn store_errors_are_not_business_rules() {
        let err = CheckoutError::Connectivity(sqlx::Error::PoolClosed);
        assert!(!err.is_business_rule());
    }
}
