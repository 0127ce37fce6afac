//! Courier trait and simulated implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::{CheckoutError, Result};
use crate::types::OrderId;

/// Trait for handing a recorded delivery off to downstream fulfillment.
///
/// Dispatch happens after the delivery row has been written but before
/// the transaction commits, so a dispatch failure rolls the whole order
/// back.
#[async_trait]
pub trait Courier: Send + Sync {
    /// Dispatches the delivery for the given order to the given address.
    async fn dispatch(&self, order_id: OrderId, address: &str) -> Result<()>;
}

#[derive(Debug)]
struct SimulatedCourierState {
    fail_on_dispatch: bool,
    dispatch_count: u32,
}

/// Courier that simulates downstream fulfillment.
///
/// Fails every dispatch by default, which demonstrates the rollback of
/// an otherwise fully written order. Tests toggle the failure off to
/// exercise the commit path.
#[derive(Debug, Clone)]
pub struct SimulatedCourier {
    state: Arc<RwLock<SimulatedCourierState>>,
}

impl SimulatedCourier {
    /// Creates a simulated courier that fails every dispatch.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(SimulatedCourierState {
                fail_on_dispatch: true,
                dispatch_count: 0,
            })),
        }
    }

    /// Configures whether dispatch calls fail.
    pub fn set_fail_on_dispatch(&self, fail: bool) {
        self.state.write().unwrap().fail_on_dispatch = fail;
    }

    /// Returns the number of dispatch attempts made.
    pub fn dispatch_count(&self) -> u32 {
        self.state.read().unwrap().dispatch_count
    }
}

impl Default for SimulatedCourier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Courier for SimulatedCourier {
    async fn dispatch(&self, order_id: OrderId, address: &str) -> Result<()> {
        let mut state = self.state.write().unwrap();
        state.dispatch_count += 1;

        if state.fail_on_dispatch {
            return Err(CheckoutError::DeliveryFailed { order_id });
        }

        tracing::info!(%order_id, address, "delivery dispatched");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fails_dispatch_by_default() {
        let courier = SimulatedCourier::new();
        let result = courier.dispatch(OrderId::new(1), "123 Main St").await;

        assert!(matches!(
            result,
            Err(CheckoutError::DeliveryFailed { order_id }) if order_id == OrderId::new(1)
        ));
        assert_eq!(courier.dispatch_count(), 1);
    }

    #[tokio::test]
    async fn succeeds_when_toggled() {
        let courier = SimulatedCourier::new();
        courier.set_fail_on_dispatch(false);

        courier
            .dispatch(OrderId::new(1), "123 Main St")
            .await
            .unwrap();
        assert_eq!(courier.dispatch_count(), 1);
    }

    #[tokio::test]
    async fn counts_every_attempt() {
        let courier = SimulatedCourier::new();
        let _ = courier.dispatch(OrderId::new(1), "a").await;
        let _ = courier.dispatch(OrderId::new(2), "b").await;
        assert_eq!(courier.dispatch_count(), 2);
    }
}
