//! Single-order checkout flow over one PostgreSQL transaction.
//!
//! An [`OrderProcessor`] performs four dependent writes — order row,
//! payment row, guarded inventory decrement, delivery row — then asks a
//! [`Courier`] to dispatch. Everything runs inside a single transaction
//! that commits only if every step succeeded; any failure rolls all
//! writes back.

pub mod courier;
pub mod error;
pub mod processor;
pub mod types;

pub use courier::{Courier, SimulatedCourier};
pub use error::{CheckoutError, Result};
pub use processor::{OrderProcessor, OrderRequest, connect};
pub use types::{Money, OrderId, ProductId};
