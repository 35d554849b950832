//! Checkout: order placement saga, inventory ledger and payment gateway.
//!
//! The workflow reserves stock, charges payment, then confirms the order,
//! compensating (stock restore, order cancellation) when a later step
//! fails. Stock correctness under concurrency rests solely on the
//! version-guarded compare-and-swap inside the ledger.

pub mod error;
pub mod gateway;
pub mod ledger;
pub mod query;
pub mod workflow;

pub use error::CheckoutError;
pub use gateway::{GatewayConfig, PaymentGateway, SimulatedGateway};
pub use ledger::{InventoryLedger, DEFAULT_LOW_STOCK_THRESHOLD};
pub use query::OrderQueries;
pub use workflow::{LineRequest, OrderWorkflow};
