//! Domain layer: entities and state machines for the commerce backend.
//!
//! Orders are append-only audit records; the only mutation they ever see is
//! the `Pending → Confirmed | Cancelled` status transition driven by the
//! checkout workflow. Stock mutations are guarded by a per-product version
//! token (optimistic concurrency).

pub mod money;
pub mod order;
pub mod payment;
pub mod product;

pub use money::Money;
pub use order::{Order, OrderLine, OrderStatus};
pub use payment::{Payment, PaymentMethod, PaymentStatus};
pub use product::Product;
