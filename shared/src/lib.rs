//! Shared types for the loyalty accrual workspace
//!
//! Domain types used by both the accrual client and the reconciliation
//! worker: orders, balances, the authority's accrual decision, and a few
//! small helpers (timestamps, order-number validation).

pub mod models;
pub mod types;
pub mod util;
pub mod validate;

// Re-exports
pub use models::{AccrualDecision, Balance, Order, OrderStatus};
pub use serde::{Deserialize, Serialize};
pub use types::{Timestamp, UserId};
