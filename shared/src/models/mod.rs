//! Data models
//!
//! Shared between the accrual client and the reconciliation worker.
//! Money is `rust_decimal::Decimal`; JSON carries it as a plain number.

pub mod accrual;
pub mod balance;
pub mod order;

// Re-exports
pub use accrual::*;
pub use balance::*;
pub use order::*;
