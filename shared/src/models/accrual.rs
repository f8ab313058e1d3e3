//! Accrual authority decision
//!
//! Body of a `200 OK` from `GET /api/orders/{number}`:
//!
//! ```json
//! { "order": "79927398713", "status": "PROCESSED", "accrual": 500.5 }
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::order::OrderStatus;

/// Decision reported by the accrual authority for one order
///
/// Transient: translated into order/balance mutations, never stored as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccrualDecision {
    pub order: String,
    pub status: OrderStatus,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub accrual: Option<Decimal>,
}

impl AccrualDecision {
    /// Accrual to credit: present only for PROCESSED with a positive amount
    pub fn accrual(&self) -> Option<Decimal> {
        match (&self.status, self.accrual) {
            (OrderStatus::Processed, Some(amount)) if amount > Decimal::ZERO => Some(amount),
            _ => None,
        }
    }
}
