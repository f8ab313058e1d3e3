//! Balance Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// User loyalty balance (one per user)
///
/// Both amounts are non-negative; withdrawals are validated elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub user_id: UserId,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub current_balance: Decimal,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub withdrawn_total: Decimal,
}

impl Balance {
    /// Empty balance for a user
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            current_balance: Decimal::ZERO,
            withdrawn_total: Decimal::ZERO,
        }
    }

    /// Copy of this balance with `amount` added to the current balance
    pub fn credited(&self, amount: Decimal) -> Self {
        Self {
            current_balance: self.current_balance + amount,
            ..self.clone()
        }
    }
}
