//! Seed data for the in-memory store
//!
//! ```json
//! {
//!   "balances": [{ "user_id": 1, "current_balance": 10.0 }],
//!   "orders": [{ "order_number": "79927398713", "user_id": 1 }]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use shared::{Balance, Order};
use thiserror::Error;

use super::{MemoryStore, StorageError};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to load seed order {order_number}")]
    Order {
        order_number: String,
        #[source]
        source: StorageError,
    },
}

#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub balances: Vec<Balance>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// Rows written by [`SeedData::apply`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub balances: usize,
    pub orders: usize,
}

impl SeedData {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Load balances, then orders. Users referenced only by an order get a
    /// zero balance so accruals have somewhere to land.
    pub fn apply(self, store: &MemoryStore) -> Result<SeedSummary, SeedError> {
        let balances = self.balances.len();
        for balance in self.balances {
            store.put_balance(balance);
        }

        let orders = self.orders.len();
        for order in self.orders {
            store.open_balance(order.user_id);
            let order_number = order.order_number.clone();
            store
                .register_order(order)
                .map_err(|source| SeedError::Order { order_number, source })?;
        }

        Ok(SeedSummary { balances, orders })
    }
}
