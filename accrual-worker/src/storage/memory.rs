//! In-memory storage adapter
//!
//! Single-process stand-in for the order and balance tables. Each `DashMap`
//! entry is locked per key, which gives per-row atomic writes.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use shared::validate::validate_order_number;
use shared::{Balance, Order, UserId};

use super::{BalanceStore, OrderStore, StorageError, StorageResult};

#[derive(Debug, Default)]
pub struct MemoryStore {
    orders: DashMap<String, Order>,
    balances: DashMap<UserId, Balance>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a zero balance for `user_id` if none exists yet
    pub fn open_balance(&self, user_id: UserId) -> Balance {
        self.balances
            .entry(user_id)
            .or_insert_with(|| Balance::new(user_id))
            .clone()
    }

    /// Insert or replace a balance row
    pub fn put_balance(&self, balance: Balance) {
        self.balances.insert(balance.user_id, balance);
    }

    /// Register an uploaded order
    ///
    /// The number must pass the Luhn check. Re-uploading a number returns
    /// `AlreadyExists` for the same user and `Conflict` for anyone else.
    pub fn register_order(&self, order: Order) -> StorageResult<Order> {
        validate_order_number(&order.order_number)
            .map_err(|e| StorageError::Validation(e.to_string()))?;

        match self.orders.entry(order.order_number.clone()) {
            Entry::Occupied(existing) if existing.get().user_id == order.user_id => Err(
                StorageError::AlreadyExists(format!("order {}", order.order_number)),
            ),
            Entry::Occupied(_) => Err(StorageError::Conflict(format!(
                "order {} was uploaded by another user",
                order.order_number
            ))),
            Entry::Vacant(slot) => {
                slot.insert(order.clone());
                Ok(order)
            }
        }
    }

    pub fn get_order(&self, order_number: &str) -> Option<Order> {
        self.orders.get(order_number).map(|o| o.clone())
    }

    pub fn balance(&self, user_id: UserId) -> Option<Balance> {
        self.balances.get(&user_id).map(|b| b.clone())
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn find_eligible_for_processing(&self, limit: usize) -> StorageResult<Vec<Order>> {
        let mut eligible: Vec<Order> = self
            .orders
            .iter()
            .filter(|o| o.status.is_eligible())
            .map(|o| o.clone())
            .collect();
        eligible.sort_by(|a, b| {
            a.uploaded_at
                .cmp(&b.uploaded_at)
                .then_with(|| a.order_number.cmp(&b.order_number))
        });
        eligible.truncate(limit);
        Ok(eligible)
    }

    async fn update_order(&self, order: &Order) -> StorageResult<()> {
        let mut stored = self
            .orders
            .get_mut(&order.order_number)
            .ok_or_else(|| StorageError::NotFound(format!("order {}", order.order_number)))?;
        stored.status = order.status.clone();
        stored.accrual = order.accrual;
        Ok(())
    }
}

#[async_trait]
impl BalanceStore for MemoryStore {
    async fn get_balance(&self, user_id: UserId) -> StorageResult<Balance> {
        self.balance(user_id)
            .ok_or_else(|| StorageError::NotFound(format!("balance for user {user_id}")))
    }

    async fn set_balance(&self, user_id: UserId, balance: Balance) -> StorageResult<Balance> {
        let mut stored = self
            .balances
            .get_mut(&user_id)
            .ok_or_else(|| StorageError::NotFound(format!("balance for user {user_id}")))?;
        *stored = Balance { user_id, ..balance };
        Ok(stored.clone())
    }
}
