//! Shared fakes for accrual-worker integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use accrual_client::{AccrualApi, AccrualResponse, ClientResult};
use accrual_worker::storage::{BalanceStore, MemoryStore, OrderStore, StorageError, StorageResult};
use async_trait::async_trait;
use http::StatusCode;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde_json::json;
use shared::{Balance, Order, UserId};
use tokio_util::sync::CancellationToken;

/// `200 OK` body for a PROCESSED decision
pub fn processed(order: &str, accrual: f64) -> AccrualResponse {
    AccrualResponse::json(&json!({"order": order, "status": "PROCESSED", "accrual": accrual}))
}

/// `200 OK` body with a status and no accrual
pub fn decided(order: &str, status: &str) -> AccrualResponse {
    AccrualResponse::json(&json!({"order": order, "status": status}))
}

/// Memory store seeded with one balance per user and the given NEW orders
pub fn seeded_store(balances: &[(UserId, Decimal)], orders: &[(&str, UserId, i64)]) -> MemoryStore {
    let store = MemoryStore::new();
    for (user_id, current) in balances {
        store.put_balance(Balance {
            current_balance: *current,
            ..Balance::new(*user_id)
        });
    }
    for (number, user_id, uploaded_at) in orders {
        store
            .register_order(Order::new(*number, *user_id).uploaded_at(*uploaded_at))
            .unwrap();
    }
    store
}

/// Memory store wrapper that counts calls and can be told to fail
#[derive(Default)]
pub struct RecordingStore {
    pub inner: MemoryStore,
    pub eligible_calls: AtomicUsize,
    pub order_updates: AtomicUsize,
    pub balance_reads: AtomicUsize,
    pub balance_writes: AtomicUsize,
    pub fail_eligible: AtomicBool,
    pub fail_balance_write: AtomicBool,
}

impl RecordingStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    pub fn order_updates(&self) -> usize {
        self.order_updates.load(Ordering::SeqCst)
    }

    pub fn balance_calls(&self) -> usize {
        self.balance_reads.load(Ordering::SeqCst) + self.balance_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderStore for RecordingStore {
    async fn find_eligible_for_processing(&self, limit: usize) -> StorageResult<Vec<Order>> {
        self.eligible_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_eligible.load(Ordering::SeqCst) {
            return Err(StorageError::Database("connection reset".into()));
        }
        self.inner.find_eligible_for_processing(limit).await
    }

    async fn update_order(&self, order: &Order) -> StorageResult<()> {
        self.order_updates.fetch_add(1, Ordering::SeqCst);
        self.inner.update_order(order).await
    }
}

#[async_trait]
impl BalanceStore for RecordingStore {
    async fn get_balance(&self, user_id: UserId) -> StorageResult<Balance> {
        self.balance_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get_balance(user_id).await
    }

    async fn set_balance(&self, user_id: UserId, balance: Balance) -> StorageResult<Balance> {
        self.balance_writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_balance_write.load(Ordering::SeqCst) {
            return Err(StorageError::Database("balance row locked".into()));
        }
        self.inner.set_balance(user_id, balance).await
    }
}

/// Authority fake answering per order number, optionally held behind a gate
pub struct RoutingClient {
    routes: HashMap<String, AccrualResponse>,
    gate: Option<CancellationToken>,
    calls: Mutex<Vec<String>>,
}

impl RoutingClient {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn route(mut self, order: &str, response: AccrualResponse) -> Self {
        self.routes.insert(order.to_string(), response);
        self
    }

    /// Hold every fetch until `gate` is cancelled
    pub fn gated(mut self, gate: CancellationToken) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls_for(&self, order: &str) -> usize {
        self.calls.lock().iter().filter(|o| o.as_str() == order).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl AccrualApi for RoutingClient {
    async fn fetch(&self, order_number: &str) -> ClientResult<AccrualResponse> {
        self.calls.lock().push(order_number.to_string());
        if let Some(gate) = &self.gate {
            gate.cancelled().await;
        }
        Ok(self
            .routes
            .get(order_number)
            .cloned()
            .unwrap_or_else(|| AccrualResponse::new(StatusCode::NO_CONTENT)))
    }
}
