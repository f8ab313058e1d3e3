//! Storage ports
//!
//! The accrual engine only ever talks to storage through [`OrderStore`] and
//! [`BalanceStore`]. Storage owns durable state and is expected to serialize
//! conflicting writes to the same balance row.

pub mod memory;
pub mod seed;

use async_trait::async_trait;
use shared::{Balance, Order, UserId};
use thiserror::Error;

pub use memory::MemoryStore;
pub use seed::{SeedData, SeedError, SeedSummary};

/// Storage error types
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Order side of storage
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Orders in NEW or PROCESSING, oldest upload first, at most `limit`
    async fn find_eligible_for_processing(&self, limit: usize) -> StorageResult<Vec<Order>>;

    /// Persist status and accrual of an existing order
    async fn update_order(&self, order: &Order) -> StorageResult<()>;
}

/// Balance side of storage
#[async_trait]
pub trait BalanceStore: Send + Sync {
    async fn get_balance(&self, user_id: UserId) -> StorageResult<Balance>;

    /// Overwrite a user's balance, returning the persisted value
    async fn set_balance(&self, user_id: UserId, balance: Balance) -> StorageResult<Balance>;
}
