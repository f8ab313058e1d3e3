//! Order resolution errors

use accrual_client::ClientError;
use shared::UserId;
use thiserror::Error;

use crate::storage::StorageError;

/// Why one resolution attempt of an order ended without applying a decision
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Authority unreachable on every attempt
    #[error("failed to process order {order_number} after {attempts} retries")]
    Transport {
        order_number: String,
        attempts: u32,
        #[source]
        source: ClientError,
    },

    /// Authority kept answering 204
    #[error("order {order_number} not found after {attempts} retries")]
    NotFound { order_number: String, attempts: u32 },

    #[error("failed to decode accrual response for order {order_number}")]
    Decode {
        order_number: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("order number mismatch: expected {expected}, got {actual}")]
    OrderMismatch { expected: String, actual: String },

    #[error("unexpected status code {status} for order {order_number}")]
    UnexpectedStatus { order_number: String, status: u16 },

    #[error("failed to update balance for user {user_id}")]
    Balance {
        user_id: UserId,
        #[source]
        source: StorageError,
    },

    #[error("failed to update order {order_number}")]
    Storage {
        order_number: String,
        #[source]
        source: StorageError,
    },

    #[error("order resolution cancelled")]
    Cancelled,
}

impl ResolveError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
