//! Accrual Client - HTTP client for the external accrual authority
//!
//! One `GET /api/orders/{number}` per call. The raw status, headers and body
//! are handed back untouched; interpreting them (retry, throttle, decide) is
//! the caller's job.

pub mod config;
pub mod error;
pub mod http;
pub mod response;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpAccrualClient;
pub use response::AccrualResponse;

// Re-export shared types for convenience
pub use shared::{AccrualDecision, OrderStatus};

use async_trait::async_trait;

/// Capability to query the accrual authority
///
/// Any HTTP response, whatever its status code, is `Ok`. Only transport
/// failures are `Err`.
#[async_trait]
pub trait AccrualApi: Send + Sync {
    async fn fetch(&self, order_number: &str) -> ClientResult<AccrualResponse>;
}
