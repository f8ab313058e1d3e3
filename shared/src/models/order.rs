//! Order Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Timestamp, UserId};

/// Order status
///
/// NEW / PROCESSING orders still need a decision from the accrual authority;
/// INVALID / PROCESSED are terminal. Any other status string reported by the
/// authority is kept verbatim in [`OrderStatus::Unknown`] instead of being
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    #[default]
    New,
    Registered,
    Processing,
    Invalid,
    Processed,
    /// Status not known to this build
    Unknown(String),
}

impl OrderStatus {
    /// Wire representation (SCREAMING_SNAKE_CASE)
    pub fn as_str(&self) -> &str {
        match self {
            Self::New => "NEW",
            Self::Registered => "REGISTERED",
            Self::Processing => "PROCESSING",
            Self::Invalid => "INVALID",
            Self::Processed => "PROCESSED",
            Self::Unknown(s) => s,
        }
    }

    /// Terminal statuses are never revisited by reconciliation
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Invalid | Self::Processed)
    }

    /// Statuses selected by the reconciliation poll
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::New | Self::Processing)
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "NEW" => Self::New,
            "REGISTERED" => Self::Registered,
            "PROCESSING" => Self::Processing,
            "INVALID" => Self::Invalid,
            "PROCESSED" => Self::Processed,
            _ => Self::Unknown(s),
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Unknown(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Caller-assigned, globally unique order number
    pub order_number: String,
    pub user_id: UserId,
    #[serde(default)]
    pub status: OrderStatus,
    /// Accrued points, meaningful only when PROCESSED
    #[serde(default, with = "rust_decimal::serde::float")]
    pub accrual: Decimal,
    /// Upload time (Unix millis)
    #[serde(default = "crate::util::now_millis")]
    pub uploaded_at: Timestamp,
}

impl Order {
    /// Create a NEW order uploaded now
    pub fn new(order_number: impl Into<String>, user_id: UserId) -> Self {
        Self {
            order_number: order_number.into(),
            user_id,
            status: OrderStatus::New,
            accrual: Decimal::ZERO,
            uploaded_at: crate::util::now_millis(),
        }
    }

    /// Override the upload timestamp
    pub fn uploaded_at(mut self, uploaded_at: Timestamp) -> Self {
        self.uploaded_at = uploaded_at;
        self
    }

    /// Override the status
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }
}
