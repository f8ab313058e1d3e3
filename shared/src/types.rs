//! Common types for the shared crate

/// Timestamp type (Unix milliseconds)
pub type Timestamp = i64;

/// User identifier (one balance per user)
pub type UserId = i64;
