//! Raw authority response

use ::http::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use ::http::StatusCode;
use serde::Serialize;
use shared::AccrualDecision;
use std::time::Duration;

/// Status, headers and body of one authority response
#[derive(Debug, Clone)]
pub struct AccrualResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl AccrualResponse {
    /// Empty response with the given status
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// `200 OK` carrying a JSON body
    pub fn json<T: Serialize>(value: &T) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_default();
        Self::new(StatusCode::OK).with_body(body)
    }

    /// Replace the body
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Add a header (invalid names or values are ignored)
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// `Retry-After` in whole seconds, if present and parseable
    pub fn retry_after(&self) -> Option<Duration> {
        self.headers
            .get(RETRY_AFTER)?
            .to_str()
            .ok()?
            .trim()
            .parse::<u64>()
            .ok()
            .map(Duration::from_secs)
    }

    /// Decode the body as an accrual decision
    pub fn decision(&self) -> Result<AccrualDecision, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}
