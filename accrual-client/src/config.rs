//! Client configuration

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Accrual authority client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Authority base URL (e.g., "http://localhost:8081")
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Extra headers sent with every request
    pub headers: Vec<(String, String)>,
}

impl ClientConfig {
    /// Create a new client configuration
    ///
    /// A base URL without scheme gets `http://`; a trailing `/` is dropped.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            timeout: DEFAULT_TIMEOUT_SECS,
            headers: Vec::new(),
        }
    }

    /// Set the request timeout (seconds)
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = secs;
        self
    }

    /// Add a header sent with every request
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}
