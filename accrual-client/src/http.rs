//! reqwest-backed accrual client

use crate::{AccrualApi, AccrualResponse, ClientConfig, ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::time::Duration;

/// HTTP client for the accrual authority
#[derive(Debug, Clone)]
pub struct HttpAccrualClient {
    client: Client,
    base_url: String,
    headers: HeaderMap,
}

impl HttpAccrualClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ClientError::InvalidConfig(format!("header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ClientError::InvalidConfig(format!("header value {value:?}: {e}")))?;
            headers.append(name, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            headers,
        })
    }

    /// Authority base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of one order's accrual resource
    pub fn order_url(&self, order_number: &str) -> String {
        format!("{}/api/orders/{}", self.base_url, order_number)
    }
}

#[async_trait]
impl AccrualApi for HttpAccrualClient {
    async fn fetch(&self, order_number: &str) -> ClientResult<AccrualResponse> {
        let url = self.order_url(order_number);

        let response = self
            .client
            .get(&url)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(ClientError::transport)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(ClientError::transport)?
            .to_vec();

        tracing::debug!(
            order_number = %order_number,
            status = status.as_u16(),
            body_len = body.len(),
            "Accrual authority responded"
        );

        Ok(AccrualResponse {
            status,
            headers,
            body,
        })
    }
}
