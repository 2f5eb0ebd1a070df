//! HTTP backend client
//!
//! Sends each operation as a JSON POST to `{base_url}/{operation}`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::backend::Backend;
use super::errors::ApiError;

/// Backend reached over HTTP
#[derive(Clone)]
pub struct HttpBackend {
    /// HTTP client for making requests
    http_client: Client,
    /// API base URL, without trailing slash
    base_url: String,
}

impl HttpBackend {
    /// Create a client for the given base URL
    ///
    /// # Arguments
    /// * `base_url` - Root of the transactions API
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn operation_url(&self, operation: &str) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(operation))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn call(&self, operation: &str, params: Value) -> Result<Value, ApiError> {
        let url = self.operation_url(operation);
        debug!(operation = operation, url = %url, "Calling backend");

        let response = self
            .http_client
            .post(&url)
            .json(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiError::Timeout
                } else {
                    ApiError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            warn!(operation = operation, status = status.as_u16(), "Backend call failed");
            return Err(ApiError::from_status(status.as_u16(), &body));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&body)?)
    }
}
