use crate::constants::USER_AGENT;
use crate::error::FetchError;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Source of upstream JSON documents (forecast, warnings and reference tables).
#[cfg_attr(test, automock)]
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    /// GETs `url` and returns the parsed body. Timeouts surface as errors.
    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value, FetchError>;
}

/// Fetches `url` and decodes the body into `T`.
pub async fn fetch_as<T: DeserializeOwned>(
    fetcher: &dyn JsonFetcher,
    url: &str,
) -> Result<T, FetchError> {
    let value = fetcher.fetch_json(url).await?;
    Ok(serde_json::from_value(value)?)
}

/// reqwest-backed fetcher with a fixed per-request timeout
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Arc<Client>,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
        })
    }
}

#[async_trait]
impl JsonFetcher for HttpFetcher {
    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        tracing::debug!("Fetching {}", url);
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
