//! Reqwest-backed dispatch client.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::traits::BaseDispatchClient;

/// Production dispatch client. One shared reqwest client, every request
/// bounded by the configured timeout.
pub struct HttpDispatchClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpDispatchClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build dispatch HTTP client")?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl BaseDispatchClient for HttpDispatchClient {
    async fn dispatch(&self, url: &str) -> Result<u16> {
        let response = self.client.get(url).send().await.map_err(|err| {
            if err.is_timeout() {
                anyhow::anyhow!(
                    "request to {url} timed out after {}s",
                    self.timeout.as_secs()
                )
            } else {
                anyhow::anyhow!("request to {url} failed: {err}")
            }
        })?;

        Ok(response.status().as_u16())
    }
}
