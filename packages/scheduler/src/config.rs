use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;
use url::Url;

use crate::kernel::dispatch::ServiceEndpoints;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub scraping_service_url: Url,
    pub media_gen_service_url: Url,
    pub instagram_service_url: Url,
    pub whatsapp_service_url: Url,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub max_attempts: i32,
    pub retry_backoff: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            scraping_service_url: required_url("SCRAPING_SERVICE_URL")?,
            media_gen_service_url: required_url("MEDIA_GEN_SERVICE_URL")?,
            instagram_service_url: required_url("INSTAGRAM_SERVICE_URL")?,
            whatsapp_service_url: required_url("WHATSAPP_SERVICE_URL")?,
            poll_interval: Duration::from_secs(env_u64("POLL_INTERVAL_SECS", 30)?),
            request_timeout: Duration::from_secs(env_u64("REQUEST_TIMEOUT_SECS", 10)?),
            max_attempts: env_u64("DISPATCH_MAX_ATTEMPTS", 1)? as i32,
            retry_backoff: Duration::from_secs(env_u64("DISPATCH_RETRY_BACKOFF_SECS", 30)?),
        })
    }

    /// Downstream service base URLs, keyed for the dispatch router.
    pub fn endpoints(&self) -> ServiceEndpoints {
        ServiceEndpoints {
            scraping: self.scraping_service_url.clone(),
            media_gen: self.media_gen_service_url.clone(),
            instagram: self.instagram_service_url.clone(),
            whatsapp: self.whatsapp_service_url.clone(),
        }
    }
}

fn required_url(name: &str) -> Result<Url> {
    let raw = env::var(name).with_context(|| format!("{name} must be set"))?;
    Url::parse(&raw).with_context(|| format!("{name} must be a valid URL"))
}

fn env_u64(name: &str, default: u64) -> Result<u64> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{name} must be a valid number")),
        Err(_) => Ok(default),
    }
}
