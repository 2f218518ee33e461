//! Upstream metric providers.
//!
//! Each provider is a [`MetricSource`]: it fetches one ticker and reports the
//! subset of KPIs it owns. Failures never leave the source; the pipeline calls
//! [`MetricSource::fetch_or_fallback`], which logs the error and substitutes
//! the source's fallback set.

pub mod alpha_vantage;
pub mod yahoo;

pub use alpha_vantage::{AlphaVantageClient, CompanyOverview};
pub use yahoo::{CompanySnapshot, YahooClient};

use crate::models::{MetricSet, Ticker};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query2.finance.yahoo.com";
pub const DEFAULT_YAHOO_SESSION_URL: &str = "https://fc.yahoo.com";
pub const DEFAULT_ALPHA_VANTAGE_BASE_URL: &str = "https://www.alphavantage.co";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("rate limited by provider: {0}")]
    RateLimited(String),

    #[error("no API credential configured")]
    MissingCredential,

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid base URL {0}")]
    InvalidUrl(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A provider that reports KPI values for one ticker at a time.
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    async fn fetch(&self, ticker: &Ticker) -> Result<MetricSet, ProviderError>;

    /// Set reported in place of a failed fetch
    fn fallback(&self) -> MetricSet {
        MetricSet::new()
    }

    async fn fetch_or_fallback(&self, ticker: &Ticker) -> MetricSet {
        match self.fetch(ticker).await {
            Ok(metrics) => {
                debug!(source = self.name(), %ticker, metrics = metrics.len(), "Fetched metrics");
                metrics
            }
            Err(e) => {
                warn!(source = self.name(), %ticker, error = %e, "Fetch failed, using fallback metrics");
                self.fallback()
            }
        }
    }
}

/// Connection settings for both providers
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub yahoo_base_url: String,
    /// Page visited to obtain a session cookie before asking for a crumb.
    /// `None` skips the handshake.
    pub yahoo_session_url: Option<String>,
    pub alpha_vantage_base_url: String,
    pub alpha_vantage_api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            yahoo_base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
            yahoo_session_url: Some(DEFAULT_YAHOO_SESSION_URL.to_string()),
            alpha_vantage_base_url: DEFAULT_ALPHA_VANTAGE_BASE_URL.to_string(),
            alpha_vantage_api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}
