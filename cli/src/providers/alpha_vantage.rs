use super::{MetricSource, ProviderError, ProviderSettings};
use crate::models::{Kpi, MetricSet, MetricValue, Ticker};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::instrument;

/// Flat key/value company overview as returned by `function=OVERVIEW`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyOverview(Map<String, Value>);

impl CompanyOverview {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Raw `PEGRatio` field, if present and non-empty
    pub fn peg_ratio_field(&self) -> Option<String> {
        match self.0.get("PEGRatio")? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// PEG rounded to one decimal; placeholders such as `"None"` or `"-"` are unavailable
    pub fn peg_ratio(&self) -> MetricValue {
        self.peg_ratio_field()
            .and_then(|s| s.parse::<f64>().ok())
            .map_or(MetricValue::NotAvailable, MetricValue::numeric)
    }
}

/// Turn a parsed body into an overview, mapping the provider's in-band errors.
///
/// Alpha Vantage answers most failures with HTTP 200 and a single message key.
fn overview_from_body(ticker: &Ticker, body: Map<String, Value>) -> Result<CompanyOverview, ProviderError> {
    let message = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_string);

    if let Some(msg) = message("Error Message") {
        return Err(if msg.to_lowercase().contains("apikey") {
            ProviderError::Authentication(msg)
        } else {
            ProviderError::SymbolNotFound {
                symbol: ticker.to_string(),
            }
        });
    }
    if let Some(msg) = message("Note").or_else(|| message("Information")) {
        return Err(ProviderError::RateLimited(msg));
    }
    if body.is_empty() {
        return Err(ProviderError::SymbolNotFound {
            symbol: ticker.to_string(),
        });
    }

    Ok(CompanyOverview::new(body))
}

/// Fundamentals source: Alpha Vantage company overview, PEG ratio only
pub struct AlphaVantageClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl AlphaVantageClient {
    pub fn new(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(settings.timeout).build()?;

        Ok(AlphaVantageClient {
            client,
            base_url: settings.alpha_vantage_base_url.trim_end_matches('/').to_string(),
            api_key: settings
                .alpha_vantage_api_key
                .clone()
                .filter(|key| !key.trim().is_empty()),
        })
    }

    #[instrument(skip(self, ticker), fields(ticker = %ticker))]
    pub async fn fetch_overview(&self, ticker: &Ticker) -> Result<CompanyOverview, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingCredential)?;
        let url = format!("{}/query", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("function", "OVERVIEW"),
                ("symbol", ticker.as_str()),
                ("apikey", api_key),
            ])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let fields: Map<String, Value> = serde_json::from_str(&body)?;
        overview_from_body(ticker, fields)
    }
}

#[async_trait]
impl MetricSource for AlphaVantageClient {
    fn name(&self) -> &'static str {
        "alpha_vantage"
    }

    async fn fetch(&self, ticker: &Ticker) -> Result<MetricSet, ProviderError> {
        let overview = self.fetch_overview(ticker).await?;
        Ok(MetricSet::new().with(Kpi::PegRatio, overview.peg_ratio()))
    }

    fn fallback(&self) -> MetricSet {
        MetricSet::new().with(Kpi::PegRatio, MetricValue::NotAvailable)
    }
}
