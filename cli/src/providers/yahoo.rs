use super::{MetricSource, ProviderError, ProviderSettings};
use crate::models::{Kpi, MetricSet, MetricValue, Ticker};
use async_trait::async_trait;
use rand::seq::IndexedRandom;
use reqwest::{header, Client, StatusCode, Url};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

const QUOTE_MODULES: &str = "summaryDetail,financialData,defaultKeyStatistics,incomeStatementHistory";

const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.3 Safari/605.1.15",
];

// --- Wire format ---

/// Yahoo numeric field: `{"raw": 25.1, "fmt": "25.10"}`, sometimes just `{}`
#[derive(Debug, Default, Deserialize)]
struct RawNumber {
    #[serde(default)]
    raw: serde_json::Value,
}

impl RawNumber {
    fn value(&self) -> Option<f64> {
        self.raw.as_f64()
    }
}

fn raw(field: &Option<RawNumber>) -> Option<f64> {
    field.as_ref().and_then(RawNumber::value)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<QuoteResult>>,
    error: Option<QuoteError>,
}

#[derive(Debug, Deserialize)]
struct QuoteError {
    code: String,
    description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResult {
    summary_detail: Option<SummaryDetail>,
    financial_data: Option<FinancialData>,
    default_key_statistics: Option<KeyStatistics>,
    income_statement_history: Option<IncomeStatementHistory>,
}

#[derive(Debug, Default, Deserialize)]
struct SummaryDetail {
    #[serde(rename = "forwardPE")]
    forward_pe: Option<RawNumber>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawNumber>,
    #[serde(rename = "marketCap")]
    market_cap: Option<RawNumber>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialData {
    gross_margins: Option<RawNumber>,
    total_revenue: Option<RawNumber>,
    revenue_growth: Option<RawNumber>,
    ebitda: Option<RawNumber>,
}

#[derive(Debug, Default, Deserialize)]
struct KeyStatistics {
    #[serde(rename = "enterpriseValue")]
    enterprise_value: Option<RawNumber>,
    #[serde(rename = "netIncomeToCommon")]
    net_income_to_common: Option<RawNumber>,
    #[serde(rename = "forwardPE")]
    forward_pe: Option<RawNumber>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeStatementHistory {
    #[serde(default)]
    income_statement_history: Vec<IncomeStatement>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeStatement {
    total_revenue: Option<RawNumber>,
}

// --- Snapshot ---

/// Company fields pulled from one quote summary. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanySnapshot {
    pub forward_pe: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub gross_margins: Option<f64>,
    pub net_income_to_common: Option<f64>,
    pub total_revenue: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub enterprise_value: Option<f64>,
    pub ebitda: Option<f64>,
    pub market_cap: Option<f64>,
    /// Annual total revenue, most recent period first
    pub revenue_history: Vec<Option<f64>>,
}

impl CompanySnapshot {
    pub fn forward_pe(&self) -> f64 {
        self.forward_pe.unwrap_or(0.0)
    }

    pub fn trailing_pe(&self) -> f64 {
        self.trailing_pe.unwrap_or(0.0)
    }

    pub fn gross_margins(&self) -> f64 {
        self.gross_margins.unwrap_or(0.0)
    }

    pub fn net_income_to_common(&self) -> f64 {
        self.net_income_to_common.unwrap_or(0.0)
    }

    /// Denominator for net margin; no default
    pub fn total_revenue(&self) -> Option<f64> {
        self.total_revenue
    }

    pub fn revenue_growth(&self) -> f64 {
        self.revenue_growth.unwrap_or(0.0)
    }

    pub fn enterprise_value(&self) -> f64 {
        self.enterprise_value.unwrap_or(0.0)
    }

    /// Denominator for EV/EBITDA; no default
    pub fn ebitda(&self) -> Option<f64> {
        self.ebitda
    }

    pub fn market_cap(&self) -> f64 {
        self.market_cap.unwrap_or(0.0)
    }

    /// Most recent period of the revenue history
    pub fn ttm_revenue(&self) -> Option<f64> {
        self.revenue_history.first().copied().flatten()
    }

    pub fn prior_revenue(&self) -> Option<f64> {
        self.revenue_history.get(1).copied().flatten()
    }
}

impl From<QuoteResult> for CompanySnapshot {
    fn from(result: QuoteResult) -> Self {
        let summary = result.summary_detail.unwrap_or_default();
        let financial = result.financial_data.unwrap_or_default();
        let stats = result.default_key_statistics.unwrap_or_default();
        let history = result.income_statement_history.unwrap_or_default();

        Self {
            forward_pe: raw(&summary.forward_pe).or_else(|| raw(&stats.forward_pe)),
            trailing_pe: raw(&summary.trailing_pe),
            gross_margins: raw(&financial.gross_margins),
            net_income_to_common: raw(&stats.net_income_to_common),
            total_revenue: raw(&financial.total_revenue),
            revenue_growth: raw(&financial.revenue_growth),
            enterprise_value: raw(&stats.enterprise_value),
            ebitda: raw(&financial.ebitda),
            market_cap: raw(&summary.market_cap),
            revenue_history: history
                .income_statement_history
                .iter()
                .map(|statement| raw(&statement.total_revenue))
                .collect(),
        }
    }
}

/// Compute the ten KPIs this source owns. PEG is reported as the sentinel.
pub fn derive_metrics(snapshot: &CompanySnapshot) -> MetricSet {
    let ttm_growth = match (snapshot.ttm_revenue(), snapshot.prior_revenue()) {
        (Some(current), Some(prior)) if prior > 0.0 => {
            MetricValue::numeric((current / prior - 1.0) * 100.0)
        }
        _ => MetricValue::NotAvailable,
    };

    MetricSet::new()
        .with(Kpi::ForwardPe, MetricValue::numeric(snapshot.forward_pe()))
        .with(Kpi::TrailingPe, MetricValue::numeric(snapshot.trailing_pe()))
        .with(Kpi::PegRatio, MetricValue::NotAvailable)
        .with(Kpi::GrossMargin, MetricValue::numeric(snapshot.gross_margins() * 100.0))
        .with(
            Kpi::NetMargin,
            MetricValue::percentage(snapshot.net_income_to_common(), snapshot.total_revenue()),
        )
        .with(Kpi::TtmRevenueGrowth, ttm_growth)
        .with(
            Kpi::CurrentYearRevenueGrowth,
            MetricValue::numeric(snapshot.revenue_growth() * 100.0),
        )
        .with(
            Kpi::EvToRevenue,
            MetricValue::ratio(snapshot.enterprise_value(), snapshot.ttm_revenue()),
        )
        .with(
            Kpi::EvToEbitda,
            MetricValue::ratio(snapshot.enterprise_value(), snapshot.ebitda()),
        )
        .with(Kpi::MarketCapBillions, MetricValue::numeric(snapshot.market_cap() / 1e9))
        .with(
            Kpi::EnterpriseValueBillions,
            MetricValue::numeric(snapshot.enterprise_value() / 1e9),
        )
}

fn snapshot_from_response(
    ticker: &Ticker,
    response: QuoteSummaryResponse,
) -> Result<CompanySnapshot, ProviderError> {
    if let Some(error) = response.quote_summary.error {
        return Err(if error.code == "Not Found" {
            ProviderError::SymbolNotFound {
                symbol: ticker.to_string(),
            }
        } else {
            ProviderError::InvalidResponse(format!("{}: {}", error.code, error.description))
        });
    }

    response
        .quote_summary
        .result
        .and_then(|results| results.into_iter().next())
        .map(CompanySnapshot::from)
        .ok_or_else(|| ProviderError::InvalidResponse("empty quoteSummary result".to_string()))
}

fn excerpt(body: &str) -> String {
    body.chars().take(200).collect()
}

// --- Client ---

/// Market data source: Yahoo Finance quote summary
pub struct YahooClient {
    client: Client,
    base_url: Url,
    session_url: Option<String>,
    crumb: Mutex<Option<String>>,
}

impl YahooClient {
    pub fn new(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .cookie_store(true)
            .gzip(true)
            .build()?;

        Ok(YahooClient {
            client,
            base_url: Url::parse(&settings.yahoo_base_url)
                .map_err(|e| ProviderError::InvalidUrl(format!("{}: {}", settings.yahoo_base_url, e)))?,
            session_url: settings.yahoo_session_url.clone(),
            crumb: Mutex::new(None),
        })
    }

    /// `base` + path segments, each one percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProviderError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn quote_url(&self, ticker: &Ticker) -> Result<Url, ProviderError> {
        self.endpoint(&["v10", "finance", "quoteSummary", ticker.as_str()])
    }

    fn get_user_agent(&self) -> &'static str {
        USER_AGENTS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(USER_AGENTS[0])
    }

    /// Crumb for the current session, negotiated on first use
    async fn crumb(&self) -> Option<String> {
        let session_url = self.session_url.as_deref()?;
        let mut guard = self.crumb.lock().await;
        if let Some(crumb) = guard.as_ref() {
            return Some(crumb.clone());
        }

        match self.request_crumb(session_url).await {
            Ok(crumb) => {
                debug!("Obtained Yahoo session crumb");
                *guard = Some(crumb.clone());
                Some(crumb)
            }
            Err(e) => {
                warn!(error = %e, "Yahoo session handshake failed, continuing without crumb");
                None
            }
        }
    }

    async fn request_crumb(&self, session_url: &str) -> Result<String, ProviderError> {
        // Only the cookie matters here; the page itself usually answers 404.
        if let Err(e) = self
            .client
            .get(session_url)
            .header(header::USER_AGENT, self.get_user_agent())
            .send()
            .await
        {
            debug!(error = %e, "Session page request failed");
        }

        let url = self.endpoint(&["v1", "test", "getcrumb"])?;
        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, self.get_user_agent())
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        let crumb = body.trim();

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: excerpt(crumb),
            });
        }
        if crumb.is_empty() || crumb.contains('<') {
            return Err(ProviderError::InvalidResponse("unexpected crumb body".to_string()));
        }
        Ok(crumb.to_string())
    }

    #[instrument(skip(self, ticker), fields(ticker = %ticker))]
    pub async fn fetch_snapshot(&self, ticker: &Ticker) -> Result<CompanySnapshot, ProviderError> {
        let url = self.quote_url(ticker)?;
        let mut query = vec![("modules", QUOTE_MODULES.to_string())];
        let crumb = self.crumb().await;
        if let Some(crumb) = &crumb {
            query.push(("crumb", crumb.clone()));
        }

        let response = self
            .client
            .get(url)
            .query(&query)
            .header(header::USER_AGENT, self.get_user_agent())
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::UNAUTHORIZED && crumb.is_some() {
            // Stale crumb; renegotiate on the next request.
            *self.crumb.lock().await = None;
        }

        // Unknown symbols come back as 404 with a JSON error body.
        match serde_json::from_str::<QuoteSummaryResponse>(&body) {
            Ok(parsed) => snapshot_from_response(ticker, parsed),
            Err(e) if status.is_success() => Err(e.into()),
            Err(_) => Err(ProviderError::Status {
                status: status.as_u16(),
                body: excerpt(&body),
            }),
        }
    }
}

#[async_trait]
impl MetricSource for YahooClient {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch(&self, ticker: &Ticker) -> Result<MetricSet, ProviderError> {
        let snapshot = self.fetch_snapshot(ticker).await?;
        Ok(derive_metrics(&snapshot))
    }
}
