use crate::models::{parse_ticker_list, ComparisonTable, MetricSet, Ticker, MAX_TICKERS};
use crate::providers::{AlphaVantageClient, MetricSource, ProviderSettings, YahooClient};
use crate::services::{build_comparison_table, merge_metric_sets};
use crate::utils::Timer;
use anyhow::Context;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Fetch, merge and tabulate KPIs for a handful of tickers.
///
/// Every (ticker, source) fetch runs concurrently. A failing source only
/// degrades its own KPIs; the table is always produced for a non-empty
/// ticker list.
pub struct KpiPipeline {
    primary: Arc<dyn MetricSource>,
    supplementary: Arc<dyn MetricSource>,
}

impl KpiPipeline {
    pub fn new(primary: Arc<dyn MetricSource>, supplementary: Arc<dyn MetricSource>) -> Self {
        Self {
            primary,
            supplementary,
        }
    }

    /// Yahoo Finance as the primary source, Alpha Vantage as the supplementary one
    pub fn from_settings(settings: &ProviderSettings) -> anyhow::Result<Self> {
        let yahoo = YahooClient::new(settings).context("failed to build Yahoo Finance client")?;
        let alpha_vantage =
            AlphaVantageClient::new(settings).context("failed to build Alpha Vantage client")?;

        if settings.alpha_vantage_api_key.is_none() {
            tracing::warn!("No Alpha Vantage API key configured; PEG ratio will be unavailable");
        }

        Ok(Self::new(Arc::new(yahoo), Arc::new(alpha_vantage)))
    }

    async fn merged_metrics(&self, ticker: &Ticker) -> MetricSet {
        let (primary, supplementary) = futures::join!(
            self.primary.fetch_or_fallback(ticker),
            self.supplementary.fetch_or_fallback(ticker)
        );
        merge_metric_sets(ticker, primary, supplementary)
    }

    /// Comparison table for `tickers`, or `None` when the list is empty.
    /// Anything past the third ticker is ignored.
    #[instrument(skip(self, tickers), fields(tickers = ?tickers))]
    pub async fn compare(&self, tickers: &[Ticker]) -> Option<ComparisonTable> {
        if tickers.is_empty() {
            debug!("No tickers requested, skipping comparison");
            return None;
        }

        let timer = Timer::start("KPI comparison");
        let tickers = &tickers[..tickers.len().min(MAX_TICKERS)];

        let fetches = tickers
            .iter()
            .map(|ticker| async move { (ticker.clone(), self.merged_metrics(ticker).await) });
        let merged: HashMap<Ticker, MetricSet> = join_all(fetches).await.into_iter().collect();

        let table = build_comparison_table(tickers, &merged);
        info!(
            ticker_count = tickers.len(),
            rows = table.rows.len(),
            elapsed_ms = timer.elapsed_ms(),
            "Built comparison table"
        );
        Some(table)
    }

    /// Parse raw comma-separated input, then compare
    pub async fn compare_input(&self, input: &str) -> Option<ComparisonTable> {
        self.compare(&parse_ticker_list(input)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Kpi, MetricValue};
    use crate::providers::ProviderError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves canned sets by symbol; unknown symbols fail with `error`.
    struct StubSource {
        name: &'static str,
        sets: HashMap<String, MetricSet>,
        error: fn() -> ProviderError,
        fallback: MetricSet,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn new(name: &'static str, error: fn() -> ProviderError) -> Self {
            Self {
                name,
                sets: HashMap::new(),
                error,
                fallback: MetricSet::new(),
                calls: AtomicUsize::new(0),
            }
        }

        fn serving(mut self, symbol: &str, set: MetricSet) -> Self {
            self.sets.insert(symbol.to_string(), set);
            self
        }

        fn with_fallback(mut self, fallback: MetricSet) -> Self {
            self.fallback = fallback;
            self
        }
    }

    #[async_trait]
    impl MetricSource for StubSource {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fetch(&self, ticker: &Ticker) -> Result<MetricSet, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.sets.get(ticker.as_str()).cloned().ok_or_else(self.error)
        }

        fn fallback(&self) -> MetricSet {
            self.fallback.clone()
        }
    }

    fn not_found() -> ProviderError {
        ProviderError::InvalidResponse("no canned data".to_string())
    }

    fn auth_failure() -> ProviderError {
        ProviderError::Authentication("the parameter apikey is invalid".to_string())
    }

    fn primary_set(forward_pe: f64) -> MetricSet {
        Kpi::ALL
            .iter()
            .map(|&kpi| (kpi, MetricValue::Numeric(forward_pe)))
            .collect::<MetricSet>()
            .with(Kpi::PegRatio, MetricValue::NotAvailable)
    }

    fn peg_sentinel() -> MetricSet {
        MetricSet::new().with(Kpi::PegRatio, MetricValue::NotAvailable)
    }

    fn pipeline(primary: StubSource, supplementary: StubSource) -> KpiPipeline {
        KpiPipeline::new(Arc::new(primary), Arc::new(supplementary))
    }

    #[tokio::test]
    async fn test_supplementary_peg_wins() {
        let primary = StubSource::new("a", not_found).serving("META", primary_set(22.0));
        let supplementary = StubSource::new("b", not_found)
            .serving("META", MetricSet::new().with(Kpi::PegRatio, MetricValue::Numeric(1.4)));

        let table = pipeline(primary, supplementary).compare_input("meta").await.unwrap();
        let meta = Ticker::new("META").unwrap();

        assert_eq!(table.value(&meta, Kpi::PegRatio), Some(MetricValue::Numeric(1.4)));
        assert_eq!(table.value(&meta, Kpi::ForwardPe), Some(MetricValue::Numeric(22.0)));
    }

    #[tokio::test]
    async fn test_supplementary_auth_failure_is_isolated() {
        let primary = StubSource::new("a", not_found).serving("META", primary_set(22.0));
        let supplementary = StubSource::new("b", auth_failure).with_fallback(peg_sentinel());

        let table = pipeline(primary, supplementary).compare_input("META").await.unwrap();
        let meta = Ticker::new("META").unwrap();

        assert_eq!(table.value(&meta, Kpi::PegRatio), Some(MetricValue::NotAvailable));
        for kpi in Kpi::ALL.into_iter().filter(|kpi| *kpi != Kpi::PegRatio) {
            assert_eq!(table.value(&meta, kpi), Some(MetricValue::Numeric(22.0)), "{}", kpi);
        }
    }

    #[tokio::test]
    async fn test_total_failure_yields_sentinel_column() {
        let primary = StubSource::new("a", not_found).serving("META", primary_set(22.0));
        let supplementary = StubSource::new("b", auth_failure).with_fallback(peg_sentinel());

        let table = pipeline(primary, supplementary).compare_input("meta, zzzz").await.unwrap();
        let zzzz = Ticker::new("ZZZZ").unwrap();

        assert_eq!(table.rows.len(), 11);
        assert_eq!(table.column(&zzzz), Some(vec![MetricValue::NotAvailable; 11]));
    }

    #[tokio::test]
    async fn test_truncates_to_three_tickers() {
        let primary = StubSource::new("a", not_found);
        let supplementary = StubSource::new("b", not_found);
        let p = pipeline(primary, supplementary);

        let table = p.compare_input("meta, aapl, msft, goog").await.unwrap();

        let symbols: Vec<&str> = table.tickers.iter().map(Ticker::as_str).collect();
        assert_eq!(symbols, vec!["META", "AAPL", "MSFT"]);
        assert!(table.rows.iter().all(|row| row.values.len() == 3));
    }

    #[tokio::test]
    async fn test_each_pair_fetched_once() {
        let primary = Arc::new(StubSource::new("a", not_found));
        let supplementary = Arc::new(StubSource::new("b", not_found));
        let p = KpiPipeline::new(primary.clone(), supplementary.clone());

        let tickers = parse_ticker_list("meta,aapl,msft,goog,nvda");
        p.compare(&tickers).await.unwrap();

        assert_eq!(primary.calls.load(Ordering::SeqCst), 3);
        assert_eq!(supplementary.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_empty_input_yields_no_table() {
        let p = pipeline(StubSource::new("a", not_found), StubSource::new("b", not_found));
        assert!(p.compare_input("").await.is_none());
        assert!(p.compare_input(" , ").await.is_none());
        assert!(p.compare(&[]).await.is_none());
    }

    #[tokio::test]
    async fn test_repeated_runs_are_identical() {
        let primary = StubSource::new("a", not_found)
            .serving("META", primary_set(22.0))
            .serving("AAPL", primary_set(28.5));
        let supplementary = StubSource::new("b", auth_failure)
            .serving("AAPL", MetricSet::new().with(Kpi::PegRatio, MetricValue::Numeric(2.1)))
            .with_fallback(peg_sentinel());
        let p = pipeline(primary, supplementary);

        let first = p.compare_input("meta,aapl").await.unwrap();
        let second = p.compare_input("meta,aapl").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
