//! # stockkpi - Fundamental KPI comparison for stock tickers
//!
//! Fetches per-ticker metrics from a market-data provider (Yahoo Finance) and
//! a fundamentals provider (Alpha Vantage), merges them into eleven fixed
//! KPIs, and lays them out as a row-per-KPI, column-per-ticker table for up
//! to three tickers.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stockkpi::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = ProviderSettings {
//!         alpha_vantage_api_key: std::env::var("ALPHA_VANTAGE_API_KEY").ok(),
//!         ..ProviderSettings::default()
//!     };
//!     let pipeline = KpiPipeline::from_settings(&settings)?;
//!     if let Some(table) = pipeline.compare_input("META, AAPL, MSFT").await {
//!         println!("{}", stockkpi::utils::format_table_text(&table));
//!     }
//!     Ok(())
//! }
//! ```

pub mod models;
pub mod providers;
pub mod services;
pub mod utils;

// Prelude for convenient imports
pub mod prelude {
    //! Most commonly used types:
    //! ```rust
    //! use stockkpi::prelude::*;
    //! ```

    pub use crate::models::{
        parse_ticker_list, ComparisonRow, ComparisonTable, Kpi, KpiCategory, MetricSet, MetricValue,
        Ticker, MAX_TICKERS,
    };
    pub use crate::providers::{MetricSource, ProviderError, ProviderSettings};
    pub use crate::services::{build_comparison_table, merge_metric_sets, KpiPipeline};
}

pub use utils::{init_logger, Timer};
