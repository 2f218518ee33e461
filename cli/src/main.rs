use stockkpi::{
    prelude::*,
    providers::{DEFAULT_ALPHA_VANTAGE_BASE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_YAHOO_BASE_URL, DEFAULT_YAHOO_SESSION_URL},
    utils::{format_kpi_list, format_table_csv, format_table_json, format_table_text, init_logger},
    Timer,
};

use clap::{Parser, Subcommand, ValueEnum};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "stockkpi")]
#[command(about = "Compare fundamental KPIs for up to three stock tickers")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Csv,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch metrics and print the comparison table
    Compare {
        /// Comma-separated tickers, e.g. "META, AAPL, MSFT" (first three are used)
        tickers: String,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Alpha Vantage API key, needed for the PEG ratio
        #[arg(long, env = "ALPHA_VANTAGE_API_KEY", hide_env_values = true)]
        alpha_vantage_key: Option<String>,
        /// Yahoo Finance API base URL
        #[arg(long, default_value = DEFAULT_YAHOO_BASE_URL)]
        yahoo_url: String,
        /// Page visited for a Yahoo session cookie
        #[arg(long, default_value = DEFAULT_YAHOO_SESSION_URL)]
        yahoo_session_url: String,
        /// Skip the Yahoo cookie/crumb handshake
        #[arg(long)]
        no_yahoo_session: bool,
        /// Alpha Vantage API base URL
        #[arg(long, default_value = DEFAULT_ALPHA_VANTAGE_BASE_URL)]
        alpha_vantage_url: String,
        /// Per-request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,
    },
    /// List the compared KPIs with their category and notes
    Kpis,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Compare {
            tickers,
            format,
            alpha_vantage_key,
            yahoo_url,
            yahoo_session_url,
            no_yahoo_session,
            alpha_vantage_url,
            timeout_secs,
        } => {
            let settings = ProviderSettings {
                yahoo_base_url: yahoo_url,
                yahoo_session_url: (!no_yahoo_session).then_some(yahoo_session_url),
                alpha_vantage_base_url: alpha_vantage_url,
                alpha_vantage_api_key: alpha_vantage_key,
                timeout: Duration::from_secs(timeout_secs),
            };
            let pipeline = KpiPipeline::from_settings(&settings)?;

            let timer = Timer::start("compare command");
            let Some(table) = pipeline.compare_input(&tickers).await else {
                tracing::warn!(input = %tickers, "No tickers to compare");
                return Ok(());
            };
            timer.log_elapsed();

            let output = match format {
                OutputFormat::Text => format_table_text(&table),
                OutputFormat::Csv => format_table_csv(&table)?,
                OutputFormat::Json => format_table_json(&table)?,
            };
            println!("{}", output);
        }
        Commands::Kpis => {
            println!("{}", format_kpi_list());
        }
    }

    Ok(())
}
