pub mod api;
pub mod config;
pub mod data_structures;
pub mod render;

use crate::data_structures::{AppState, ServiceInfo};
use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use stockkpi::services::KpiPipeline;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_config = config::AppConfig::load()?;

    // Initialize tracing with service name in all logs
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    // Set a global span with service name for all subsequent logs
    let _span = tracing::info_span!("service", name = %app_config.service_name).entered();

    tracing::info!("Starting stock-kpi-dashboard");
    tracing::info!(
        environment = %app_config.environment,
        port = app_config.port,
        rate_limit_per_second = app_config.rate_limit.per_second,
        rate_limit_burst = app_config.rate_limit.burst_size,
        "Loaded configuration"
    );

    let pipeline = KpiPipeline::from_settings(&app_config.providers)?;
    let app_state = AppState::new(
        pipeline,
        ServiceInfo {
            name: app_config.service_name.clone(),
            environment: app_config.environment.clone(),
        },
    );

    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(app_config.rate_limit.per_second)
            .burst_size(app_config.rate_limit.burst_size)
            .finish()
            .context("invalid rate limit configuration")?,
    );

    let app = api::app(
        api::api_routes().layer(GovernorLayer::new(governor_conf)),
        app_state,
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], app_config.port));
    tracing::info!(%addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
