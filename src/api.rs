use crate::data_structures::{AppState, SharedPipeline, SharedServiceInfo};
use crate::render;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use stockkpi::utils::format_table_csv;
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info, instrument};

#[derive(Debug, Default, Deserialize)]
pub struct CompareQuery {
    /// Raw comma-separated ticker input, exactly as typed
    pub tickers: Option<String>,
}

impl CompareQuery {
    fn input(&self) -> &str {
        self.tickers.as_deref().unwrap_or_default()
    }
}

#[instrument(skip(pipeline))]
pub async fn index_handler(
    State(pipeline): State<SharedPipeline>,
    Query(query): Query<CompareQuery>,
) -> Html<String> {
    let table = match query.tickers.as_deref() {
        Some(input) if !input.trim().is_empty() => pipeline.compare_input(input).await,
        _ => None,
    };

    if table.is_none() && query.tickers.is_some() {
        debug!("No usable tickers in input, rendering form only");
    }

    Html(render::render_page(query.tickers.as_deref(), table.as_ref()))
}

#[instrument(skip(pipeline))]
pub async fn compare_json_handler(
    State(pipeline): State<SharedPipeline>,
    Query(query): Query<CompareQuery>,
) -> Response {
    match pipeline.compare_input(query.input()).await {
        Some(table) => {
            info!(tickers = table.tickers.len(), "Returning comparison table as JSON");
            (StatusCode::OK, Json(table)).into_response()
        }
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

#[instrument(skip(pipeline))]
pub async fn compare_csv_handler(
    State(pipeline): State<SharedPipeline>,
    Query(query): Query<CompareQuery>,
) -> Response {
    let Some(table) = pipeline.compare_input(query.input()).await else {
        return StatusCode::NO_CONTENT.into_response();
    };

    match format_table_csv(&table) {
        Ok(csv) => {
            info!(tickers = table.tickers.len(), "Returning comparison table as CSV");
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"kpi_comparison.csv\"",
                    ),
                ],
                csv,
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to render CSV");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render CSV").into_response()
        }
    }
}

#[instrument(skip(service), fields(service = %service.name))]
pub async fn health_handler(State(service): State<SharedServiceInfo>) -> &'static str {
    debug!(environment = %service.environment, "Health check");
    "OK"
}

/// JSON and CSV endpoints, mounted under `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/compare", get(compare_json_handler))
        .route("/compare.csv", get(compare_csv_handler))
        .layer(CorsLayer::permissive())
}

/// The full application. `api` is the (possibly rate-limited) `/api` router.
pub fn app(api: Router<AppState>, state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .nest("/api", api)
        .with_state(state)
}
