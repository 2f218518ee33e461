use axum::extract::FromRef;
use std::sync::Arc;
use stockkpi::services::KpiPipeline;

// --- Type Aliases for Shared State ---

// Immutable pipeline shared by every request; owns the provider clients
pub type SharedPipeline = Arc<KpiPipeline>;

// Name reported by the health endpoint and page title bar
#[derive(Clone, Debug)]
pub struct ServiceInfo {
    pub name: String,
    pub environment: String,
}

pub type SharedServiceInfo = Arc<ServiceInfo>;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: SharedPipeline,
    pub service: SharedServiceInfo,
}

impl AppState {
    pub fn new(pipeline: KpiPipeline, service: ServiceInfo) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            service: Arc::new(service),
        }
    }
}

impl FromRef<AppState> for SharedPipeline {
    fn from_ref(app_state: &AppState) -> SharedPipeline {
        app_state.pipeline.clone()
    }
}

impl FromRef<AppState> for SharedServiceInfo {
    fn from_ref(app_state: &AppState) -> SharedServiceInfo {
        app_state.service.clone()
    }
}
