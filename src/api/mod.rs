use axum::{
    Router,
    http::{HeaderValue, Method, request::Parts},
    middleware,
    routing::get,
};
use metrics_exporter_prometheus::PrometheusHandle;
use regex::Regex;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::{Config, ServerConfig};
use crate::services::TypeaheadService;
use crate::state::SharedState;

mod error;
mod observability;
mod resolver;
mod typeahead;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn typeahead(&self) -> &TypeaheadService {
        &self.shared.typeahead
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = cors_layer(&state.config().server);

    Router::new()
        .route("/typeahead", get(typeahead::typeahead))
        .route("/resolver", get(resolver::resolve))
        .route("/health", get(observability::health))
        .route("/health/ready", get(observability::ready))
        .route("/metrics", get(observability::get_metrics))
        .fallback(observability::not_found)
        .with_state(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(middleware::from_fn(observability::logging_middleware))
}

/// The widget calls us from the browser with cookies attached, so origins
/// are mirrored back individually instead of using a wildcard.
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let pattern = match Regex::new(&server.allowed_origin_pattern) {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            warn!(error = %e, "Ignoring invalid allowed_origin_pattern");
            None
        }
    };
    let explicit = server.cors_allowed_origins.clone();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin_allowed(origin, pattern.as_ref(), &explicit)
            },
        ))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

fn origin_allowed(origin: &HeaderValue, pattern: Option<&Regex>, explicit: &[String]) -> bool {
    let Ok(origin) = origin.to_str() else {
        return false;
    };

    explicit.iter().any(|allowed| allowed == origin)
        || pattern.is_some_and(|p| p.is_match(origin))
}
