//! Smoke tests for the fully wired service: real upstream clients pointed at
//! an address nobody listens on, and the SQLite cache backend.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;
use wthrn::config::{CacheBackend, Config};

const UNREACHABLE: &str = "http://127.0.0.1:9";

async fn spawn_app() -> (Arc<wthrn::api::AppState>, Router) {
    let db_path =
        std::env::temp_dir().join(format!("wthrn-smoke-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.cache.backend = CacheBackend::Sqlite;
    config.cache.database_url = format!("sqlite:{}", db_path.display());
    config.upstream.places_base_url = UNREACHABLE.to_string();
    config.upstream.darksky_base_url = UNREACHABLE.to_string();
    config.upstream.places_timeout_seconds = 2;
    config.upstream.forecast_timeout_seconds = 2;

    let state = wthrn::api::create_app_state_from_config(config, None)
        .await
        .expect("failed to create app state");

    let router = wthrn::api::router(state.clone());
    (state, router)
}

async fn get_body(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

#[tokio::test]
async fn test_health() {
    let (_, app) = spawn_app().await;

    let (status, body) = get_body(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn test_ready_pings_cache_database() {
    let (state, app) = spawn_app().await;
    assert!(state.shared.store.is_some());

    let (status, body) = get_body(&app, "/health/ready").await;
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cache_backend"], "sqlite");
}

#[tokio::test]
async fn test_unreachable_places_degrades_to_placeholder() {
    let (_, app) = spawn_app().await;

    let (status, body) = get_body(&app, "/typeahead?text=France%3A%20Paris").await;
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["title"], "<i>(location not found)</i>");
}

#[tokio::test]
async fn test_unreachable_forecast_still_renders_card() {
    let (_, app) = spawn_app().await;
    let selection = r#"{"location":"Oslo","context":"Norway","coordinates":{"lat":59.91,"lng":10.75},"thumb":"t.png"}"#;
    let uri = format!(
        "/resolver?text={}",
        url::form_urlencoded::byte_serialize(selection.as_bytes()).collect::<String>()
    );

    let (status, body) = get_body(&app, &uri).await;
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert!(body["body"].as_str().unwrap().contains("Oslo, Norway"));
}

#[tokio::test]
async fn test_metrics_disabled_without_recorder() {
    let (_, app) = spawn_app().await;

    let (status, body) = get_body(&app, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("not enabled"));
}
