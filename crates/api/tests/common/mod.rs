#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use imhub_api::config::ServerConfig;
use imhub_api::router::build_app_router;
use imhub_api::state::AppState;
use imhub_hub::{Hub, HubConfig};
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        heartbeat_interval_secs: 3600,
        welcome_text: "welcome".to_string(),
    }
}

/// A hub whose heartbeat stays out of the way of test assertions.
pub fn test_hub() -> Arc<Hub> {
    Arc::new(Hub::new(HubConfig {
        heartbeat_interval: Duration::from_secs(3600),
        welcome_text: "welcome".to_string(),
    }))
}

/// Build the full application router around `hub`, using the same
/// middleware stack as `main.rs`.
pub fn build_test_app(hub: Arc<Hub>) -> Router {
    let state = AppState {
        config: Arc::new(test_config()),
        hub,
    };
    build_app_router(state)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
