//! Integration tests for the administrative push and presence endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json};
use serde_json::json;

#[tokio::test]
async fn push_to_offline_user_reports_not_delivered() {
    let app = common::build_test_app(common::test_hub());

    let response = post_json(app, "/api/v1/push/ghost", json!({"message": "hello"})).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["delivered"], false);
}

#[tokio::test]
async fn push_reaches_every_connection_of_user() {
    let hub = common::test_hub();
    let (_a, mut rx_a) = hub.open("u1").unwrap();
    let (_b, mut rx_b) = hub.open("u1").unwrap();
    assert_eq!(rx_a.recv().await.as_deref(), Some("welcome"));
    assert_eq!(rx_b.recv().await.as_deref(), Some("welcome"));
    let app = common::build_test_app(hub.clone());

    let response = post_json(app, "/api/v1/push/u1", json!({"message": "notice"})).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["delivered"], true);

    let seen_a: Vec<String> = std::iter::from_fn(|| rx_a.try_recv().ok()).collect();
    let seen_b: Vec<String> = std::iter::from_fn(|| rx_b.try_recv().ok()).collect();
    assert!(seen_a.iter().any(|t| t == "notice"));
    assert!(seen_b.iter().any(|t| t == "notice"));
}

#[tokio::test]
async fn push_with_blank_message_is_bad_request() {
    let app = common::build_test_app(common::test_hub());

    let response = post_json(app, "/api/v1/push/u1", json!({"message": "  "})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn presence_summary_counts_users_and_connections() {
    let hub = common::test_hub();
    let (_a, _ra) = hub.open("u1").unwrap();
    let (_b, _rb) = hub.open("u1").unwrap();
    let (_c, _rc) = hub.open("u2").unwrap();
    let app = common::build_test_app(hub.clone());

    let json = body_json(get(app, "/api/v1/presence").await).await;

    assert_eq!(json["data"]["online_users"], 2);
    assert_eq!(json["data"]["connections"], 3);
}

#[tokio::test]
async fn user_presence_reflects_registry() {
    let hub = common::test_hub();
    let (mut session, _rx) = hub.open("u1").unwrap();

    let json = body_json(get(common::build_test_app(hub.clone()), "/api/v1/presence/u1").await).await;
    assert_eq!(json["data"]["online"], true);
    assert_eq!(json["data"]["connections"], 1);

    session.on_close();

    let json = body_json(get(common::build_test_app(hub.clone()), "/api/v1/presence/u1").await).await;
    assert_eq!(json["data"]["online"], false);
    assert_eq!(json["data"]["connections"], 0);
}
