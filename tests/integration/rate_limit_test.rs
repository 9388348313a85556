//! Integration tests for the request rate limiters.

use axum::http::StatusCode;
use chrono::Duration;

use snapprice_core::config::AppConfig;
use snapprice_entity::user::UserRole;

use crate::helpers::TestApp;

fn config(edit: impl FnOnce(&mut AppConfig)) -> AppConfig {
    let mut config = AppConfig::default();
    edit(&mut config);
    config
}

#[tokio::test]
async fn test_login_per_user_limit_sets_retry_after() {
    let app = TestApp::with_config(config(|c| {
        c.rate_limit.login_max_per_user = 1;
        c.rate_limit.login_window_seconds = 10;
    }))
    .await;
    app.create_user("alice", "password123", UserRole::User).await;
    let mut client = app.client();

    let first = client.login("alice", "wrong-password", None).await;
    assert_eq!(first.status, StatusCode::UNAUTHORIZED);
    assert_eq!(first.header("x-ratelimit-limit"), Some("1"));
    assert_eq!(first.header("x-ratelimit-remaining"), Some("0"));
    let reset: i64 = first.header("x-ratelimit-reset").unwrap().parse().unwrap();
    assert_eq!(reset, 1_700_000_010);

    // Same account in a different case shares the bucket.
    let second = client.login("  ALICE ", "password123", None).await;
    assert_eq!(second.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(second.error_code(), "RATE_LIMITED");
    let retry: u64 = second.header("retry-after").unwrap().parse().unwrap();
    assert!((1..=10).contains(&retry), "retry-after {retry}");

    app.clock.advance(Duration::seconds(10));
    let third = client.login("alice", "password123", None).await;
    assert_eq!(third.status, StatusCode::OK);
}

#[tokio::test]
async fn test_rejected_login_is_not_evaluated() {
    let app = TestApp::with_config(config(|c| c.rate_limit.login_max_per_ip = 1)).await;
    app.create_user("alice", "password123", UserRole::User).await;
    let mut client = app.client();

    assert_eq!(client.login("alice", "password123", None).await.status, StatusCode::OK);
    let blocked = client.login("alice", "password123", None).await;
    assert_eq!(blocked.status, StatusCode::TOO_MANY_REQUESTS);
    assert!(blocked.header("retry-after").is_some());

    // Only the first attempt reached the login flow.
    assert_eq!(app.count("audit_logs").await, 1);
}

#[tokio::test]
async fn test_login_limits_are_per_ip() {
    let app = TestApp::with_config(config(|c| c.rate_limit.login_max_per_ip = 1)).await;
    app.create_user("alice", "password123", UserRole::User).await;

    let mut first = app.client_from([10, 0, 0, 1]);
    let mut second = app.client_from([10, 0, 0, 2]);
    assert_eq!(first.login("alice", "password123", None).await.status, StatusCode::OK);
    assert_eq!(second.login("alice", "password123", None).await.status, StatusCode::OK);
    assert_eq!(
        first.login("alice", "password123", None).await.status,
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[tokio::test]
async fn test_api_limiter_covers_every_route() {
    let app = TestApp::with_config(config(|c| c.rate_limit.api_max = 2)).await;
    let mut client = app.client();

    let ok = client.get("/api/health").await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.header("x-ratelimit-limit"), Some("2"));
    assert_eq!(ok.header("x-ratelimit-remaining"), Some("1"));

    assert_eq!(client.get("/api/csrf").await.status, StatusCode::OK);
    let blocked = client.get("/api/auth/me").await;
    assert_eq!(blocked.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(blocked.header("retry-after"), Some("60"));

    // Another client address has its own budget.
    let mut other = app.client_from([192, 168, 1, 5]);
    assert_eq!(other.get("/api/health").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_oversize_login_body_is_rejected_as_too_large() {
    let app = TestApp::with_config(config(|c| c.server.max_body_bytes = 64)).await;
    let mut client = app.client();
    client.fetch_csrf().await;

    let padding = "x".repeat(256);
    let response = client.login(&padding, "password123", None).await;
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.error_code(), "PAYLOAD_TOO_LARGE");
    assert_eq!(app.count("audit_logs").await, 0);
}
