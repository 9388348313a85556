//! Integration tests for CSRF protection.

use axum::http::StatusCode;
use serde_json::json;

use snapprice_entity::user::UserRole;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_token_endpoint_creates_anonymous_session() {
    let app = TestApp::new().await;
    let mut client = app.client();

    let first = client.fetch_csrf().await;
    let session = client.session.clone();
    assert!(session.is_some(), "an anonymous session cookie is issued");

    // The same session keeps the same token.
    let second = client.fetch_csrf().await;
    assert_eq!(first, second);
    assert_eq!(client.session, session);
}

#[tokio::test]
async fn test_login_requires_token() {
    let app = TestApp::new().await;
    app.create_user("alice", "password123", UserRole::User).await;
    let mut client = app.client();
    client.fetch_csrf().await;

    let body = json!({ "username": "alice", "password": "password123" });
    let response = client
        .send_with_csrf("POST", "/api/auth/login", Some(body), None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "CSRF_REJECTED");
    assert_eq!(response.body["message"], "Invalid CSRF token");
}

#[tokio::test]
async fn test_writes_need_matching_token() {
    let app = TestApp::new().await;
    app.create_user("root", "password123", UserRole::Admin).await;
    let mut client = app.logged_in("root", "password123").await;
    let body = json!({ "username": "carol", "password": "password123" });

    for bad in [None, Some(""), Some("   "), Some("not-the-token")] {
        let response = client
            .send_with_csrf("POST", "/api/admin/users", Some(body.clone()), bad)
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "token {bad:?}");
        assert_eq!(response.error_code(), "CSRF_REJECTED");
    }
    assert!(app.state.user_repo.find_by_username("carol").await.unwrap().is_none());

    let response = client.send("POST", "/api/admin/users", Some(body)).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_reads_need_no_token() {
    let app = TestApp::new().await;
    app.create_user("alice", "password123", UserRole::User).await;
    let mut client = app.logged_in("alice", "password123").await;

    let response = client
        .send_with_csrf("GET", "/api/auth/me", None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_token_from_another_session_is_rejected() {
    let app = TestApp::new().await;
    app.create_user("alice", "password123", UserRole::User).await;
    let mut alice = app.logged_in("alice", "password123").await;

    let mut other = app.client();
    let foreign = other.fetch_csrf().await;

    let response = alice
        .send_with_csrf("POST", "/api/auth/logout", None, Some(&foreign))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(alice.get("/api/auth/me").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_csrf_rejection_precedes_authentication() {
    let app = TestApp::new().await;
    let mut client = app.client();

    let response = client
        .send_with_csrf("POST", "/api/admin/users", Some(json!({})), None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "CSRF_REJECTED");

    let response = client.get("/api/admin/users").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
