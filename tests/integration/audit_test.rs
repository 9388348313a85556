//! Integration tests for the audit endpoints and retention.

use axum::http::StatusCode;

use snapprice_core::config::AppConfig;
use snapprice_entity::user::UserRole;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_own_activity_is_scoped_to_caller() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", "password123", UserRole::User).await;
    app.create_user("bob", "password123", UserRole::User).await;
    let mut client = app.logged_in("alice", "password123").await;
    app.logged_in("bob", "password123").await;

    let response = client.get("/api/audit/mine").await;
    assert_eq!(response.status, StatusCode::OK);
    let logs = response.body["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["actor_user_id"], alice.id);
    assert_eq!(logs[0]["action"], "auth.login");
    assert_eq!(logs[0]["user_agent"], "integration-test");
    assert_eq!(logs[0]["ip"], "127.0.0.1");

    let paged = client.get("/api/audit/mine?limit=abc&offset=5").await;
    assert_eq!(paged.status, StatusCode::OK);
    assert!(paged.body["logs"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_own_activity_requires_login() {
    let app = TestApp::new().await;
    let response = app.client().get("/api/audit/mine").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_search_filters() {
    let app = TestApp::new().await;
    let root = app.create_user("root", "password123", UserRole::Admin).await;
    app.create_user("alice", "password123", UserRole::User).await;
    let mut admin = app.logged_in("root", "password123").await;
    let mut intruder = app.client();
    intruder.login("alice", "wrong-password", None).await;
    intruder.login("mallory", "wrong-password", None).await;

    let failed = admin.get("/api/admin/audit?action=auth.login&success=0").await;
    assert_eq!(failed.status, StatusCode::OK);
    let logs = failed.body["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0]["actor_username"], "mallory");
    assert_eq!(logs[0]["details"]["reason"], "invalid_credentials");

    let by_id = admin.get(&format!("/api/admin/audit?actor={}", root.id)).await;
    assert_eq!(by_id.body["logs"].as_array().unwrap().len(), 1);

    let by_name = admin.get("/api/admin/audit?actor=lic&role=user").await;
    let logs = by_name.body["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["actor_username"], "alice");

    let limited = admin.get("/api/admin/audit?limit=1").await;
    assert_eq!(limited.body["logs"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_retention_caps_rows() {
    let mut config = AppConfig::default();
    config.audit.max_rows = 3;
    config.audit.purge_every = 1;
    let app = TestApp::with_config(config).await;
    app.create_user("alice", "password123", UserRole::User).await;

    let mut client = app.client();
    for _ in 0..6 {
        client.login("alice", "wrong-password", None).await;
    }
    assert_eq!(app.count("audit_logs").await, 3);
}
