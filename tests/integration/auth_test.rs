//! Integration tests for the login, logout and session flows.

use axum::http::StatusCode;
use chrono::Duration;
use serde_json::json;
use snapprice_core::Clock;

use snapprice_entity::audit::AuditFilter;
use snapprice_entity::user::{UpdateUser, UserRole};

use crate::helpers::TestApp;

async fn login_audit(app: &TestApp) -> Vec<snapprice_entity::audit::AuditLogEntry> {
    let filter = AuditFilter {
        action: Some("auth.login".into()),
        ..Default::default()
    };
    app.state.audit.query(&filter, None, None).await.unwrap()
}

#[tokio::test]
async fn test_login_success_sets_new_session() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", "password123", UserRole::User).await;

    let mut client = app.client();
    client.fetch_csrf().await;
    let anonymous = client.session.clone().unwrap();

    let response = client.login("alice", "password123", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["ok"], true);
    assert_eq!(response.body["user"]["username"], "alice");
    assert_eq!(response.body["user"]["role"], "user");

    let session = client.session.clone().unwrap();
    assert_ne!(session, anonymous, "login must regenerate the session id");

    let me = client.get("/api/auth/me").await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["user"]["id"], alice.id);

    let logs = login_audit(&app).await;
    assert_eq!(logs.len(), 1);
    assert!(logs[0].success);
    assert_eq!(logs[0].actor_user_id, Some(alice.id));
    assert_eq!(logs[0].details.0["loginAs"], "user");
}

#[tokio::test]
async fn test_login_failures_are_audited() {
    let app = TestApp::new().await;
    app.create_user("alice", "password123", UserRole::User).await;
    let bob = app.create_user("bob", "password123", UserRole::User).await;
    app.state
        .user_repo
        .update(
            bob.id,
            &UpdateUser {
                disabled: Some(true),
                ..Default::default()
            },
            app.clock.now_millis(),
        )
        .await
        .unwrap();

    let mut client = app.client();
    let missing = client.login("alice", "", None).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body["message"], "Missing username/password");

    let unknown = client.login("nobody", "password123", None).await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.body["message"], "Invalid credentials");

    let wrong = client.login("alice", "wrong-password", None).await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let disabled = client.login("bob", "password123", None).await;
    assert_eq!(disabled.status, StatusCode::UNAUTHORIZED);
    assert_eq!(disabled.body["message"], "Invalid credentials");

    let logs = login_audit(&app).await;
    assert_eq!(logs.len(), 4);
    assert!(logs.iter().all(|entry| !entry.success));
    let reasons: Vec<_> = logs
        .iter()
        .map(|entry| entry.details.0["reason"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        reasons,
        [
            "account_disabled",
            "invalid_credentials",
            "invalid_credentials",
            "missing_username_or_password",
        ]
    );
}

#[tokio::test]
async fn test_admin_login_rejects_regular_user() {
    let app = TestApp::new().await;
    app.create_user("alice", "password123", UserRole::User).await;

    let mut client = app.client();
    let response = client.login("alice", "password123", Some("admin")).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["message"], "Not an admin account");

    // No authenticated session came out of it.
    let me = client.get("/api/auth/me").await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);

    let logs = login_audit(&app).await;
    assert_eq!(logs.len(), 1);
    assert!(!logs[0].success);
    assert_eq!(logs[0].details.0["reason"], "not_admin_account");
    assert_eq!(logs[0].details.0["loginAs"], "admin");
}

#[tokio::test]
async fn test_admin_login_accepts_admin() {
    let app = TestApp::new().await;
    app.create_user("root", "password123", UserRole::Admin).await;

    let mut client = app.client();
    let response = client.login("root", "password123", Some("admin")).await;
    assert_eq!(response.status, StatusCode::OK);
    let users = client.get("/api/admin/users").await;
    assert_eq!(users.status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_destroys_session() {
    let app = TestApp::new().await;
    app.create_user("alice", "password123", UserRole::User).await;
    let mut client = app.logged_in("alice", "password123").await;
    let session = client.session.clone();

    // The CSRF token issued before login still works after it.
    let response = client.send("POST", "/api/auth/logout", Some(json!({}))).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "ok": true }));
    assert_eq!(client.session, None, "cookie should be cleared");

    client.session = session;
    let me = client.get("/api/auth/me").await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);

    let filter = AuditFilter {
        action: Some("auth.logout".into()),
        ..Default::default()
    };
    assert_eq!(app.state.audit.query(&filter, None, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_logout_of_disabled_account_is_not_audited() {
    let app = TestApp::new().await;
    let user = app.create_user("alice", "password123", UserRole::User).await;
    let mut client = app.logged_in("alice", "password123").await;

    let disable = UpdateUser {
        disabled: Some(true),
        ..Default::default()
    };
    app.state
        .user_repo
        .update(user.id, &disable, app.clock.now_millis())
        .await
        .unwrap();

    let response = client.send("POST", "/api/auth/logout", Some(json!({}))).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "ok": true }));

    let filter = AuditFilter {
        action: Some("auth.logout".into()),
        ..Default::default()
    };
    assert!(app.state.audit.query(&filter, None, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_expired_session_is_unauthenticated() {
    let app = TestApp::new().await;
    app.create_user("alice", "password123", UserRole::User).await;
    let mut client = app.logged_in("alice", "password123").await;

    app.clock.advance(Duration::hours(167));
    assert_eq!(client.get("/api/auth/me").await.status, StatusCode::OK);

    // Each request slides the expiry; a full idle lifetime ends it.
    app.clock.advance(Duration::hours(168) + Duration::seconds(1));
    let me = client.get("/api/auth/me").await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
    assert_eq!(me.error_code(), "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_disabled_user_loses_session() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", "password123", UserRole::User).await;
    let mut client = app.logged_in("alice", "password123").await;

    app.state
        .user_repo
        .update(
            alice.id,
            &UpdateUser {
                disabled: Some(true),
                ..Default::default()
            },
            app.clock.now_millis(),
        )
        .await
        .unwrap();

    assert_eq!(client.get("/api/auth/me").await.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app.client().get("/api/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "status": "ok", "database": "connected" }));
}
