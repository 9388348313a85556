//! Integration tests for admin user management and session rotation.

use axum::http::StatusCode;
use serde_json::json;

use snapprice_entity::audit::AuditFilter;
use snapprice_entity::user::UserRole;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_create_user_validation() {
    let app = TestApp::new().await;
    app.create_user("root", "password123", UserRole::Admin).await;
    let mut admin = app.logged_in("root", "password123").await;

    let short_name = admin
        .send("POST", "/api/admin/users", Some(json!({ "username": " ab ", "password": "password123" })))
        .await;
    assert_eq!(short_name.status, StatusCode::BAD_REQUEST);
    assert_eq!(short_name.body["message"], "Username must be at least 3 characters");

    let short_password = admin
        .send("POST", "/api/admin/users", Some(json!({ "username": "carol", "password": "short" })))
        .await;
    assert_eq!(short_password.status, StatusCode::BAD_REQUEST);
    assert_eq!(short_password.body["message"], "Password must be at least 8 characters");

    let created = admin
        .send("POST", "/api/admin/users", Some(json!({ "username": " carol ", "password": "password123" })))
        .await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.body["user"]["username"], "carol");
    assert_eq!(created.body["user"]["role"], "user");
    assert!(created.body["user"].get("password_hash").is_none());

    let duplicate = admin
        .send("POST", "/api/admin/users", Some(json!({ "username": "carol", "password": "password123" })))
        .await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);
    assert_eq!(duplicate.body["message"], "Username already exists");

    let filter = AuditFilter {
        action: Some("admin.user.create".into()),
        ..Default::default()
    };
    let logs = app.state.audit.query(&filter, None, None).await.unwrap();
    assert_eq!(logs.iter().filter(|e| e.success).count(), 1);
    assert_eq!(logs.iter().filter(|e| !e.success).count(), 3);
}

#[tokio::test]
async fn test_regular_user_is_forbidden() {
    let app = TestApp::new().await;
    app.create_user("alice", "password123", UserRole::User).await;
    let mut client = app.logged_in("alice", "password123").await;

    let response = client.get("/api/admin/users").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), "FORBIDDEN");
}

#[tokio::test]
async fn test_last_admin_cannot_be_disabled_or_demoted() {
    let app = TestApp::new().await;
    let root = app.create_user("root", "password123", UserRole::Admin).await;
    let mut admin = app.logged_in("root", "password123").await;
    let path = format!("/api/admin/users/{}", root.id);

    for body in [json!({ "disabled": true }), json!({ "role": "user" })] {
        let response = admin.send("PUT", &path, Some(body)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body["message"], "Cannot disable/demote the last admin");
    }

    let unchanged = app.state.user_repo.find_by_id(root.id).await.unwrap().unwrap();
    assert!(unchanged.is_admin());
    assert!(!unchanged.disabled);
    assert_eq!(unchanged.updated_at, root.updated_at);

    let filter = AuditFilter {
        action: Some("admin.user.update".into()),
        success: Some(false),
        ..Default::default()
    };
    assert_eq!(app.state.audit.query(&filter, None, None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_unknown_role_is_coerced_on_create_and_ignored_on_update() {
    let app = TestApp::new().await;
    app.create_user("root", "password123", UserRole::Admin).await;
    let alice = app.create_user("alice", "password123", UserRole::Admin).await;
    let mut admin = app.logged_in("root", "password123").await;

    let created = admin
        .send(
            "POST",
            "/api/admin/users",
            Some(json!({ "username": "dave", "password": "password123", "role": "superuser" })),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.body["user"]["role"], "user");

    let updated = admin
        .send("PUT", &format!("/api/admin/users/{}", alice.id), Some(json!({ "role": "owner" })))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    let alice = app.state.user_repo.find_by_id(alice.id).await.unwrap().unwrap();
    assert_eq!(alice.role, UserRole::Admin);
}

#[tokio::test]
async fn test_update_unknown_user_is_not_found() {
    let app = TestApp::new().await;
    app.create_user("root", "password123", UserRole::Admin).await;
    let mut admin = app.logged_in("root", "password123").await;

    let response = admin
        .send("PUT", "/api/admin/users/9999", Some(json!({ "disabled": true })))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "User not found");
}

#[tokio::test]
async fn test_promotion_rotates_session_and_keeps_csrf_token() {
    let app = TestApp::new().await;
    app.create_user("root", "password123", UserRole::Admin).await;
    let alice = app.create_user("alice", "password123", UserRole::User).await;
    let mut admin = app.logged_in("root", "password123").await;
    let mut user = app.logged_in("alice", "password123").await;
    let before = user.session.clone().unwrap();
    let token = user.csrf.clone().unwrap();

    let response = admin
        .send("PUT", &format!("/api/admin/users/{}", alice.id), Some(json!({ "role": "admin" })))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let me = user.get("/api/auth/me").await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["user"]["role"], "admin");
    let after = user.session.clone().unwrap();
    assert_ne!(after, before, "privilege change must rotate the session id");

    // The rotated session still accepts the token the page already holds.
    assert_eq!(user.csrf.as_deref(), Some(token.as_str()));
    let created = user
        .send("POST", "/api/admin/users", Some(json!({ "username": "dave", "password": "password123" })))
        .await;
    assert_eq!(created.status, StatusCode::OK);

    // The pre-rotation id is dead.
    user.session = Some(before);
    assert_eq!(user.get("/api/auth/me").await.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_demotion_rotates_before_forbidding() {
    let app = TestApp::new().await;
    app.create_user("root", "password123", UserRole::Admin).await;
    let second = app.create_user("second", "password123", UserRole::Admin).await;
    let mut admin = app.logged_in("root", "password123").await;
    let mut demoted = app.logged_in("second", "password123").await;
    let before = demoted.session.clone().unwrap();

    let response = admin
        .send("PUT", &format!("/api/admin/users/{}", second.id), Some(json!({ "role": "user" })))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = demoted.get("/api/admin/users").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(response.header("set-cookie").is_some());
    assert_ne!(demoted.session.as_deref(), Some(before.as_str()));
    assert_eq!(demoted.get("/api/auth/me").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_password_change_rotates_and_updates_credentials() {
    let app = TestApp::new().await;
    app.create_user("root", "password123", UserRole::Admin).await;
    let alice = app.create_user("alice", "password123", UserRole::User).await;
    let mut admin = app.logged_in("root", "password123").await;
    let mut user = app.logged_in("alice", "password123").await;
    let before = user.session.clone();

    let response = admin
        .send(
            "PUT",
            &format!("/api/admin/users/{}", alice.id),
            Some(json!({ "password": "new-password-1" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    assert_eq!(user.get("/api/auth/me").await.status, StatusCode::OK);
    assert_ne!(user.session, before);

    let mut fresh = app.client();
    assert_eq!(
        fresh.login("alice", "password123", None).await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        fresh.login("alice", "new-password-1", None).await.status,
        StatusCode::OK
    );

    let filter = AuditFilter {
        action: Some("admin.user.update".into()),
        ..Default::default()
    };
    let logs = app.state.audit.query(&filter, None, None).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].details.0["password_changed"], true);
    assert_eq!(logs[0].entity_id.as_deref(), Some(alice.id.to_string().as_str()));
}
