//! Shared test helpers for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request, StatusCode, header};
use chrono::DateTime;
use serde_json::Value;
use tower::ServiceExt;

use snapprice_api::AppState;
use snapprice_core::{Clock, ManualClock};
use snapprice_core::config::AppConfig;
use snapprice_database::DatabasePool;
use snapprice_entity::user::{CreateUser, User, UserRole};

/// Test application context
pub struct TestApp {
    /// The Axum app for making test requests
    pub router: Router,
    /// Shared state, for direct repository access
    pub state: AppState,
    /// The clock every component reads
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    /// Create a new test application with default settings
    pub async fn new() -> Self {
        Self::with_config(AppConfig::default()).await
    }

    /// Create a new test application over a private in-memory database
    pub async fn with_config(mut config: AppConfig) -> Self {
        config.database.url = "sqlite::memory:".to_string();
        let db = DatabasePool::connect(&config.database)
            .await
            .expect("Failed to open test database");
        snapprice_database::migration::run_migrations(db.pool())
            .await
            .expect("Failed to run migrations");

        let clock = Arc::new(ManualClock::new(
            DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp"),
        ));
        let state = AppState::new(config, db, clock.clone());
        let router = snapprice_api::build_app(state.clone());

        Self {
            router,
            state,
            clock,
        }
    }

    /// Create a user directly in the database
    pub async fn create_user(&self, username: &str, password: &str, role: UserRole) -> User {
        let password_hash = self
            .state
            .password_hasher
            .hash_password(password)
            .expect("Failed to hash password");
        self.state
            .user_repo
            .create(
                &CreateUser {
                    username: username.to_string(),
                    password_hash,
                    role,
                },
                self.clock.now_millis(),
            )
            .await
            .expect("Failed to create test user")
    }

    /// A cookie-keeping client connecting from 127.0.0.1
    pub fn client(&self) -> TestClient {
        self.client_from([127, 0, 0, 1])
    }

    /// A cookie-keeping client connecting from `ip`
    pub fn client_from(&self, ip: [u8; 4]) -> TestClient {
        TestClient {
            router: self.router.clone(),
            cookie_name: self.state.config.session.cookie_name.clone(),
            addr: SocketAddr::from((ip, 40_000)),
            session: None,
            csrf: None,
        }
    }

    /// A client already logged in as `username`
    pub async fn logged_in(&self, username: &str, password: &str) -> TestClient {
        let mut client = self.client();
        let response = client.login(username, password, None).await;
        assert_eq!(response.status, StatusCode::OK, "Login failed: {:?}", response.body);
        client
    }

    /// Number of rows in `table`
    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(self.state.db.pool())
            .await
            .expect("Failed to count rows")
    }
}

/// A browser stand-in: remembers the session cookie and CSRF token.
pub struct TestClient {
    router: Router,
    cookie_name: String,
    addr: SocketAddr,
    /// Current session cookie value
    pub session: Option<String>,
    /// Token sent in `X-CSRF-Token` on writes
    pub csrf: Option<String>,
}

impl TestClient {
    /// GET /api/csrf and remember the token
    pub async fn fetch_csrf(&mut self) -> String {
        let response = self.get("/api/csrf").await;
        assert_eq!(response.status, StatusCode::OK, "CSRF fetch failed: {:?}", response.body);
        let token = response.body["csrfToken"]
            .as_str()
            .expect("No csrfToken in response")
            .to_string();
        self.csrf = Some(token.clone());
        token
    }

    /// POST /api/auth/login, fetching a CSRF token first if needed
    pub async fn login(&mut self, username: &str, password: &str, login_as: Option<&str>) -> TestResponse {
        if self.csrf.is_none() {
            self.fetch_csrf().await;
        }
        let mut body = serde_json::json!({ "username": username, "password": password });
        if let Some(login_as) = login_as {
            body["loginAs"] = Value::from(login_as);
        }
        self.send("POST", "/api/auth/login", Some(body)).await
    }

    /// Make a GET request
    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.send("GET", path, None).await
    }

    /// Make a request carrying the remembered cookie and CSRF token
    pub async fn send(&mut self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let csrf = self.csrf.clone();
        self.send_with_csrf(method, path, body, csrf.as_deref()).await
    }

    /// Make a request with an explicit CSRF header (or none)
    pub async fn send_with_csrf(
        &mut self,
        method: &str,
        path: &str,
        body: Option<Value>,
        csrf: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::USER_AGENT, "integration-test");

        if let Some(sid) = &self.session {
            req = req.header(header::COOKIE, format!("{}={}", self.cookie_name, sid));
        }
        if let Some(token) = csrf {
            req = req.header("x-csrf-token", token);
        }

        let body = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();
        let mut req = req.body(Body::from(body)).expect("Failed to build request");
        req.extensions_mut().insert(ConnectInfo(self.addr));

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        self.remember_cookie(&headers);

        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    fn remember_cookie(&mut self, headers: &HeaderMap) {
        for value in headers.get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            let pair = value.split(';').next().unwrap_or_default();
            let Some((name, sid)) = pair.split_once('=') else { continue };
            if name.trim() != self.cookie_name {
                continue;
            }
            self.session = Some(sid.trim().to_string()).filter(|s| !s.is_empty());
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// A header value as text
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The `error` code of an error body
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}
