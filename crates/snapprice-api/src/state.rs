//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use snapprice_auth::{
    AuditTrail, CsrfGuard, MemoryCounterStore, PasswordHasher, RateLimitRule, RateLimiter,
    SessionGuard, SessionManager, SessionStore, SqlSessionStore,
};
use snapprice_core::Clock;
use snapprice_core::config::AppConfig;
use snapprice_database::DatabasePool;
use snapprice_database::repositories::{AuditLogRepository, SessionRepository, UserRepository};

/// The limiters guarding the API, each over its own counter store.
#[derive(Debug)]
pub struct Limiters {
    /// Per-IP limiter in front of every `/api` route.
    pub api: RateLimiter,
    /// Per-IP login limiter.
    pub login_ip: RateLimiter,
    /// Per-username-and-IP login limiter.
    pub login_user: RateLimiter,
}

impl Limiters {
    fn from_config(config: &AppConfig, clock: &Arc<dyn Clock>) -> Self {
        let rl = &config.rate_limit;
        let login_window = Duration::from_secs(rl.login_window_seconds);
        let limiter = |name, max, window| {
            RateLimiter::new(
                name,
                RateLimitRule::new(max, window),
                Arc::new(MemoryCounterStore::new()),
                clock.clone(),
            )
        };
        Self {
            api: limiter("api", rl.api_max, Duration::from_secs(rl.api_window_seconds)),
            login_ip: limiter("login_ip", rl.login_max_per_ip, login_window),
            login_user: limiter("login_user", rl.login_max_per_user, login_window),
        }
    }

    fn all(&self) -> [&RateLimiter; 3] {
        [&self.api, &self.login_ip, &self.login_user]
    }
}

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Time source for every expiry and window decision
    pub clock: Arc<dyn Clock>,

    // ── Infrastructure ───────────────────────────────────────
    /// SQLite connection pool
    pub db: DatabasePool,
    /// User repository
    pub user_repo: Arc<UserRepository>,

    // ── Security pipeline ────────────────────────────────────
    /// Session resolution and privilege-drift rotation
    pub session_guard: Arc<SessionGuard>,
    /// Login/logout flows
    pub session_manager: Arc<SessionManager>,
    /// Anti-forgery tokens
    pub csrf: Arc<CsrfGuard>,
    /// Audit trail
    pub audit: Arc<AuditTrail>,
    /// Request rate limiters
    pub limiters: Arc<Limiters>,
    /// Password hasher (Argon2)
    pub password_hasher: PasswordHasher,
}

impl AppState {
    /// Wire every component over a connected, migrated pool.
    pub fn new(config: AppConfig, db: DatabasePool, clock: Arc<dyn Clock>) -> Self {
        let pool = db.pool().clone();
        let max_age_ms = config.session.max_age_millis();

        let user_repo = Arc::new(UserRepository::new(pool.clone()));
        let session_store: Arc<dyn SessionStore> = Arc::new(SqlSessionStore::new(
            SessionRepository::new(pool.clone()),
            clock.clone(),
        ));
        let audit = Arc::new(AuditTrail::new(
            AuditLogRepository::new(pool),
            clock.clone(),
            config.audit.clone(),
        ));
        let session_guard = Arc::new(SessionGuard::new(
            session_store.clone(),
            user_repo.clone(),
            clock.clone(),
        ));
        let session_manager = Arc::new(SessionManager::new(
            session_store.clone(),
            user_repo.clone(),
            audit.clone(),
            clock.clone(),
            max_age_ms,
        ));
        let csrf = Arc::new(CsrfGuard::new(session_store, clock.clone(), max_age_ms));
        let limiters = Arc::new(Limiters::from_config(&config, &clock));

        Self {
            config: Arc::new(config),
            clock,
            db,
            user_repo,
            session_guard,
            session_manager,
            csrf,
            audit,
            limiters,
            password_hasher: PasswordHasher::new(),
        }
    }

    /// Start the background counter sweepers. Requires a Tokio runtime.
    pub fn spawn_housekeeping(&self) -> Vec<JoinHandle<()>> {
        let min_interval = Duration::from_secs(self.config.rate_limit.sweep_min_interval_seconds);
        self.limiters
            .all()
            .into_iter()
            .map(|limiter| limiter.spawn_sweeper(min_interval))
            .collect()
    }
}
