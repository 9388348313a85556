//! HTTP integration tests driving the full router.

mod helpers;

mod admin_test;
mod audit_test;
mod auth_test;
mod csrf_test;
mod rate_limit_test;
