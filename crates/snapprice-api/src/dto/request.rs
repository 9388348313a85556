//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use snapprice_core::error::AppError;
use snapprice_core::result::AppResult;
use snapprice_entity::audit::AuditFilter;

/// Login request body. Missing fields are reported by the login flow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoginBody {
    /// Username.
    pub username: Option<String>,
    /// Password.
    pub password: Option<String>,
    /// `admin` to enter the admin console.
    pub login_as: Option<String>,
}

impl From<LoginBody> for snapprice_auth::session::LoginRequest {
    fn from(req: LoginBody) -> Self {
        Self {
            username: req.username,
            password: req.password,
            login_as: req.login_as,
        }
    }
}

/// Run a body's `validator` rules, reporting the first failing message.
pub fn validate_body<T: Validate>(body: &T) -> AppResult<()> {
    body.validate()
        .map_err(|e| AppError::validation(first_message(&e)))
}

fn first_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .into_iter()
        .flat_map(|(field, errs)| errs.iter().map(move |e| (field.clone(), e)))
        .map(|(field, e)| match &e.message {
            Some(message) => message.to_string(),
            None => format!("Invalid {field}"),
        })
        .next()
        .unwrap_or_else(|| "Invalid request".to_string())
}

/// Create user request (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Username; trimmed before use.
    #[serde(default)]
    pub username: String,
    /// Initial password.
    #[serde(default)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    /// `admin` or `user`; defaults to `user`.
    pub role: Option<String>,
}

/// Update user request (admin). Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateUserRequest {
    /// New role.
    pub role: Option<String>,
    /// Enable or disable the account.
    pub disabled: Option<bool>,
    /// New password; empty means unchanged.
    pub password: Option<String>,
}

/// `limit`/`offset` query parameters. Non-numeric values fall back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageQuery {
    /// Page size.
    pub limit: Option<String>,
    /// Rows to skip.
    pub offset: Option<String>,
}

impl PageQuery {
    /// Parsed `(limit, offset)`.
    pub fn parsed(&self) -> (Option<i64>, Option<i64>) {
        (parse_int(&self.limit), parse_int(&self.offset))
    }
}

/// Admin audit search query parameters.
///
/// Everything arrives as text; unparseable values are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuditSearchQuery {
    /// Numeric actor id, or a username substring.
    pub actor: Option<String>,
    /// Actor role.
    pub role: Option<String>,
    /// Action substring.
    pub action: Option<String>,
    /// Entity type.
    pub entity_type: Option<String>,
    /// Entity id.
    pub entity_id: Option<String>,
    /// `1`/`0`/`true`/`false`.
    pub success: Option<String>,
    /// Lower bound, unix seconds.
    pub since: Option<String>,
    /// Upper bound, unix seconds.
    pub until: Option<String>,
    /// Page size.
    pub limit: Option<String>,
    /// Rows to skip.
    pub offset: Option<String>,
}

impl AuditSearchQuery {
    /// Parsed `(limit, offset)`.
    pub fn page(&self) -> (Option<i64>, Option<i64>) {
        (parse_int(&self.limit), parse_int(&self.offset))
    }

    /// Translate the query into repository predicates.
    pub fn to_filter(&self) -> AuditFilter {
        let mut filter = AuditFilter {
            actor_role: non_blank(&self.role),
            action: non_blank(&self.action),
            entity_type: non_blank(&self.entity_type),
            entity_id: non_blank(&self.entity_id),
            success: self.success.as_deref().and_then(parse_flag),
            since: parse_int(&self.since),
            until: parse_int(&self.until),
            ..Default::default()
        };
        if let Some(actor) = non_blank(&self.actor) {
            match actor.parse::<i64>() {
                Ok(id) => filter.actor_user_id = Some(id),
                Err(_) => filter.actor_username = Some(actor),
            }
        }
        filter
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn parse_int(value: &Option<String>) -> Option<i64> {
    value.as_deref().and_then(|v| v.trim().parse().ok())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}
