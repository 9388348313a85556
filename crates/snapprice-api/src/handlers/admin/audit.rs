//! Admin audit search.

use axum::Json;
use axum::extract::{Query, State};

use crate::dto::request::AuditSearchQuery;
use crate::dto::response::AuditLogsResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/admin/audit
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<AuditSearchQuery>,
) -> Result<Json<AuditLogsResponse>, ApiError> {
    let (limit, offset) = query.page();
    let logs = state.audit.query(&query.to_filter(), limit, offset).await?;
    Ok(Json(AuditLogsResponse { ok: true, logs }))
}
