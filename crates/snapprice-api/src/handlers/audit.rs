//! Self-service audit handlers.

use axum::Json;
use axum::extract::{Query, State};

use snapprice_entity::audit::AuditFilter;

use crate::dto::request::PageQuery;
use crate::dto::response::AuditLogsResponse;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::state::AppState;

/// GET /api/audit/mine
pub async fn my_activity(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<AuditLogsResponse>, ApiError> {
    let (limit, offset) = query.parsed();
    let logs = state
        .audit
        .query(&AuditFilter::for_actor(current.user.id), limit, offset)
        .await?;
    Ok(Json(AuditLogsResponse { ok: true, logs }))
}
