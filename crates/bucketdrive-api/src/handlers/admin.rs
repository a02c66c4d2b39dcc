//! Admin handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use bucketdrive_entity::audit::AuditEvent;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/admin/audit/links/{id}
pub async fn link_audit_trail(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<AuditEvent>>>, ApiError> {
    let events = state.share_service.audit_trail(&auth, id).await?;
    Ok(Json(ApiResponse::ok(events)))
}
