//! Shared link management handlers (authenticated).

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::dto::request::CreateShareRequest;
use crate::dto::response::{ApiResponse, CreateShareResponse, ShareLinkResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/shares
pub async fn list_shares(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<ShareLinkResponse>>>, ApiError> {
    let links = state.share_service.list_links(&auth).await?;
    let share = &state.config.share;
    Ok(Json(ApiResponse::ok(
        links
            .into_iter()
            .map(|record| ShareLinkResponse::from_record(record, share))
            .collect(),
    )))
}

/// POST /api/shares
pub async fn create_share(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateShareRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreateShareResponse>>), ApiError> {
    let record = state.share_service.create_link(&auth, req.into()).await?;
    let link = ShareLinkResponse::from_record(record, &state.config.share);
    let share_url = link.share_url.clone();

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(CreateShareResponse { link, share_url })),
    ))
}

/// GET /api/shares/{id}
pub async fn get_share(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ShareLinkResponse>>, ApiError> {
    let record = state.share_service.get_link(&auth, id).await?;
    Ok(Json(ApiResponse::ok(ShareLinkResponse::from_record(
        record,
        &state.config.share,
    ))))
}

/// DELETE /api/shares/{id}
pub async fn revoke_share(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ShareLinkResponse>>, ApiError> {
    let record = state.share_service.revoke_link(&auth, id).await?;
    Ok(Json(ApiResponse::ok(ShareLinkResponse::from_record(
        record,
        &state.config.share,
    ))))
}
