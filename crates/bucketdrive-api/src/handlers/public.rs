//! Anonymous token-based handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use bucketdrive_service::DownloadOutcome;

use crate::dto::response::{ApiResponse, PublicLinkInfo};
use crate::error::{ApiError, denied_response};
use crate::state::AppState;

/// GET /api/share/{token}/info
///
/// Known tokens get their info and the decision a download would get now,
/// even when that decision is a denial. Unknown tokens get the 404 denial.
pub async fn link_info(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, ApiError> {
    let now = state.share_service.now();
    let resolution = state.share_service.link_info(&token, now).await?;

    match resolution.record {
        Some(record) => Ok(Json(ApiResponse::ok(PublicLinkInfo::new(
            record,
            resolution.decision,
        )))
        .into_response()),
        None => Ok(denied_response(resolution.decision)),
    }
}

/// GET /api/share/{token}/download
pub async fn download(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, ApiError> {
    let now = state.share_service.now();
    let file = match state.download_service.download(&token, now).await? {
        DownloadOutcome::Granted(file) => file,
        DownloadOutcome::Denied(decision) => return Ok(denied_response(decision)),
    };

    let content_type = file
        .meta
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        sanitize_filename(&file.record.file_name)
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from(file.data),
    )
        .into_response())
}

/// Keeps a filename safe to embed in a quoted header parameter.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_control() || !c.is_ascii() => '_',
            c => c,
        })
        .collect()
}
