//! Request/response logging middleware.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{Span, debug_span, info};

/// Logs request method, path, status, and duration.
///
/// Share tokens appear in public paths, so only the route prefix of those
/// is logged.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = redact_token(request.uri().path());
    let start = Instant::now();

    let response = next.run(request).await;

    info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        "HTTP request"
    );

    response
}

/// Span for one HTTP request, with share tokens redacted from the path.
pub fn request_span(request: &Request) -> Span {
    debug_span!(
        "request",
        method = %request.method(),
        path = %redact_token(request.uri().path()),
        version = ?request.version(),
    )
}

fn redact_token(path: &str) -> String {
    match path.strip_prefix("/api/share/") {
        Some(rest) => {
            let action = rest.split_once('/').map(|(_, a)| a).unwrap_or("");
            format!("/api/share/***/{action}")
        }
        None => path.to_string(),
    }
}
