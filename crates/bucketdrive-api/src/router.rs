//! Route definitions for the BucketDrive HTTP API.
//!
//! All routes are mounted under `/api`.

use axum::Router;
use axum::routing::get;

use crate::handlers;
use crate::state::AppState;

/// Build the router with all routes, threading `state` through each.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(share_routes())
        .merge(public_routes())
        .merge(admin_routes())
        .merge(health_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

fn share_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/shares",
            get(handlers::share::list_shares).post(handlers::share::create_share),
        )
        .route(
            "/shares/{id}",
            get(handlers::share::get_share).delete(handlers::share::revoke_share),
        )
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/share/{token}/info", get(handlers::public::link_info))
        .route("/share/{token}/download", get(handlers::public::download))
}

fn admin_routes() -> Router<AppState> {
    Router::new().route(
        "/admin/audit/links/{id}",
        get(handlers::admin::link_audit_trail),
    )
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
