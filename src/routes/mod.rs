//! Route tables and the assembled application.

mod api;
mod common;
mod posts;

pub use api::api_routes;
pub use common::common_routes;
pub use posts::post_routes;

use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Every route plus request tracing and a request body cap.
/// The cap is enforced by the body extractors, so an oversized body surfaces
/// as a 413 rejection that each route renders in its own error format.
pub fn app(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(post_routes(state.clone()))
        .nest("/api", api_routes(state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(body_limit_bytes)),
        )
}
