//! Resource routes for the HTML pages.

use crate::handlers::posts::{create, destroy, edit, home, index, show, spoofed, store, update};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn post_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/posts", get(index).post(store))
        .route("/posts/create", get(create))
        .route(
            "/posts/:id",
            get(show).put(update).patch(update).delete(destroy).post(spoofed),
        )
        .route("/posts/:id/edit", get(edit))
        .with_state(state)
}
