//! JSON routes, mounted under `/api`.

use crate::handlers::api::{create, delete as delete_handler, list, read, update};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/posts", get(list).post(create))
        .route(
            "/posts/:id",
            get(read).put(update).patch(update).delete(delete_handler),
        )
        .with_state(state)
}
