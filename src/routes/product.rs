//! Product CRUD routes, mounted under `/api/v1`.

use crate::handlers::product::{create, destroy, list, show, update};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn product_routes(state: AppState) -> Router {
    Router::new()
        .route("/products", get(list).post(create))
        .route("/products/:id", get(show).put(update).delete(destroy))
        .with_state(state)
}
