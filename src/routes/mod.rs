//! Router assembly: common routes at the root, product routes under `/api/v1`.

pub mod common;
pub mod product;

pub use common::common_routes_with_ready;
pub use product::product_routes;

use crate::state::AppState;
use axum::{
    extract::{DefaultBodyLimit, Request},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Full application router with request tracing and the body size limit applied.
pub fn app_router(state: AppState) -> Router {
    let max_body_bytes = state.settings.max_body_bytes;
    Router::new()
        .merge(common_routes_with_ready(state.clone()))
        .nest("/api/v1", product_routes(state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                    tracing::info_span!(
                        "request",
                        id = %uuid::Uuid::new_v4(),
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                }))
                .layer(RequestBodyLimitLayer::new(max_body_bytes))
                .layer(DefaultBodyLimit::max(max_body_bytes)),
        )
}
