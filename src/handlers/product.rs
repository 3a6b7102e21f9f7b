//! Product handlers: list, create, show, update, delete.

use crate::error::{Action, AppError, ValidationErrors};
use crate::models::{Product, ProductPayload};
use crate::pagination::{Page, PageRequest};
use crate::repository::Load;
use crate::response::{message_only, success};
use crate::service::{ProductValidator, TransactionScope};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, OriginalUri, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

/// Ids that are not positive integers cannot name a row, so they resolve to "not found".
fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(AppError::product_not_found)
}

fn body_to_map(payload: Result<Json<Value>, JsonRejection>) -> Result<HashMap<String, Value>, AppError> {
    match payload {
        Ok(Json(Value::Object(m))) => Ok(m.into_iter().collect()),
        Ok(Json(_)) => Err(AppError::Validation(ValidationErrors::single(
            "body",
            "The request body must be a JSON object.",
        ))),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(AppError::PayloadTooLarge(rejection.body_text()))
        }
        Err(rejection) => Err(AppError::Validation(ValidationErrors::single(
            "body",
            rejection.body_text(),
        ))),
    }
}

/// Load a product with its category after a committed write.
async fn reload(state: &AppState, id: i64, action: Action) -> Result<Product, AppError> {
    state
        .repo()
        .find(id, Load::WithCategory)
        .await
        .map_err(|e| AppError::persistence(action, e, state.expose_errors()))?
        .ok_or_else(AppError::product_not_found)
}

/// Resolve the target of an update or delete.
async fn resolve(state: &AppState, id: i64, action: Action) -> Result<Product, AppError> {
    state
        .repo()
        .find(id, Load::Bare)
        .await
        .map_err(|e| AppError::persistence(action, e, state.expose_errors()))?
        .ok_or_else(AppError::product_not_found)
}

#[utoipa::path(
    get,
    path = "/api/v1/products",
    tag = "Products",
    params(("page" = Option<u64>, Query, description = "Page number, 15 products per page")),
    responses(
        (status = 200, description = "Products loaded successfully!"),
        (status = 500, description = "Failed to load products")
    )
)]
pub async fn list(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let request = PageRequest::from_query(params.get("page").map(String::as_str));
    let (products, total) = state
        .repo()
        .list(request)
        .await
        .map_err(|e| AppError::persistence(Action::List, e, state.expose_errors()))?;
    let page = Page::new(products, request, total, uri.path());
    Ok(success(StatusCode::OK, page, "Products loaded successfully!"))
}

#[utoipa::path(
    post,
    path = "/api/v1/products",
    tag = "Products",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Data stored successfully!", body = Product),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Failed to create product!")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = body_to_map(payload)?;
    let expose = state.expose_errors();
    let attrs = ProductValidator::validate_against(&body, state.repo())
        .await
        .map_err(|e| AppError::persistence(Action::Create, e, expose))?;

    let mut scope = TransactionScope::begin(state.repo(), Action::Create, expose).await?;
    let outcome = scope.store().insert(&attrs).await;
    let id = scope.complete(outcome).await?;

    let product = reload(&state, id, Action::Create).await?;
    tracing::info!(id, "product created");
    Ok(success(StatusCode::CREATED, product, "Data stored successfully!"))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    tag = "Products",
    params(("id" = i64, Path, description = "ID of the product")),
    responses(
        (status = 200, description = "Product fetched successfully!", body = Product),
        (status = 404, description = "Product not found!")
    )
)]
pub async fn show(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&raw_id)?;
    let product = reload(&state, id, Action::Show).await?;
    Ok(success(StatusCode::OK, product, "Product fetched successfully!"))
}

#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    tag = "Products",
    params(("id" = i64, Path, description = "ID of the product")),
    request_body = ProductPayload,
    responses(
        (status = 200, description = "Product updated successfully!", body = Product),
        (status = 404, description = "Product not found!"),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Failed to update product!")
    )
)]
pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&raw_id)?;
    let expose = state.expose_errors();
    resolve(&state, id, Action::Update).await?;

    let body = body_to_map(payload)?;
    let attrs = ProductValidator::validate_against(&body, state.repo())
        .await
        .map_err(|e| AppError::persistence(Action::Update, e, expose))?;

    let mut scope = TransactionScope::begin(state.repo(), Action::Update, expose).await?;
    let outcome = match scope.store().update(id, &attrs).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(AppError::product_not_found()),
        Err(e) => Err(e),
    };
    scope.complete(outcome).await?;

    let product = reload(&state, id, Action::Update).await?;
    tracing::info!(id, "product updated");
    Ok(success(StatusCode::OK, product, "Product updated successfully!"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    tag = "Products",
    params(("id" = i64, Path, description = "ID of the product")),
    responses(
        (status = 200, description = "Product deleted successfully"),
        (status = 404, description = "Product not found!"),
        (status = 500, description = "Failed to delete product!")
    )
)]
pub async fn destroy(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&raw_id)?;
    resolve(&state, id, Action::Delete).await?;

    let mut scope = TransactionScope::begin(state.repo(), Action::Delete, state.expose_errors()).await?;
    let outcome = match scope.store().delete(id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(AppError::product_not_found()),
        Err(e) => Err(e),
    };
    scope.complete(outcome).await?;

    tracing::info!(id, "product deleted");
    Ok(message_only(StatusCode::OK, "Product deleted successfully"))
}
