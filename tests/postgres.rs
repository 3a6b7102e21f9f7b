//! End-to-end tests against a live PostgreSQL at `DATABASE_URL`.
//!
//! Run with `cargo test --test postgres -- --ignored`.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use catalog_api::{
    app_router, ensure_tables, seed_categories, Action, AppError, AppState, PgProductRepository,
    ProductAttributes, ProductRepository, Settings, TransactionScope,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceExt;

async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for postgres tests");
    let pool = PgPool::connect(&url).await.expect("connect");
    ensure_tables(&pool).await.expect("tables");
    seed_categories(&pool).await.expect("categories");
    pool
}

async fn any_category(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT id FROM categories ORDER BY id LIMIT 1")
        .fetch_one(pool)
        .await
        .expect("category")
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
#[ignore]
async fn product_lifecycle() {
    let pool = pool().await;
    let category_id = any_category(&pool).await;
    let app = app_router(AppState::new(
        Arc::new(PgProductRepository::new(pool.clone())),
        Settings::default(),
    ));

    let payload = json!({
        "name": "Test Product",
        "description": "Test description",
        "price": 99.99,
        "category_id": category_id,
        "image_url": "https://example.com/image.jpg"
    });
    let (status, body) = send(&app, Method::POST, "/api/v1/products", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    for field in ["name", "description", "price", "category_id", "image_url"] {
        assert_eq!(body["data"][field], payload[field], "field {field}");
    }
    let uri = format!("/api/v1/products/{}", body["data"]["id"]);

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "name": "Renamed", "price": 5.25, "category_id": category_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["name"], "Renamed");
    assert_eq!(body["data"]["price"], 5.25);
    assert_eq!(body["data"]["description"], Value::Null);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn foreign_key_violation_rolls_back_as_client_error() {
    let pool = pool().await;
    let repo = PgProductRepository::new(pool.clone());
    let before: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&pool)
        .await
        .unwrap();

    let attrs = ProductAttributes {
        name: "Orphan".into(),
        description: None,
        price: Decimal::new(100, 2),
        category_id: i64::MAX,
        image_url: None,
    };
    let mut scope = TransactionScope::begin(&repo, Action::Create, false).await.unwrap();
    let outcome = scope.store().insert(&attrs).await;
    let err = scope.complete(outcome).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "{err:?}");

    let after: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(before, after);
    assert!(repo.ping().await.is_ok());
}
