//! Server binary: reads settings, prepares the database, mounts the routes.

use catalog_api::{
    app_router, ensure_database_exists, ensure_tables, seed_categories, seed_products, AppState,
    PgProductRepository, Settings,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

const SEED_PRODUCT_COUNT: usize = 20;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("catalog_api=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    ensure_database_exists(&settings.database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await?;

    ensure_tables(&pool).await?;
    if settings.seed {
        seed_categories(&pool).await?;
        seed_products(&pool, SEED_PRODUCT_COUNT).await?;
    }
    if settings.expose_errors {
        tracing::warn!("APP_DEBUG is on: error responses include internal diagnostics");
    }

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    let state = AppState::new(Arc::new(PgProductRepository::new(pool)), settings);
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app_router(state)).await?;
    Ok(())
}
