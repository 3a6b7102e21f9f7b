//! Database bootstrap: create the database and tables if missing, and seed demo data.

use crate::error::AppError;
use rust_decimal::Decimal;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

const CATEGORY_NAMES: &[&str] = &["Electronics", "Clothing", "Home & Kitchen", "Books"];

const PRODUCT_WORDS: &[&str] = &[
    "lamp", "kettle", "jacket", "novel", "speaker", "blender", "scarf", "atlas", "router", "skillet",
    "hoodie", "journal", "charger", "teapot", "sneaker", "cookbook", "monitor", "toaster", "beanie",
    "almanac",
];

/// Create `categories` and `products` if they do not exist. Idempotent.
pub async fn ensure_tables(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            description TEXT,
            price NUMERIC(10, 2) NOT NULL CHECK (price >= 0),
            category_id BIGINT NOT NULL REFERENCES categories (id) ON DELETE RESTRICT,
            image_url VARCHAR(2048),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS products_created_at_idx ON products (created_at DESC, id DESC)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS products_category_id_idx ON products (category_id)")
        .execute(pool)
        .await?;
    Ok(())
}

/// Insert the default categories when the table is empty. Returns the number inserted.
pub async fn seed_categories(pool: &PgPool) -> Result<u64, AppError> {
    let mut tx = pool.begin().await?;
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(&mut *tx)
        .await?;
    if existing > 0 {
        tracing::info!(existing, "categories already present, skipping seed");
        return Ok(0);
    }
    for name in CATEGORY_NAMES {
        sqlx::query("INSERT INTO categories (name) VALUES ($1)")
            .bind(*name)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    tracing::info!(count = CATEGORY_NAMES.len(), "seeded categories");
    Ok(CATEGORY_NAMES.len() as u64)
}

/// A deterministic demo product. `category_ids` must not be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category_id: i64,
    pub image_url: String,
}

pub fn seed_product(index: usize, category_ids: &[i64]) -> Option<SeedProduct> {
    let category_id = *category_ids.get(index % category_ids.len().max(1))?;
    let word = PRODUCT_WORDS.get(index % PRODUCT_WORDS.len())?;
    let cents = 1_000 + (index as i64 * 4_937) % 99_000;
    let color = (index as u32).wrapping_mul(0x9E37_79B9) & 0xFF_FFFF;
    Some(SeedProduct {
        name: word.to_string(),
        description: format!("A dependable {} for everyday use.", word),
        price: Decimal::new(cents, 2),
        category_id,
        image_url: format!("https://placehold.co/600x400/{:06X}/FFF?text={}", color, word),
    })
}

/// Insert `count` demo products spread over the existing categories when the table is empty.
pub async fn seed_products(pool: &PgPool, count: usize) -> Result<u64, AppError> {
    let mut tx = pool.begin().await?;
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&mut *tx)
        .await?;
    if existing > 0 {
        tracing::info!(existing, "products already present, skipping seed");
        return Ok(0);
    }
    let category_ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM categories ORDER BY id")
        .fetch_all(&mut *tx)
        .await?;
    if category_ids.is_empty() {
        tracing::warn!("no categories, skipping product seed");
        return Ok(0);
    }
    let mut inserted = 0u64;
    for index in 0..count {
        let Some(product) = seed_product(index, &category_ids) else {
            continue;
        };
        sqlx::query(
            "INSERT INTO products (name, description, price, category_id, image_url) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.category_id)
        .bind(&product.image_url)
        .execute(&mut *tx)
        .await?;
        inserted += 1;
    }
    tx.commit().await?;
    tracing::info!(count = inserted, "seeded products");
    Ok(inserted)
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let scheme_end = url.find("://").map(|i| i + 3).unwrap_or(0);
    let path_start = url
        .get(scheme_end..)
        .and_then(|rest| rest.find('/'))
        .map(|i| scheme_end + i + 1)
        .ok_or_else(|| AppError::Store("DATABASE_URL: no database path".into()))?;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = format!("{}postgres", base);
    Ok((admin_url, db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
