//! PostgreSQL implementation of the product repository.

use super::{Load, ProductRepository, ProductTransaction};
use crate::error::{AppError, ValidationErrors};
use crate::models::{Category, Product, ProductAttributes};
use crate::pagination::PageRequest;
use crate::service::INVALID_CATEGORY;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

const SELECT_WITH_CATEGORY: &str = r#"
    SELECT p.id, p.name, p.description, p.price, p.category_id, p.image_url,
           p.created_at, p.updated_at,
           c.name AS category_name,
           c.created_at AS category_created_at,
           c.updated_at AS category_updated_at
    FROM products p
    JOIN categories c ON c.id = p.category_id
"#;

const SELECT_BARE: &str = r#"
    SELECT p.id, p.name, p.description, p.price, p.category_id, p.image_url,
           p.created_at, p.updated_at,
           NULL::text AS category_name,
           NULL::timestamptz AS category_created_at,
           NULL::timestamptz AS category_updated_at
    FROM products p
"#;

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: Option<String>,
    price: Decimal,
    category_id: i64,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    category_name: Option<String>,
    category_created_at: Option<DateTime<Utc>>,
    category_updated_at: Option<DateTime<Utc>>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        let category = match (row.category_name, row.category_created_at, row.category_updated_at) {
            (Some(name), Some(created_at), Some(updated_at)) => Some(Category {
                id: row.category_id,
                name,
                created_at,
                updated_at,
            }),
            _ => None,
        };
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            category_id: row.category_id,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
            category,
        }
    }
}

#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        PgProductRepository { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn list(&self, page: PageRequest) -> Result<(Vec<Product>, u64), AppError> {
        let sql = format!(
            "{} ORDER BY p.created_at DESC, p.id DESC LIMIT $1 OFFSET $2",
            SELECT_WITH_CATEGORY
        );
        tracing::debug!(sql = %sql, page = page.page, "query");
        let rows: Vec<ProductRow> = sqlx::query_as(&sql)
            .bind(i64::try_from(page.per_page).unwrap_or(i64::MAX))
            .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok((rows.into_iter().map(Product::from).collect(), total.max(0) as u64))
    }

    async fn find(&self, id: i64, load: Load) -> Result<Option<Product>, AppError> {
        let base = match load {
            Load::Bare => SELECT_BARE,
            Load::WithCategory => SELECT_WITH_CATEGORY,
        };
        let sql = format!("{} WHERE p.id = $1", base);
        tracing::debug!(sql = %sql, id, "query");
        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Product::from))
    }

    async fn category_exists(&self, id: i64) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn begin(&self) -> Result<Box<dyn ProductTransaction>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgProductTransaction { tx }))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

/// One open database transaction. Rolls back on drop unless committed.
pub struct PgProductTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ProductTransaction for PgProductTransaction {
    async fn insert(&mut self, attrs: &ProductAttributes) -> Result<i64, AppError> {
        let sql = "INSERT INTO products (name, description, price, category_id, image_url) \
                   VALUES ($1, $2, $3, $4, $5) RETURNING id";
        tracing::debug!(sql = %sql, "query (tx)");
        let id: i64 = sqlx::query_scalar(sql)
            .bind(&attrs.name)
            .bind(&attrs.description)
            .bind(attrs.price)
            .bind(attrs.category_id)
            .bind(&attrs.image_url)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(write_error)?;
        Ok(id)
    }

    async fn update(&mut self, id: i64, attrs: &ProductAttributes) -> Result<bool, AppError> {
        let sql = "UPDATE products SET name = $2, description = $3, price = $4, category_id = $5, \
                   image_url = $6, updated_at = NOW() WHERE id = $1";
        tracing::debug!(sql = %sql, id, "query (tx)");
        let result = sqlx::query(sql)
            .bind(id)
            .bind(&attrs.name)
            .bind(&attrs.description)
            .bind(attrs.price)
            .bind(attrs.category_id)
            .bind(&attrs.image_url)
            .execute(&mut *self.tx)
            .await
            .map_err(write_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&mut self, id: i64) -> Result<bool, AppError> {
        let sql = "DELETE FROM products WHERE id = $1";
        tracing::debug!(sql = %sql, id, "query (tx)");
        let result = sqlx::query(sql).bind(id).execute(&mut *self.tx).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

/// A dangling category reference is the client's mistake, not the store's.
fn write_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_foreign_key_violation() {
            return AppError::Validation(ValidationErrors::single("category_id", INVALID_CATEGORY));
        }
    }
    AppError::Db(err)
}
