//! Repository interface over the products and categories tables.
//!
//! Reads go straight to the store. Mutations happen on a [`ProductTransaction`]
//! obtained from [`ProductRepository::begin`]; dropping one without commit rolls back.

mod postgres;
#[cfg(test)]
pub(crate) mod memory;

pub use postgres::{PgProductRepository, PgProductTransaction};

use crate::error::AppError;
use crate::models::{Product, ProductAttributes};
use crate::pagination::PageRequest;
use async_trait::async_trait;

/// Which relations to load alongside a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Load {
    Bare,
    WithCategory,
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// One page of products, newest first, each with its category. Returns the page and the total count.
    async fn list(&self, page: PageRequest) -> Result<(Vec<Product>, u64), AppError>;

    async fn find(&self, id: i64, load: Load) -> Result<Option<Product>, AppError>;

    async fn category_exists(&self, id: i64) -> Result<bool, AppError>;

    async fn begin(&self) -> Result<Box<dyn ProductTransaction>, AppError>;

    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> Result<(), AppError>;
}

#[async_trait]
pub trait ProductTransaction: Send {
    /// Insert a product and return its id.
    async fn insert(&mut self, attrs: &ProductAttributes) -> Result<i64, AppError>;

    /// Replace all attributes of a product. `false` when no row has that id.
    async fn update(&mut self, id: i64, attrs: &ProductAttributes) -> Result<bool, AppError>;

    /// `false` when no row has that id.
    async fn delete(&mut self, id: i64) -> Result<bool, AppError>;

    async fn commit(self: Box<Self>) -> Result<(), AppError>;

    async fn rollback(self: Box<Self>) -> Result<(), AppError>;
}
