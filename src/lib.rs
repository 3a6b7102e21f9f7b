//! Catalog API: product catalog REST backend over PostgreSQL.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod pagination;
pub mod repository;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use config::Settings;
pub use error::{Action, AppError, ConfigError, ValidationErrors};
pub use models::{Category, Product, ProductAttributes};
pub use repository::{Load, PgProductRepository, ProductRepository, ProductTransaction};
pub use routes::app_router;
pub use service::{ProductValidator, TransactionScope};
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_tables, seed_categories, seed_products};
