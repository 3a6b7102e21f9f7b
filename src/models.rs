//! Plain data structs for categories and products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 99.99)]
    pub price: Decimal,
    pub category_id: i64,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Present when the product was loaded with its category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

/// Validated, normalized product attributes. Writes replace every column with these values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductAttributes {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: i64,
    pub image_url: Option<String>,
}

/// Request body accepted by create and update.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductPayload {
    #[schema(example = "New Product")]
    pub name: String,
    #[schema(example = "A great product")]
    pub description: Option<String>,
    #[schema(example = 49.99)]
    pub price: f64,
    #[schema(example = 2)]
    pub category_id: i64,
    #[schema(example = "https://example.com/image.jpg")]
    pub image_url: Option<String>,
}
