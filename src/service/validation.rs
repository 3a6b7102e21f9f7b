//! Product request validation.

use crate::error::{AppError, ValidationErrors};
use crate::models::ProductAttributes;
use crate::repository::ProductRepository;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;

pub const INVALID_CATEGORY: &str = "The selected category id is invalid.";

const NAME_MAX: usize = 255;
const IMAGE_URL_MAX: usize = 2048;
const PRICE_SCALE: u32 = 2;

pub struct ProductValidator;

impl ProductValidator {
    /// Shape checks only: presence, types and ranges. Every rule runs; failures are collected per field.
    pub fn validate(body: &HashMap<String, Value>) -> Result<ProductAttributes, AppError> {
        let (errors, draft) = check(body);
        draft.finish(errors)
    }

    /// Shape checks plus a lookup that `category_id` names an existing category.
    pub async fn validate_against(
        body: &HashMap<String, Value>,
        repo: &dyn ProductRepository,
    ) -> Result<ProductAttributes, AppError> {
        let (mut errors, draft) = check(body);
        if let Some(category_id) = draft.category_id {
            if !repo.category_exists(category_id).await? {
                errors.add("category_id", INVALID_CATEGORY);
            }
        }
        draft.finish(errors)
    }
}

#[derive(Default)]
struct Draft {
    name: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
    category_id: Option<i64>,
    image_url: Option<String>,
}

impl Draft {
    fn finish(self, errors: ValidationErrors) -> Result<ProductAttributes, AppError> {
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        match (self.name, self.price, self.category_id) {
            (Some(name), Some(price), Some(category_id)) => Ok(ProductAttributes {
                name,
                description: self.description,
                price,
                category_id,
                image_url: self.image_url,
            }),
            _ => Err(AppError::Validation(ValidationErrors::single(
                "body",
                "The given data was invalid.",
            ))),
        }
    }
}

fn label(field: &str) -> String {
    field.replace('_', " ")
}

/// Strings are trimmed and empty strings count as absent.
fn normalized<'a>(body: &'a HashMap<String, Value>, field: &str) -> Option<&'a Value> {
    match body.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(v) => Some(v),
    }
}

fn check(body: &HashMap<String, Value>) -> (ValidationErrors, Draft) {
    let mut errors = ValidationErrors::new();
    let mut draft = Draft::default();

    match normalized(body, "name") {
        None => errors.add("name", required("name")),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.chars().count() > NAME_MAX {
                errors.add("name", too_long("name", NAME_MAX));
            } else {
                draft.name = Some(s.to_string());
            }
        }
        Some(_) => errors.add("name", not_string("name")),
    }

    match normalized(body, "description") {
        None => {}
        Some(Value::String(s)) => draft.description = Some(s.trim().to_string()),
        Some(_) => errors.add("description", not_string("description")),
    }

    match normalized(body, "price") {
        None => errors.add("price", required("price")),
        Some(v) => match parse_decimal(v) {
            None => errors.add("price", "The price field must be a number."),
            Some(p) if p.is_sign_negative() && !p.is_zero() => {
                errors.add("price", "The price field must be at least 0.")
            }
            Some(p) if p.normalize().scale() > PRICE_SCALE => errors.add(
                "price",
                format!("The price field must have at most {} decimal places.", PRICE_SCALE),
            ),
            Some(p) if p > max_price() => errors.add(
                "price",
                format!("The price field must not be greater than {}.", max_price()),
            ),
            Some(p) => draft.price = Some(p.normalize()),
        },
    }

    match normalized(body, "category_id") {
        None => errors.add("category_id", required("category_id")),
        Some(v) => match parse_integer(v) {
            Some(id) => draft.category_id = Some(id),
            None => errors.add("category_id", "The category id field must be an integer."),
        },
    }

    match normalized(body, "image_url") {
        None => {}
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.chars().count() > IMAGE_URL_MAX {
                errors.add("image_url", too_long("image_url", IMAGE_URL_MAX));
            } else if url::Url::parse(s).is_err() {
                errors.add("image_url", "The image url field must be a valid URL.");
            } else {
                draft.image_url = Some(s.to_string());
            }
        }
        Some(_) => errors.add("image_url", not_string("image_url")),
    }

    (errors, draft)
}

fn required(field: &str) -> String {
    format!("The {} field is required.", label(field))
}

fn not_string(field: &str) -> String {
    format!("The {} field must be a string.", label(field))
}

fn too_long(field: &str, max: usize) -> String {
    format!("The {} field must not be greater than {} characters.", label(field), max)
}

/// Largest value a NUMERIC(10,2) column holds.
fn max_price() -> Decimal {
    Decimal::new(99_999_999_99, PRICE_SCALE)
}

fn parse_decimal(v: &Value) -> Option<Decimal> {
    let raw = match v {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .ok()
}

fn parse_integer(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
