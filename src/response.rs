//! Standard response envelope helpers.

use crate::error::ValidationErrors;
use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Uniform body for every outcome: `{data?, message?, errors?, line?, error?}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    fn empty() -> Self {
        Envelope {
            data: None,
            message: None,
            errors: None,
            line: None,
            error: None,
        }
    }

    pub fn data(data: T, message: impl Into<String>) -> Self {
        Envelope {
            data: Some(data),
            message: Some(message.into()),
            ..Self::empty()
        }
    }
}

impl Envelope<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Envelope {
            message: Some(message.into()),
            ..Self::empty()
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Envelope {
            error: Some(error.into()),
            ..Self::empty()
        }
    }

    pub fn invalid(errors: ValidationErrors) -> Self {
        Envelope {
            message: Some(errors.summary()),
            errors: Some(errors),
            ..Self::empty()
        }
    }

    pub fn failure(message: String, line: Option<u32>, error: impl Into<String>) -> Self {
        Envelope {
            message: Some(message),
            line,
            error: Some(error.into()),
            ..Self::empty()
        }
    }
}

pub fn success<T: Serialize>(
    status: StatusCode,
    data: T,
    message: &str,
) -> (StatusCode, Json<Envelope<T>>) {
    (status, Json(Envelope::data(data, message)))
}

pub fn message_only(status: StatusCode, message: &str) -> (StatusCode, Json<Envelope<()>>) {
    (status, Json(Envelope::message(message)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_parts_are_omitted() {
        let body = serde_json::to_value(Envelope::<()>::message("Product deleted successfully")).unwrap();
        assert_eq!(body, json!({ "message": "Product deleted successfully" }));

        let body = serde_json::to_value(Envelope::<()>::error("Product not found!")).unwrap();
        assert_eq!(body, json!({ "error": "Product not found!" }));
    }

    #[test]
    fn failure_carries_line_only_when_given() {
        let body = serde_json::to_value(Envelope::<()>::failure(
            "Something went wrong".into(),
            None,
            "Failed to create product!",
        ))
        .unwrap();
        assert_eq!(
            body,
            json!({ "message": "Something went wrong", "error": "Failed to create product!" })
        );

        let body = serde_json::to_value(Envelope::<()>::failure("x".into(), Some(42), "y")).unwrap();
        assert_eq!(body["line"], 42);
    }

    #[test]
    fn invalid_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "The name field is required.");
        errors.add("price", "The price field is required.");
        let body = serde_json::to_value(Envelope::<()>::invalid(errors)).unwrap();
        assert_eq!(body["message"], "The name field is required. (and 1 more error)");
        assert_eq!(body["errors"]["price"][0], "The price field is required.");
    }

    #[test]
    fn success_wraps_data() {
        let (status, Json(body)) = success(StatusCode::CREATED, json!({ "id": 1 }), "Data stored successfully!");
        assert_eq!(status, StatusCode::CREATED);
        let body = serde_json::to_value(body).unwrap();
        assert_eq!(body, json!({ "data": { "id": 1 }, "message": "Data stored successfully!" }));
    }
}
