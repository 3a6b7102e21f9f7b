//! Typed errors and HTTP mapping.

use crate::response::Envelope;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::panic::Location;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

/// The operation a persistence failure belongs to. Selects the `error` string of the 500 body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Show,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn failure_message(self) -> &'static str {
        match self {
            Action::List => "Failed to load products",
            Action::Show => "Failed to fetch product!",
            Action::Create => "Failed to create product!",
            Action::Update => "Failed to update product!",
            Action::Delete => "Failed to delete product!",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::List => "list",
            Action::Show => "show",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Field-level validation messages in the order the rules were evaluated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: Vec<(String, Vec<String>)>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, messages)) => messages.push(message),
            None => self.fields.push((field.to_string(), vec![message])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total number of messages across all fields.
    pub fn len(&self) -> usize {
        self.fields.iter().map(|(_, m)| m.len()).sum()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// First message, suffixed with the number of remaining ones.
    pub fn summary(&self) -> String {
        let first = self
            .fields
            .first()
            .and_then(|(_, m)| m.first())
            .cloned()
            .unwrap_or_else(|| "The given data was invalid.".to_string());
        match self.len().saturating_sub(1) {
            0 => first,
            1 => format!("{} (and 1 more error)", first),
            n => format!("{} (and {} more errors)", first, n),
        }
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, messages) in &self.fields {
            map.serialize_entry(field, messages)?;
        }
        map.end()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// A store failure after rollback. `cause` and `line` reach the client only when `expose` is set.
#[derive(Debug)]
pub struct PersistenceFailure {
    pub action: Action,
    pub cause: String,
    pub line: u32,
    pub expose: bool,
}

impl fmt::Display for PersistenceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.action, self.cause)
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("validation: {0}")]
    Validation(ValidationErrors),
    #[error("{0} not found!")]
    NotFound(String),
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("store: {0}")]
    Store(String),
    #[error("{0}")]
    Persistence(PersistenceFailure),
}

impl AppError {
    pub fn product_not_found() -> Self {
        AppError::NotFound("Product".into())
    }

    /// Classify `cause` as a failure of `action`. Client errors pass through unchanged.
    #[track_caller]
    pub fn persistence(action: Action, cause: AppError, expose: bool) -> Self {
        Self::persistence_at(action, cause, expose, Location::caller())
    }

    pub(crate) fn persistence_at(
        action: Action,
        cause: AppError,
        expose: bool,
        location: &'static Location<'static>,
    ) -> Self {
        match cause {
            AppError::Validation(_)
            | AppError::NotFound(_)
            | AppError::PayloadTooLarge(_)
            | AppError::Persistence(_) => cause,
            other => {
                tracing::error!(%action, error = %other, line = location.line(), "persistence failure");
                AppError::Persistence(PersistenceFailure {
                    action,
                    cause: other.to_string(),
                    line: location.line(),
                    expose,
                })
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(Envelope::<()>::invalid(errors)),
            )
                .into_response(),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                Json(Envelope::<()>::error(format!("{} not found!", resource))),
            )
                .into_response(),
            AppError::PayloadTooLarge(reason) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(Envelope::<()>::error(reason)),
            )
                .into_response(),
            AppError::Persistence(failure) => {
                let body = if failure.expose {
                    Envelope::<()>::failure(
                        format!("Something went wrong {}", failure.cause),
                        Some(failure.line),
                        failure.action.failure_message(),
                    )
                } else {
                    Envelope::<()>::failure(
                        "Something went wrong".into(),
                        None,
                        failure.action.failure_message(),
                    )
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            other => {
                tracing::error!(error = %other, "unhandled error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(Envelope::<()>::failure(
                        "Something went wrong".into(),
                        None,
                        "Internal server error",
                    )),
                )
                    .into_response()
            }
        }
    }
}
