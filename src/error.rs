use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;

use crate::parser::RenderError;

/// Key used for errors that are not tied to a single field.
pub const NON_FIELD_ERRORS: &str = "__all__";

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_PATH_FORMAT: &str =
    "Path can only contain letters, numbers and hyphens and end with /";
pub const MSG_DUPLICATE_PAGE: &str = "Page with this Path and Language already exists.";

/// Field-keyed validation failures, presented to editors as form errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationError {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut err = Self::new();
        err.add(field, message);
        err
    }

    pub fn path_format() -> Self {
        Self::single("path", MSG_PATH_FORMAT)
    }

    pub fn duplicate_page() -> Self {
        Self::single(NON_FIELD_ERRORS, MSG_DUPLICATE_PAGE)
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(|m| m.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_uniqueness_conflict(&self) -> bool {
        self.field(NON_FIELD_ERRORS)
            .is_some_and(|m| m.iter().any(|msg| msg == MSG_DUPLICATE_PAGE))
    }

    /// Turns an accumulated error set into a result.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// Failures surfaced by request handlers.
///
/// `NotFound` covers both absent and inaccessible resources so that callers
/// cannot tell the two apart.
#[derive(Debug, thiserror::Error)]
pub enum CmsError {
    #[error("not found")]
    NotFound,

    #[error("authentication required")]
    Unauthenticated { login_url: String },

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl IntoResponse for CmsError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => (StatusCode::NOT_FOUND, Json(json!({"error": "Not found"})))
                .into_response(),
            Self::Unauthenticated { login_url } => {
                (StatusCode::FOUND, [(header::LOCATION, login_url)]).into_response()
            }
            Self::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({"errors": errors})),
            )
                .into_response(),
            Self::Render(e) => {
                tracing::error!("Rendering failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": e.to_string()})),
                )
                    .into_response()
            }
            Self::Storage(e) => {
                tracing::error!("Storage failure: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "Internal server error"})),
                )
                    .into_response()
            }
        }
    }
}
