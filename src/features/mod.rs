pub mod auth;
pub mod files;
pub mod pages;

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

/// Plain `302 Found` to `location`.
pub fn found_redirect(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
