//! HTTP error mapping
//!
//! Every failure a handler can produce becomes an [`AppError`], which decides
//! the status code and the body the client sees. Unexpected failures are
//! logged in full and answered with a generic message.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::expiration::ExpirationError;
use crate::service::LookupError;

const VALIDATION_PROBLEM_TYPE: &str = "https://tools.ietf.org/html/rfc9110#section-15.5.1";
const VALIDATION_PROBLEM_TITLE: &str = "Validation errors occurred.";

/// Missing or empty request parameters, keyed by parameter name
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    /// A single missing field
    pub fn required(field: &'static str) -> Self {
        let mut errors = Self::default();
        errors.push_required(field);
        errors
    }

    /// Records `field` as missing when `value` is empty
    pub fn require(&mut self, field: &'static str, value: &str) {
        if value.is_empty() {
            self.push_required(field);
        }
    }

    fn push_required(&mut self, field: &'static str) {
        self.0
            .entry(field)
            .or_default()
            .push(format!("The {field} field is required."));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }
}

/// RFC 9110 style validation problem body
#[derive(Debug, Serialize)]
struct ValidationProblem<'a> {
    #[serde(rename = "type")]
    problem_type: &'static str,
    title: &'static str,
    status: u16,
    errors: &'a BTreeMap<&'static str, Vec<String>>,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation errors occurred")]
    Validation(FieldErrors),

    #[error("Invalid time zone: {0}")]
    InvalidTimeZone(String),

    #[error("Product not found")]
    ProductNotFound,

    #[error("No results found")]
    NoResults,

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl From<ExpirationError> for AppError {
    fn from(err: ExpirationError) -> Self {
        match err {
            ExpirationError::InvalidTimeZoneFormat(raw) | ExpirationError::UnknownTimeZone(raw) => {
                AppError::InvalidTimeZone(raw)
            }
            other @ ExpirationError::OutOfRange(_) => AppError::Unexpected(other.to_string()),
        }
    }
}

impl From<LookupError> for AppError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::ProductNotFound(_) => AppError::ProductNotFound,
            LookupError::Expiration(inner) => inner.into(),
            LookupError::Store(inner) => AppError::Unexpected(inner.to_string()),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidTimeZone(_) => StatusCode::BAD_REQUEST,
            AppError::ProductNotFound | AppError::NoResults => StatusCode::NOT_FOUND,
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::Validation(fields) => {
                let missing: Vec<&str> = fields.fields().collect();
                warn!(?missing, "Rejected request with missing parameters");
                let problem = ValidationProblem {
                    problem_type: VALIDATION_PROBLEM_TYPE,
                    title: VALIDATION_PROBLEM_TITLE,
                    status: status.as_u16(),
                    errors: &fields.0,
                };
                (status, Json(problem)).into_response()
            }
            AppError::InvalidTimeZone(raw) => {
                warn!(zone = %raw, "Invalid time zone");
                (status, Json(json!({ "error": self.to_string() }))).into_response()
            }
            AppError::ProductNotFound | AppError::NoResults => {
                (status, Json(json!({ "message": self.to_string() }))).into_response()
            }
            AppError::Unexpected(detail) => {
                error!(%detail, "Request failed");
                (status, Json(json!({ "error": "Unexpected error occurred" }))).into_response()
            }
        }
    }
}
