//! API error types for handler operations
//!
//! Structured errors for the REST handlers, mapped to HTTP responses via
//! `IntoResponse`. Not-found outcomes answer with a plain-text message,
//! validation failures with a JSON field list, and internal failures with
//! an empty 500 (details go to the log only).
//!
//! # Example
//!
//! ```rust
//! use address_service::handlers::{ApiError, ApiErrorKind, ApiOperation};
//!
//! let error = ApiError::not_found(ApiOperation::Delete, "Address not found");
//! assert!(matches!(error.kind, ApiErrorKind::NotFound));
//! assert_eq!(error.kind.status_code().as_u16(), 404);
//! ```

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::geocoding::{GeocodingError, NO_RESULT_MESSAGE};
use crate::repository::{RepositoryError, RepositoryOperation};
use crate::responses::ValidationError;

/// Handler operation being performed when the error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    List,
    Get,
    Search,
    Create,
    Update,
    Delete,
    CalculateDistance,
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Get => write!(f, "get"),
            Self::Search => write!(f, "search"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::CalculateDistance => write!(f, "calculate_distance"),
        }
    }
}

/// Category of API error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    NotFound,
    ValidationFailed,
    BadRequest,
    InternalError,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::BadRequest => write!(f, "bad_request"),
            Self::InternalError => write!(f, "internal_error"),
        }
    }
}

impl ApiErrorKind {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::ValidationFailed | Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn error_code(&self) -> String {
        format!("{}", self).to_uppercase()
    }
}

/// Structured API error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub operation: ApiOperation,
    pub kind: ApiErrorKind,
    /// For `NotFound` this is the response body; for `InternalError` it is only logged
    pub message: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub field_errors: Option<ValidationError>,
}

impl ApiError {
    pub fn new(operation: ApiOperation, kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
            field_errors: None,
        }
    }

    /// 404 whose body is exactly `message`
    pub fn not_found(operation: ApiOperation, message: impl Into<String>) -> Self {
        Self::new(operation, ApiErrorKind::NotFound, message)
    }

    pub fn bad_request(operation: ApiOperation, message: impl Into<String>) -> Self {
        Self::new(operation, ApiErrorKind::BadRequest, message)
    }

    pub fn internal(operation: ApiOperation, message: impl Into<String>) -> Self {
        Self::new(operation, ApiErrorKind::InternalError, message)
    }

    #[must_use]
    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    #[must_use]
    pub fn with_operation(mut self, operation: ApiOperation) -> Self {
        self.operation = operation;
        self
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "API {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(ref entity_type), Some(ref entity_id)) = (&self.entity_type, &self.entity_id) {
            write!(f, " [{}: {}]", entity_type, entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Serialize, Deserialize)]
struct ApiErrorResponse {
    error: String,
    code: String,
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    operation: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.kind.status_code();

        match self.kind {
            ApiErrorKind::NotFound => {
                tracing::warn!(
                    operation = %self.operation,
                    entity_type = ?self.entity_type,
                    entity_id = ?self.entity_id,
                    "{}", self.message
                );
                (status, self.message).into_response()
            }
            ApiErrorKind::ValidationFailed => {
                tracing::info!(operation = %self.operation, "request rejected: {}", self.message);
                let errors = self
                    .field_errors
                    .unwrap_or_else(|| ValidationError::new(self.message));
                (status, Json(errors)).into_response()
            }
            ApiErrorKind::BadRequest => {
                tracing::info!(operation = %self.operation, "bad request: {}", self.message);
                let response = ApiErrorResponse {
                    error: self.message,
                    code: self.kind.error_code(),
                    status: status.as_u16(),
                    operation: Some(self.operation.to_string()),
                };
                (status, Json(response)).into_response()
            }
            ApiErrorKind::InternalError => {
                tracing::error!(
                    operation = %self.operation,
                    kind = %self.kind,
                    entity_type = ?self.entity_type,
                    entity_id = ?self.entity_id,
                    "API error: {}", self.message
                );
                status.into_response()
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(errors: ValidationError) -> Self {
        Self {
            message: errors.message().to_string(),
            field_errors: Some(errors),
            ..Self::new(ApiOperation::Create, ApiErrorKind::ValidationFailed, "")
        }
    }
}

fn repository_operation_to_api_operation(op: RepositoryOperation) -> ApiOperation {
    match op {
        RepositoryOperation::FindById | RepositoryOperation::Exists => ApiOperation::Get,
        RepositoryOperation::FindAll | RepositoryOperation::Count => ApiOperation::List,
        RepositoryOperation::Search => ApiOperation::Search,
        RepositoryOperation::Create => ApiOperation::Create,
        RepositoryOperation::Update => ApiOperation::Update,
        RepositoryOperation::Delete => ApiOperation::Delete,
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        // Handlers check existence before writing, so even a store-level
        // NotFound means a write lost a race with a delete: 500.
        Self {
            operation: repository_operation_to_api_operation(err.operation),
            kind: ApiErrorKind::InternalError,
            message: err.to_string(),
            entity_type: err.entity_type,
            entity_id: err.entity_id,
            field_errors: None,
        }
    }
}

impl From<GeocodingError> for ApiError {
    fn from(err: GeocodingError) -> Self {
        match err {
            GeocodingError::NoResult => {
                Self::not_found(ApiOperation::CalculateDistance, NO_RESULT_MESSAGE)
            }
            other => Self::internal(ApiOperation::CalculateDistance, other.to_string()),
        }
    }
}
