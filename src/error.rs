use std::collections::HashMap;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use thiserror::Error;

use crate::auth::{CredentialError, TokenError};
use crate::database::RepositoryError;
use crate::services::CatalogError;

pub const MSG_AUTHORIZATION_NOT_PROVIDED: &str = "Authorization not provided";
pub const MSG_NOT_AUTHORIZED: &str = "You are not authorized";
pub const MSG_BOOK_NOT_FOUND: &str = "Book not found";

/// Every failure a handler can answer with. The message is always safe to
/// show a client; internal detail is logged where the error is converted.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{message}")]
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    #[error("{0}")]
    InvalidJson(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    InternalServerError(String),
    #[error("{0}")]
    ServiceUnavailable(String),
}

impl ApiError {
    fn kind(&self) -> (StatusCode, &'static str) {
        use ApiError::*;
        match self {
            BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ValidationError { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            InvalidJson(_) => (StatusCode::BAD_REQUEST, "INVALID_JSON"),
            Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            InternalServerError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR"),
            ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.kind().0
    }

    /// Machine-readable `code` field of the error body.
    pub fn error_code(&self) -> &'static str {
        self.kind().1
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code(),
        });
        if let ApiError::ValidationError { field_errors: Some(fields), .. } = self {
            body["field_errors"] = json!(fields);
        }
        body
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(message: impl Into<String>, field_errors: Option<HashMap<String, String>>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }

    pub fn missing_authorization() -> Self {
        ApiError::validation_error(MSG_AUTHORIZATION_NOT_PROVIDED, None)
    }

    pub fn book_not_found() -> Self {
        ApiError::not_found(MSG_BOOK_NOT_FOUND)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict { field, .. } => ApiError::conflict(format!("Duplicate value for '{}'", field)),
            RepositoryError::InvalidDocument(msg) => {
                tracing::error!("Stored document is malformed: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            RepositoryError::ConfigMissing(_) | RepositoryError::InvalidDatabaseUrl => {
                tracing::error!("Database misconfigured: {}", err);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            RepositoryError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid(msg) => {
                tracing::warn!("Rejected bearer token: {}", msg);
                ApiError::unauthorized(MSG_NOT_AUTHORIZED)
            }
            TokenError::InvalidSecret | TokenError::Generation(_) => {
                tracing::error!("Token service failure: {}", err);
                ApiError::internal_server_error("Failed to issue token")
            }
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::MissingField(field) => {
                let mut field_errors = HashMap::new();
                field_errors.insert(field.to_string(), "This field is required".to_string());
                ApiError::validation_error("Missing required fields", Some(field_errors))
            }
            CredentialError::DuplicateEmail(_) => ApiError::conflict("This email already exists"),
            CredentialError::UnknownUser(_) => ApiError::not_found("This email does not exist"),
            CredentialError::WrongPassword => ApiError::unauthorized("Incorrect password"),
            CredentialError::Repository(e) => e.into(),
            CredentialError::Hashing(_) | CredentialError::Task(_) => {
                tracing::error!("Credential processing failed: {}", err);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(_) => ApiError::book_not_found(),
            CatalogError::InvalidPayload(msg) => ApiError::invalid_json(msg),
            CatalogError::Repository(e) => e.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_authorization_is_validation_failure() {
        let err = ApiError::missing_authorization();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_json()["message"], "Authorization not provided");
        assert_eq!(err.to_json()["code"], "VALIDATION_ERROR");
    }

    #[test]
    fn invalid_token_maps_to_unauthorized() {
        let err: ApiError = TokenError::Invalid("ExpiredSignature".into()).into();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.message(), MSG_NOT_AUTHORIZED);
    }

    #[test]
    fn duplicate_email_maps_to_conflict() {
        let err: ApiError = CredentialError::DuplicateEmail("a@x.com".into()).into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn persistence_failures_hide_details() {
        let err: ApiError = RepositoryError::Sqlx(sqlx::Error::PoolTimedOut).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message().contains("PoolTimedOut"));
    }
}
