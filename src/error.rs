// HTTP API error types and classification
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::config::Environment;

/// API error with appropriate status codes and client-friendly messages.
///
/// Variants are produced at the throw site (conversions below tag errors as
/// they cross the persistence/auth/upload boundaries), so classification is a
/// total match rather than field-sniffing on opaque error shapes.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    Validation {
        message: String,
        field_errors: HashMap<String, String>,
    },
    ForeignKeyViolation(String),

    // 401 Unauthorized
    Unauthorized(String),
    TokenExpired,

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 413 Payload Too Large
    PayloadTooLarge(String),

    // Explicit status carried by the error itself
    WithStatus { status: u16, message: String },

    // 502 Bad Gateway (external provider issues)
    BadGateway(String),

    // 500 Internal Server Error
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Validation { .. } => 400,
            ApiError::ForeignKeyViolation(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::TokenExpired => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::PayloadTooLarge(_) => 413,
            ApiError::WithStatus { status, .. } => *status,
            ApiError::BadGateway(_) => 502,
            ApiError::Internal(_) => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Validation { message, .. } => message,
            ApiError::ForeignKeyViolation(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::TokenExpired => "Token expired",
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::PayloadTooLarge(msg) => msg,
            ApiError::WithStatus { message, .. } => message,
            ApiError::BadGateway(msg) => msg,
            ApiError::Internal(msg) => msg,
        }
    }

    /// Convert to the JSON error envelope.
    ///
    /// The environment mode is an explicit argument rather than ambient state:
    /// production scrubs the message and details from any 500, development
    /// includes the underlying detail and a timestamp.
    pub fn to_json(&self, environment: &Environment) -> Value {
        let status = self.status_code();

        if status >= 500 && *environment == Environment::Production {
            return json!({
                "success": false,
                "error": "Internal server error"
            });
        }

        let mut body = json!({
            "success": false,
            "error": self.message()
        });

        if let ApiError::Validation { field_errors, .. } = self {
            if !field_errors.is_empty() {
                body["details"] = json!(field_errors);
            }
        }

        if *environment == Environment::Development {
            body["timestamp"] = json!(chrono::Utc::now().to_rfc3339());
            if let ApiError::Internal(detail) = self {
                body["detail"] = json!(detail);
            }
        }

        body
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation(message: impl Into<String>, field_errors: HashMap<String, String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            field_errors,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::PayloadTooLarge(message.into())
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        ApiError::WithStatus {
            status,
            message: message.into(),
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

// Tag persistence errors by provider code as they cross the boundary
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => ApiError::not_found("Resource not found"),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                // unique_violation
                Some("23505") => ApiError::conflict("Resource already exists"),
                // foreign_key_violation
                Some("23503") => {
                    ApiError::ForeignKeyViolation("Referenced resource does not exist".to_string())
                }
                // not_null_violation / check_violation
                Some("23502") | Some("23514") => {
                    ApiError::bad_request("Invalid data for a related record")
                }
                _ => {
                    tracing::error!("Database error: {}", db_err);
                    ApiError::internal(db_err.to_string())
                }
            },
            _ => {
                tracing::error!("SQLx error: {}", err);
                ApiError::internal(err.to_string())
            }
        }
    }
}

impl From<crate::database::manager::DatabaseError> for ApiError {
    fn from(err: crate::database::manager::DatabaseError) -> Self {
        use crate::database::manager::DatabaseError;
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::ConfigMissing(name) => {
                tracing::error!("Missing configuration: {}", name);
                ApiError::internal(format!("Missing configuration: {}", name))
            }
            DatabaseError::QueryError(msg) => {
                tracing::error!("Database query error: {}", msg);
                ApiError::internal(msg)
            }
            DatabaseError::Sqlx(sqlx_err) => ApiError::from(sqlx_err),
        }
    }
}

impl From<crate::filter::error::FilterError> for ApiError {
    fn from(err: crate::filter::error::FilterError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => ApiError::TokenExpired,
            _ => ApiError::unauthorized("Invalid token"),
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        ApiError::bad_request(format!("Invalid multipart body: {}", err))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("Storage provider error: {}", err);
        ApiError::bad_gateway("Storage provider unavailable")
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum. The loaded config supplies the
// environment mode at the edge; to_json itself stays mode-explicit.
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = self.to_json(&crate::config::config().environment);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_maps_to_conflict() {
        let err = ApiError::conflict("Resource already exists");
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.message(), "Resource already exists");
    }

    #[test]
    fn expired_token_maps_to_401() {
        let err = ApiError::from(jsonwebtoken::errors::Error::from(
            jsonwebtoken::errors::ErrorKind::ExpiredSignature,
        ));
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.message(), "Token expired");
    }

    #[test]
    fn malformed_token_maps_to_401() {
        let err = ApiError::from(jsonwebtoken::errors::Error::from(
            jsonwebtoken::errors::ErrorKind::InvalidToken,
        ));
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.message(), "Invalid token");
    }

    #[test]
    fn explicit_status_is_used_verbatim() {
        let err = ApiError::with_status(418, "short and stout");
        assert_eq!(err.status_code(), 418);
    }

    #[test]
    fn production_scrubs_internal_detail() {
        let err = ApiError::internal("connection refused at 10.0.0.3:5432");
        let body = err.to_json(&Environment::Production);
        assert_eq!(body["success"], serde_json::json!(false));
        assert_eq!(body["error"], serde_json::json!("Internal server error"));
        assert!(body.get("detail").is_none());
        assert!(body.get("timestamp").is_none());
    }

    #[test]
    fn development_includes_detail_and_timestamp() {
        let err = ApiError::internal("connection refused");
        let body = err.to_json(&Environment::Development);
        assert_eq!(body["detail"], serde_json::json!("connection refused"));
        assert!(body.get("timestamp").is_some());
    }

    #[test]
    fn validation_carries_field_details() {
        let mut fields = HashMap::new();
        fields.insert("email".to_string(), "Email is required".to_string());
        let err = ApiError::validation("Validation failed", fields);
        assert_eq!(err.status_code(), 400);
        let body = err.to_json(&Environment::Production);
        assert_eq!(body["details"]["email"], serde_json::json!("Email is required"));
    }

    #[test]
    fn non_500_errors_keep_message_in_production() {
        let err = ApiError::not_found("Policy not found");
        let body = err.to_json(&Environment::Production);
        assert_eq!(body["error"], serde_json::json!("Policy not found"));
    }
}
