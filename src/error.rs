use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// ApiError
///
/// The single error taxonomy for the application. Every fallible operation
/// (authentication, authorization, workflow checks, persistence) resolves into
/// one of these variants, and each variant maps to exactly one HTTP status.
/// Nothing is retried and nothing is silently swallowed: a failure terminates
/// the request and is reported to the client as a structured message.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or disallowed input (bad role, forbidden content kind,
    /// attempt to patch an immutable field). Maps to 400.
    #[error("{0}")]
    Validation(String),

    /// Missing/invalid/expired token, or bad login credentials. Maps to 401.
    #[error("{0}")]
    Authentication(String),

    /// Authenticated but lacking the required role or ownership. Maps to 403.
    #[error("{0}")]
    Authorization(String),

    /// A referenced entity does not exist. Maps to 404.
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness violation (username, email, category name). Maps to 409.
    #[error("{0}")]
    Conflict(String),

    /// Persistence-layer failure (connectivity, constraint we did not
    /// anticipate). Surfaced as a generic 500; details go to the logs only.
    #[error("internal server error")]
    Database(#[source] sqlx::Error),

    /// Any other internal failure (hashing, token signing). Also a 500.
    #[error("internal server error")]
    Internal(String),
}

/// ErrorBody
///
/// The wire shape of every error response: `{"error": "..."}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl From<sqlx::Error> for ApiError {
    /// Maps database errors into the taxonomy. Unique-constraint violations
    /// become Conflict so that races on registration or category creation
    /// still surface as 409 rather than 500.
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return ApiError::Conflict("resource already exists".to_string());
            }
        }
        ApiError::Database(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::Authorization(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // 500-class errors carry their details in the logs, never on the wire.
        match &self {
            ApiError::Database(e) => tracing::error!("database error: {:?}", e),
            ApiError::Internal(msg) => tracing::error!("internal error: {}", msg),
            _ => {}
        }

        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
