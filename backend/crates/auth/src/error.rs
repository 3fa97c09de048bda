//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// An account with this email already exists
    #[error("An account with this email already exists")]
    EmailTaken,

    /// Login failed; deliberately silent about which check failed
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Missing, expired, malformed, or revoked token
    #[error("Not authenticated")]
    Unauthenticated,

    /// Activation ticket never issued or already consumed
    #[error("Activation link is invalid or already used")]
    ActivationTicketUnknown,

    /// Authenticated but not allowed
    #[error("Access denied")]
    Forbidden,

    /// Transient infrastructure failure; the caller should retry.
    /// Never collapsed into an authentication failure.
    #[error("Service temporarily unavailable")]
    StoreUnavailable,

    /// Request payload failed validation
    #[error("{0}")]
    Validation(String),

    /// Non-transient database error
    #[error("Database error")]
    Database(#[source] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::InvalidCredentials | AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::ActivationTicketUnknown => StatusCode::GONE,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::InvalidCredentials | AuthError::Unauthenticated => ErrorKind::Unauthorized,
            AuthError::ActivationTicketUnknown => ErrorKind::Gone,
            AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::StoreUnavailable => ErrorKind::ServiceUnavailable,
            AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::StoreUnavailable => {
                tracing::warn!("Store unavailable during auth operation");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::Forbidden => {
                tracing::warn!("Authorization check failed");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest => AuthError::Validation(err.message().to_string()),
            _ => AuthError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            // Connection-class failures are transient; surface them as such
            // rather than as a generic server error
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => AuthError::StoreUnavailable,
            // 23505: unique violation; the only unique constraint reachable
            // from this crate is users.email
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                AuthError::EmailTaken
            }
            _ => AuthError::Database(err),
        }
    }
}
