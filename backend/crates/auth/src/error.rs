//! Auth Error Types
//!
//! Identity-specific failures that integrate with the unified
//! `kernel::error::AppError` system. Every variant maps to exactly one status;
//! server-class variants never echo their internal detail to the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::blocking::BlockingError;
use thiserror::Error;

use crate::domain::token::TokenRejection;
use crate::domain::value_object::username::UsernameError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed or out-of-range caller input
    #[error("{}", .0.message())]
    InvalidInput(AppError),

    /// Username or email collision
    #[error("Username or email already exists")]
    DuplicateIdentity,

    #[error("Account not found")]
    NotFound,

    /// Unknown username or wrong password (deliberately indistinguishable)
    #[error("Invalid credentials")]
    CredentialsInvalid,

    #[error("Account not verified")]
    AccountNotActive,

    #[error("Invalid token: {0}")]
    TokenInvalid(TokenRejection),

    #[error("Authorization header missing")]
    MissingAuthorization,

    #[error("Invalid authorization header format")]
    InvalidAuthorizationFormat,

    /// A bounded operation exceeded its deadline
    #[error("Operation timed out: {0}")]
    Timeout(&'static str),

    /// Storage or transport not reachable
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AuthError::DuplicateIdentity => StatusCode::CONFLICT,
            AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::CredentialsInvalid
            | AuthError::TokenInvalid(_)
            | AuthError::MissingAuthorization
            | AuthError::InvalidAuthorizationFormat => StatusCode::UNAUTHORIZED,
            AuthError::AccountNotActive => StatusCode::FORBIDDEN,
            AuthError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AuthError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidInput(_) => ErrorKind::BadRequest,
            AuthError::DuplicateIdentity => ErrorKind::Conflict,
            AuthError::NotFound => ErrorKind::NotFound,
            AuthError::CredentialsInvalid
            | AuthError::TokenInvalid(_)
            | AuthError::MissingAuthorization
            | AuthError::InvalidAuthorizationFormat => ErrorKind::Unauthorized,
            AuthError::AccountNotActive => ErrorKind::Forbidden,
            AuthError::Timeout(_) => ErrorKind::GatewayTimeout,
            AuthError::Unavailable(_) => ErrorKind::ServiceUnavailable,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to the caller-facing AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::InvalidInput(inner) => {
                let err = AppError::bad_request(inner.message().to_string());
                match inner.action() {
                    Some(action) => err.with_action(action.to_string()),
                    None => err,
                }
            }
            AuthError::AccountNotActive => AppError::forbidden(self.to_string())
                .with_action("Follow the activation link sent to your email address"),
            AuthError::Timeout(_) => AppError::gateway_timeout("Request timed out"),
            AuthError::Unavailable(_) => {
                AppError::service_unavailable("Service temporarily unavailable")
            }
            AuthError::Database(_) | AuthError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::Unavailable(msg) => {
                tracing::error!(message = %msg, "Auth backend unavailable");
            }
            AuthError::Timeout(operation) => {
                tracing::error!(operation, "Auth operation timed out");
            }
            AuthError::CredentialsInvalid => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::AccountNotActive => {
                tracing::warn!("Login attempt on inactive account");
            }
            AuthError::TokenInvalid(reason) => {
                tracing::warn!(reason = %reason, "Token rejected");
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
        if err.is_client_error() {
            AuthError::InvalidInput(err)
        } else {
            AuthError::Internal(err.to_string())
        }
    }
}

impl From<UsernameError> for AuthError {
    fn from(err: UsernameError) -> Self {
        AuthError::InvalidInput(AppError::bad_request(err.to_string()))
    }
}

impl From<TokenRejection> for AuthError {
    fn from(reason: TokenRejection) -> Self {
        AuthError::TokenInvalid(reason)
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => AuthError::DuplicateIdentity,
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => AuthError::Unavailable(err.to_string()),
            _ => AuthError::Database(err),
        }
    }
}

impl From<BlockingError> for AuthError {
    fn from(err: BlockingError) -> Self {
        match err {
            BlockingError::TimedOut(_) => AuthError::Timeout("password hashing"),
            BlockingError::Join(e) => AuthError::Internal(e.to_string()),
        }
    }
}
