//! Custom error types for the authentication service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the credential authenticator
///
/// Unknown identifiers and wrong secrets both map to `InvalidCredentials` so
/// responses never reveal whether an account exists.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Malformed or policy-violating input
    #[error("{0}")]
    Validation(String),

    /// The identifier is already registered
    #[error("Account already exists")]
    DuplicateAccount,

    /// Unknown identifier or wrong secret
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The token signature is valid but its expiry has passed
    #[error("Token expired")]
    TokenExpired,

    /// The token is malformed or its signature does not verify
    #[error("Invalid token")]
    TokenInvalid,

    /// Too many failed logins for this identifier
    #[error("Too many failed login attempts, try again later")]
    TooManyAttempts,

    /// Store, hashing or signing failure; details are logged, not returned
    #[error("Internal server error")]
    Internal,
}

impl AuthError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::DuplicateAccount => StatusCode::CONFLICT,
            AuthError::InvalidCredentials | AuthError::TokenExpired | AuthError::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Type alias for authenticator results
pub type AuthResult<T> = Result<T, AuthError>;
