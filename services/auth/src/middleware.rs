//! Middleware for bearer token validation

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tracing::warn;

use crate::{AppState, error::AuthError, models::AuthenticatedAccount};

/// Verify the `Authorization: Bearer <token>` header and attach the account
///
/// Missing or malformed headers and failed verification all answer 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AuthError::TokenInvalid)?;

    let identifier = state
        .authenticator
        .verify_token(bearer.token())
        .inspect_err(|e| warn!("Rejected bearer token: {}", e))?;

    req.extensions_mut()
        .insert(AuthenticatedAccount { identifier });

    Ok(next.run(req).await)
}
