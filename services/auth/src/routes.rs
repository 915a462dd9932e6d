//! Authentication service routes

use axum::{
    Extension, Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    AppState, error::AuthError, middleware::auth_middleware, models::AuthenticatedAccount,
};

/// Request body for register and login
#[derive(Deserialize)]
pub struct CredentialsRequest {
    #[serde(alias = "email", alias = "username")]
    pub identifier: String,
    #[serde(alias = "password")]
    pub secret: String,
}

/// Response for a created account
#[derive(Serialize)]
pub struct RegisterResponse {
    pub identifier: String,
}

/// Response for a successful login
#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Response describing the authenticated caller
#[derive(Serialize)]
pub struct MeResponse {
    pub identifier: String,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/auth/me", get(me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// Account registration endpoint
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(payload) = payload.map_err(|e| AuthError::Validation(e.body_text()))?;

    let identifier = state
        .authenticator
        .register(&payload.identifier, &payload.secret)
        .await?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { identifier })))
}

/// Login endpoint
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(payload) = payload.map_err(|e| AuthError::Validation(e.body_text()))?;

    let issued = state
        .authenticator
        .authenticate(&payload.identifier, &payload.secret)
        .await?;

    let response = TokenResponse {
        token: issued.token,
        token_type: "Bearer".to_string(),
        expires_in: issued.expires_in,
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Identity of the bearer
pub async fn me(Extension(account): Extension<AuthenticatedAccount>) -> impl IntoResponse {
    Json(MeResponse {
        identifier: account.identifier,
    })
}
