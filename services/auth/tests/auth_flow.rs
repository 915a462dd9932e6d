//! End-to-end tests of the HTTP surface over an in-memory account store

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use authenticator::{
    AppState,
    config::AppConfig,
    jwt::{JwtConfig, unix_now},
    password::HashConfig,
    rate_limiter::RateLimiterConfig,
    repositories::InMemoryAccountStore,
    routes::create_router,
    validation::SecretPolicy,
};

const JWT_SECRET: &str = "an-hs256-test-secret-that-is-long-enough";

fn test_config() -> AppConfig {
    AppConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        jwt: JwtConfig::with_secret(JWT_SECRET, 3600),
        hash: HashConfig {
            memory_cost: 1024,
            iterations: 1,
            parallelism: 1,
        },
        secret_policy: SecretPolicy::default(),
        rate_limiter: RateLimiterConfig::default(),
        database: None,
    }
}

fn app() -> (Router, AppState) {
    let state = AppState::new(&test_config(), Arc::new(InMemoryAccountStore::new())).unwrap();
    (create_router(state.clone()), state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_with_token(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn register(app: &Router, identifier: &str, secret: &str) -> (StatusCode, Value) {
    send(
        app,
        post_json(
            "/api/auth/register",
            json!({"identifier": identifier, "secret": secret}),
        ),
    )
    .await
}

async fn login(app: &Router, identifier: &str, secret: &str) -> (StatusCode, Value) {
    send(
        app,
        post_json(
            "/api/auth/login",
            json!({"identifier": identifier, "secret": secret}),
        ),
    )
    .await
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = app();
    let (status, body) = send(&app, get_with_token("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_login_and_access_protected_route() {
    let (app, _) = app();

    let (status, body) = register(&app, "alice@example.com", "S3cret!!").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"identifier": "alice@example.com"}));

    let (status, body) = login(&app, "alice@example.com", "S3cret!!").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, get_with_token("/api/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["identifier"], "alice@example.com");

    let (status, _) = login(&app, "alice@example.com", "wrong").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let (app, _) = app();

    let (status, _) = register(&app, "alice@example.com", "S3cret!!").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = register(&app, "alice@example.com", "An0ther!!").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_login_failures_do_not_reveal_accounts() {
    let (app, _) = app();
    register(&app, "alice@example.com", "S3cret!!").await;

    let wrong_secret = login(&app, "alice@example.com", "wrong-secret").await;
    let unknown = login(&app, "nobody@example.com", "wrong-secret").await;

    assert_eq!(wrong_secret.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_secret, unknown);
}

#[tokio::test]
async fn test_register_validation_failures() {
    let (app, _) = app();

    let (status, _) = register(&app, "alice@example.com", "short").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = register(&app, "", "S3cret!!").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        post_json("/api/auth/register", json!({"identifier": "alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_field_aliases_are_accepted() {
    let (app, _) = app();

    let (status, _) = send(
        &app,
        post_json(
            "/api/auth/register",
            json!({"email": "alice@example.com", "password": "S3cret!!"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        post_json(
            "/api/auth/login",
            json!({"email": "alice@example.com", "password": "S3cret!!"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_protected_route_rejects_missing_and_bad_tokens() {
    let (app, _) = app();

    let (status, _) = send(&app, get_with_token("/api/auth/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get_with_token("/api/auth/me", Some("garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, "Basic YWxpY2U6c2VjcmV0")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let (app, state) = app();

    let issued_at = unix_now().unwrap() - 7200;
    let token = state
        .authenticator
        .jwt_service()
        .issue_at("alice@example.com", issued_at)
        .unwrap();

    let (status, body) = send(&app, get_with_token("/api/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token expired");
}

#[tokio::test]
async fn test_repeated_failures_are_throttled() {
    let (app, _) = app();
    register(&app, "alice@example.com", "S3cret!!").await;

    for _ in 0..RateLimiterConfig::default().max_failures {
        let (status, _) = login(&app, "alice@example.com", "wrong-secret").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (status, _) = login(&app, "alice@example.com", "S3cret!!").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_cors_preflight_is_allowed() {
    let (app, _) = app();

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/auth/login")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    assert!(
        response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
    );
}
