#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use promptkeep_api::auth::jwt::JwtConfig;
use promptkeep_api::config::ServerConfig;
use promptkeep_api::router::build_app_router;
use promptkeep_api::state::AppState;

pub const TEST_PASSWORD: &str = "password1";

/// Build a test `ServerConfig` with safe defaults and fixed secrets.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
        api_key_secret: "test-api-key-hash-secret".to_string(),
    }
}

/// Build the full application router, middleware included, over `pool`.
pub fn build_test_app(pool: PgPool) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(test_config()),
    };
    build_app_router(state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, &[], None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let bearer = format!("Bearer {token}");
    send(app, Method::GET, uri, &[("authorization", &bearer)], None).await
}

pub async fn get_with_api_key(app: Router, uri: &str, api_key: &str) -> Response<Body> {
    send(app, Method::GET, uri, &[("x-api-key", api_key)], None).await
}

/// Send arbitrary headers, for precedence checks between credentials.
pub async fn get_with_headers(app: Router, uri: &str, headers: &[(&str, &str)]) -> Response<Body> {
    send(app, Method::GET, uri, headers, None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, &[], Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    let bearer = format!("Bearer {token}");
    send(app, Method::POST, uri, &[("authorization", &bearer)], Some(body)).await
}

pub async fn post_json_with_api_key(
    app: Router,
    uri: &str,
    body: Value,
    api_key: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, &[("x-api-key", api_key)], Some(body)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    let bearer = format!("Bearer {token}");
    send(app, Method::PUT, uri, &[("authorization", &bearer)], Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let bearer = format!("Bearer {token}");
    send(app, Method::DELETE, uri, &[("authorization", &bearer)], None).await
}

/// Read the whole response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Flow helpers
// ---------------------------------------------------------------------------

/// Register `email` with [`TEST_PASSWORD`] and return the new user id.
pub async fn register(pool: &PgPool, email: &str) -> i64 {
    let body = serde_json::json!({ "email": email, "password": TEST_PASSWORD });
    let response = post_json(build_test_app(pool.clone()), "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

/// Log in and return the session token.
pub async fn login(pool: &PgPool, email: &str) -> String {
    let body = serde_json::json!({ "email": email, "password": TEST_PASSWORD });
    let response = post_json(build_test_app(pool.clone()), "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Register and log in, returning `(user_id, token)`.
pub async fn register_and_login(pool: &PgPool, email: &str) -> (i64, String) {
    let id = register(pool, email).await;
    (id, login(pool, email).await)
}

/// Create a prompt version and return the response JSON.
pub async fn create_prompt(
    pool: &PgPool,
    token: &str,
    name: &str,
    content: &str,
    tag: Option<&str>,
) -> Value {
    let body = serde_json::json!({ "name": name, "content": content, "tag": tag });
    let response =
        post_json_auth(build_test_app(pool.clone()), "/api/v1/prompts", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

/// Issue an API key and return the response JSON (including the raw `api_key`).
pub async fn create_api_key(pool: &PgPool, token: &str, name: &str) -> Value {
    let body = serde_json::json!({ "name": name });
    let response =
        post_json_auth(build_test_app(pool.clone()), "/api/v1/auth/api-keys", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

/// Flip a user to inactive directly in the database.
pub async fn deactivate_user(pool: &PgPool, user_id: i64) {
    sqlx::query("UPDATE users SET is_active = false WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();
}
