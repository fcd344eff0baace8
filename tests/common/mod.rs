use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use coverly_api::auth::{generate_token, Claims};
use coverly_api::database::models::user::Role;

/// Must run before the config singleton is first touched.
pub fn init_env() {
    std::env::set_var("JWT_SECRET", "integration-test-secret");
}

/// Drive the router in-process; no server spawn, no database required for
/// the routes these tests exercise.
pub async fn send(request: Request<Body>) -> Result<(StatusCode, Value)> {
    init_env();
    let response = coverly_api::app().oneshot(request).await?;

    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

pub fn token_for(role: Role) -> String {
    init_env();
    let claims = Claims::new(Uuid::new_v4(), "someone@example.com".to_string(), role);
    generate_token(&claims).expect("token generation")
}

pub fn expired_token() -> String {
    init_env();
    let mut claims = Claims::new(Uuid::new_v4(), "late@example.com".to_string(), Role::Client);
    claims.iat = chrono::Utc::now().timestamp() - 48 * 3600;
    claims.exp = chrono::Utc::now().timestamp() - 24 * 3600;
    generate_token(&claims).expect("token generation")
}

pub fn get(path: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .body(Body::empty())
        .expect("request")
}

pub fn get_with_token(path: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .expect("request")
}

pub fn post_json(path: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}
