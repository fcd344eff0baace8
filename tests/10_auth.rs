mod common;

use anyhow::Result;
use axum::http::StatusCode;

// The authentication gate rejects before any handler (or the database) is
// reached, so these run against the bare router.

#[tokio::test]
async fn missing_token_is_401_with_error_envelope() -> Result<()> {
    let (status, body) = common::send(common::get("/api/policies")).await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], serde_json::json!(false));
    assert_eq!(body["error"], serde_json::json!("Missing Authorization header"));
    Ok(())
}

#[tokio::test]
async fn non_bearer_scheme_is_401() -> Result<()> {
    let request = axum::http::Request::builder()
        .uri("/api/policies")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .body(axum::body::Body::empty())?;
    let (status, body) = common::send(request).await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], serde_json::json!(false));
    Ok(())
}

#[tokio::test]
async fn garbage_token_is_401_invalid() -> Result<()> {
    let (status, body) =
        common::send(common::get_with_token("/api/policies", "not.a.token")).await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], serde_json::json!("Invalid token"));
    Ok(())
}

#[tokio::test]
async fn expired_token_is_401_expired() -> Result<()> {
    let token = common::expired_token();
    let (status, body) = common::send(common::get_with_token("/api/policies", &token)).await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], serde_json::json!("Token expired"));
    Ok(())
}

#[tokio::test]
async fn public_routes_skip_the_gate() -> Result<()> {
    let (status, body) = common::send(common::get("/")).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], serde_json::json!(true));
    Ok(())
}

#[tokio::test]
async fn register_validation_failure_is_400_with_details() -> Result<()> {
    let payload = serde_json::json!({
        "email": "not-an-address",
        "password": "short",
        "first_name": "",
        "last_name": "Doe"
    });
    let (status, body) = common::send(common::post_json("/auth/register", None, payload)).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], serde_json::json!(false));
    assert_eq!(body["error"], serde_json::json!("Validation failed"));
    assert!(body["details"]["email"].is_string());
    assert!(body["details"]["password"].is_string());
    assert!(body["details"]["first_name"].is_string());
    assert!(body["details"].get("last_name").is_none());
    Ok(())
}
