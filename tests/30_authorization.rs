mod common;

use anyhow::Result;
use axum::http::StatusCode;
use coverly_api::database::models::user::Role;

// Role guards fire after authentication and before any handler work, so
// these assert on responses produced without a database.

#[tokio::test]
async fn client_cannot_reach_the_admin_portal() -> Result<()> {
    let token = common::token_for(Role::Client);
    let (status, body) = common::send(common::get_with_token("/api/users", &token)).await?;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], serde_json::json!(false));
    Ok(())
}

#[tokio::test]
async fn agent_cannot_reach_the_admin_portal() -> Result<()> {
    let token = common::token_for(Role::Agent);
    let (status, _) = common::send(common::get_with_token("/api/users", &token)).await?;

    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn client_cannot_create_policies() -> Result<()> {
    let token = common::token_for(Role::Client);
    let payload = serde_json::json!({
        "user_id": uuid::Uuid::new_v4(),
        "policy_type": "AUTO",
        "premium": "120.50",
        "coverage_amount": "50000",
        "start_date": "2026-01-01",
        "end_date": "2027-01-01"
    });
    let (status, body) =
        common::send(common::post_json("/api/policies", Some(&token), payload)).await?;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], serde_json::json!(false));
    Ok(())
}

#[tokio::test]
async fn client_cannot_adjudicate_claims() -> Result<()> {
    let token = common::token_for(Role::Client);
    let payload = serde_json::json!({ "status": "APPROVED" });
    let request = axum::http::Request::builder()
        .method("PATCH")
        .uri(format!("/api/claims/{}/status", uuid::Uuid::new_v4()))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(axum::body::Body::from(payload.to_string()))?;
    let (status, _) = common::send(request).await?;

    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn billing_specialist_cannot_adjudicate_claims() -> Result<()> {
    let token = common::token_for(Role::BillingSpecialist);
    let payload = serde_json::json!({ "status": "APPROVED" });
    let request = axum::http::Request::builder()
        .method("PATCH")
        .uri(format!("/api/claims/{}/status", uuid::Uuid::new_v4()))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(axum::body::Body::from(payload.to_string()))?;
    let (status, _) = common::send(request).await?;

    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn staff_role_validation_errors_precede_persistence() -> Result<()> {
    // An agent may create policies, but a bad policy_type fails validation
    // before any database work.
    let token = common::token_for(Role::Agent);
    let payload = serde_json::json!({
        "user_id": uuid::Uuid::new_v4(),
        "policy_type": "BICYCLE",
        "premium": "120.50",
        "coverage_amount": "50000",
        "start_date": "2026-01-01",
        "end_date": "2027-01-01"
    });
    let (status, body) =
        common::send(common::post_json("/api/policies", Some(&token), payload)).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], serde_json::json!("Validation failed"));
    assert!(body["details"]["policy_type"].is_string());
    Ok(())
}
