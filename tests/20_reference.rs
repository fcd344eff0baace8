mod common;

use anyhow::Result;
use axum::http::StatusCode;

#[tokio::test]
async fn banner_lists_endpoints() -> Result<()> {
    let (status, body) = common::send(common::get("/")).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], serde_json::json!(true));
    assert_eq!(body["data"]["name"], serde_json::json!("Coverly API"));
    assert!(body["data"]["endpoints"]["policies"].is_string());
    Ok(())
}

#[tokio::test]
async fn policy_types_are_served() -> Result<()> {
    let (status, body) = common::send(common::get("/api/reference/policy-types")).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], serde_json::json!(true));
    let types = body["policy_types"].as_array().cloned().unwrap_or_default();
    assert!(types.contains(&serde_json::json!("AUTO")));
    assert!(types.contains(&serde_json::json!("HOME")));
    Ok(())
}

#[tokio::test]
async fn claim_statuses_are_served() -> Result<()> {
    let (status, body) = common::send(common::get("/api/reference/claim-statuses")).await?;

    assert_eq!(status, StatusCode::OK);
    let statuses = body["claim_statuses"].as_array().cloned().unwrap_or_default();
    assert!(statuses.contains(&serde_json::json!("SUBMITTED")));
    assert!(statuses.contains(&serde_json::json!("PAID")));
    Ok(())
}

#[tokio::test]
async fn payment_methods_are_served() -> Result<()> {
    let (status, body) = common::send(common::get("/api/reference/payment-methods")).await?;

    assert_eq!(status, StatusCode::OK);
    let methods = body["payment_methods"].as_array().cloned().unwrap_or_default();
    assert!(methods.contains(&serde_json::json!("CARD")));
    Ok(())
}
