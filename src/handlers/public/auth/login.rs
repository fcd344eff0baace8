use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::utils::token_payload;
use crate::auth::verify_password;
use crate::database::manager::DatabaseManager;
use crate::database::models::user::User;
use crate::database::repository::Repository;
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::middleware::response::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login - Verify credentials and return a token.
pub async fn login(Json(req): Json<LoginRequest>) -> ApiResult {
    let pool = DatabaseManager::pool().await?;
    let repo = Repository::<User>::new("users", pool);

    let user = repo
        .select_one(FilterData {
            where_clause: Some(json!({ "email": req.email.trim().to_lowercase() })),
            ..Default::default()
        })
        .await?;

    // Same response for unknown email and wrong password
    let user = match user {
        Some(user) if verify_password(&req.password, &user.password_hash) => user,
        _ => return Err(ApiError::unauthorized("Invalid email or password")),
    };

    Ok(ApiResponse::success(token_payload(&user)?))
}
