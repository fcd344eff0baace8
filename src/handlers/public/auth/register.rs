use axum::Json;
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

use super::utils::{token_payload, validate_email, validate_password};
use crate::auth::hash_password;
use crate::database::manager::DatabaseManager;
use crate::database::models::user::{Role, User};
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::email_service::EmailService;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

/// POST /auth/register - Create a client account and return a token.
pub async fn register(Json(req): Json<RegisterRequest>) -> ApiResult {
    let mut field_errors = HashMap::new();
    if let Some(msg) = validate_email(&req.email) {
        field_errors.insert("email".to_string(), msg);
    }
    if let Some(msg) = validate_password(&req.password) {
        field_errors.insert("password".to_string(), msg);
    }
    if req.first_name.trim().is_empty() {
        field_errors.insert("first_name".to_string(), "First name is required".to_string());
    }
    if req.last_name.trim().is_empty() {
        field_errors.insert("last_name".to_string(), "Last name is required".to_string());
    }
    if !field_errors.is_empty() {
        return Err(ApiError::validation("Validation failed", field_errors));
    }

    let password_hash = hash_password(&req.password)?;
    let pool = DatabaseManager::pool().await?;

    // Unique-email violations surface as 409 through the error classifier
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, email, password_hash, first_name, last_name, phone, role, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, now(), now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(req.email.trim().to_lowercase())
    .bind(&password_hash)
    .bind(req.first_name.trim())
    .bind(req.last_name.trim())
    .bind(&req.phone)
    .bind(Role::Client)
    .fetch_one(&pool)
    .await?;

    // Welcome mail is best-effort; a flaky relay never fails registration
    match EmailService::from_config() {
        Ok(mailer) => {
            if let Err(e) = mailer.send_welcome(&user.email, &user.first_name).await {
                tracing::warn!("Welcome email to {} failed: {}", user.email, e);
            }
        }
        Err(e) => tracing::warn!("Email service unavailable: {}", e),
    }

    Ok(ApiResponse::created(token_payload(&user)?))
}
