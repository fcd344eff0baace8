use axum::Extension;
use serde_json::json;

use crate::database::manager::DatabaseManager;
use crate::database::models::user::User;
use crate::database::repository::Repository;
use crate::handlers::public::auth::utils::token_payload;
use crate::middleware::auth::Principal;
use crate::middleware::response::{ApiResponse, ApiResult};

/// GET /api/auth/whoami - Current principal with a fresh user row.
pub async fn whoami(Extension(principal): Extension<Principal>) -> ApiResult {
    let pool = DatabaseManager::pool().await?;
    let repo = Repository::<User>::new("users", pool);
    let user = repo.select_by_id(principal.id).await?;

    Ok(ApiResponse::success(json!({ "user": user })))
}

/// POST /api/auth/refresh - Re-issue a token for the current principal.
///
/// The user row is re-read so a deleted account cannot keep minting tokens.
pub async fn refresh(Extension(principal): Extension<Principal>) -> ApiResult {
    let pool = DatabaseManager::pool().await?;
    let repo = Repository::<User>::new("users", pool);
    let user = repo.select_by_id(principal.id).await?;

    Ok(ApiResponse::success(token_payload(&user)?))
}
