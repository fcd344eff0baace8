use axum::extract::{Extension, Path, Query};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::auth::hash_password;
use crate::database::manager::DatabaseManager;
use crate::database::models::user::{Role, User};
use crate::database::repository::Repository;
use crate::error::ApiError;
use crate::filter::{params, FilterData, Pagination};
use crate::handlers::public::auth::utils::{validate_email, validate_password};
use crate::middleware::auth::Principal;
use crate::middleware::authorize::require_role;
use crate::middleware::response::{ApiResponse, ApiResult};

// The whole subtree sits behind the admin guard; handlers only narrow
// further where SUPER_ADMIN is required.

/// GET /api/users - Paginated account list for the admin portal.
pub async fn list(Query(query): Query<HashMap<String, String>>) -> ApiResult {
    let pagination = Pagination::from_query(&query);

    let mut conditions = params::allowed_filters(&query, &["role"]);
    if let Some(term) = query.get("search") {
        for (k, v) in params::search_condition(term, &["email", "first_name", "last_name"]) {
            conditions.insert(k, v);
        }
    }
    let where_clause = Value::Object(conditions);

    let pool = DatabaseManager::pool().await?;
    let repo = Repository::<User>::new("users", pool);

    let rows = repo
        .select_any(FilterData {
            where_clause: Some(where_clause.clone()),
            order: Some(json!("created_at desc")),
            limit: Some(pagination.limit),
            offset: Some(pagination.skip),
        })
        .await?;
    let total = repo
        .count(FilterData {
            where_clause: Some(where_clause),
            ..Default::default()
        })
        .await?;

    Ok(ApiResponse::paginated(&rows, total, &pagination))
}

/// GET /api/users/:id
pub async fn get(Path(id): Path<Uuid>) -> ApiResult {
    let pool = DatabaseManager::pool().await?;
    let user = Repository::<User>::new("users", pool)
        .select_by_id(id)
        .await?;

    Ok(ApiResponse::success(json!({ "user": user })))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: String,
}

/// POST /api/users - Create an account. Staff-role accounts can only be
/// created by a SUPER_ADMIN.
pub async fn create(
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult {
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
    let role = match Role::parse(&req.role) {
        Some(role) => role,
        None => {
            field_errors.insert(
                "role".to_string(),
                format!(
                    "Must be one of {}",
                    Role::ALL.map(|r| r.as_str()).join(", ")
                ),
            );
            Role::Client
        }
    };
    if !field_errors.is_empty() {
        return Err(ApiError::validation("Validation failed", field_errors));
    }

    if role != Role::Client {
        require_role(&principal, &[Role::SuperAdmin])?;
    }

    let password_hash = hash_password(&req.password)?;
    let pool = DatabaseManager::pool().await?;

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
    .bind(role)
    .fetch_one(&pool)
    .await?;

    Ok(ApiResponse::created(json!({ "user": user })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
}

/// PUT /api/users/:id - Update account details; role changes require
/// SUPER_ADMIN.
pub async fn update(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult {
    let role = match &req.role {
        Some(raw) => {
            let role = Role::parse(raw).ok_or_else(|| {
                let mut field_errors = HashMap::new();
                field_errors.insert(
                    "role".to_string(),
                    format!(
                        "Must be one of {}",
                        Role::ALL.map(|r| r.as_str()).join(", ")
                    ),
                );
                ApiError::validation("Validation failed", field_errors)
            })?;
            require_role(&principal, &[Role::SuperAdmin])?;
            Some(role)
        }
        None => None,
    };

    let pool = DatabaseManager::pool().await?;

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            first_name = COALESCE($2, first_name),
            last_name = COALESCE($3, last_name),
            phone = COALESCE($4, phone),
            role = COALESCE($5, role),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(&req.phone)
    .bind(role)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::updated(json!({ "user": user })))
}

/// DELETE /api/users/:id - SUPER_ADMIN only; self-deletion is rejected.
pub async fn delete(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult {
    require_role(&principal, &[Role::SuperAdmin])?;

    if principal.id == id {
        return Err(ApiError::bad_request("You cannot delete your own account"));
    }

    let pool = DatabaseManager::pool().await?;
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("User not found"));
    }

    Ok(ApiResponse::deleted("User deleted"))
}
