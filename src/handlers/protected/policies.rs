use axum::extract::{Extension, Path, Query};
use axum::Json;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::policy::Policy;
use crate::database::models::user::Role;
use crate::database::repository::Repository;
use crate::error::ApiError;
use crate::filter::{params, FilterData, Pagination};
use crate::middleware::auth::Principal;
use crate::middleware::authorize::{check_ownership, require_role, ADMIN_ROLES, STAFF_ROLES};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::reference_data::{self, POLICY_STATUSES, POLICY_TYPES};

/// GET /api/policies - Paginated list. Clients only see their own rows.
pub async fn list(
    Extension(principal): Extension<Principal>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult {
    let pagination = Pagination::from_query(&query);

    let mut conditions = params::allowed_filters(&query, &["status", "policy_type", "user_id"]);
    if principal.role == Role::Client {
        conditions.insert("user_id".to_string(), json!(principal.id));
    }
    if let Some(term) = query.get("search") {
        for (k, v) in params::search_condition(term, &["policy_number"]) {
            conditions.insert(k, v);
        }
    }
    let where_clause = Value::Object(conditions);

    let pool = DatabaseManager::pool().await?;
    let repo = Repository::<Policy>::new("policies", pool);

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

/// GET /api/policies/:id
pub async fn get(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult {
    let pool = DatabaseManager::pool().await?;
    let repo = Repository::<Policy>::new("policies", pool);

    let policy = repo.select_by_id(id).await?;
    check_ownership(&principal, &policy.user_id)?;

    Ok(ApiResponse::success(json!({ "policy": policy })))
}

#[derive(Debug, Deserialize)]
pub struct CreatePolicyRequest {
    pub user_id: Uuid,
    pub policy_type: String,
    pub premium: Decimal,
    pub coverage_amount: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// POST /api/policies - Staff create a policy for a client.
pub async fn create(
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreatePolicyRequest>,
) -> ApiResult {
    require_role(&principal, STAFF_ROLES)?;

    let mut field_errors = HashMap::new();
    if !reference_data::is_valid(&req.policy_type, POLICY_TYPES) {
        field_errors.insert(
            "policy_type".to_string(),
            format!("Must be one of {}", POLICY_TYPES.join(", ")),
        );
    }
    if req.premium <= Decimal::ZERO {
        field_errors.insert("premium".to_string(), "Premium must be positive".to_string());
    }
    if req.coverage_amount <= Decimal::ZERO {
        field_errors.insert(
            "coverage_amount".to_string(),
            "Coverage amount must be positive".to_string(),
        );
    }
    if req.end_date <= req.start_date {
        field_errors.insert(
            "end_date".to_string(),
            "End date must be after the start date".to_string(),
        );
    }
    if !field_errors.is_empty() {
        return Err(ApiError::validation("Validation failed", field_errors));
    }

    let pool = DatabaseManager::pool().await?;

    // A missing user_id surfaces as a foreign-key violation (400)
    let policy = sqlx::query_as::<_, Policy>(
        r#"
        INSERT INTO policies
            (id, policy_number, user_id, policy_type, status, premium, coverage_amount,
             start_date, end_date, created_at, updated_at)
        VALUES ($1, $2, $3, $4, 'PENDING', $5, $6, $7, $8, now(), now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(generate_policy_number())
    .bind(req.user_id)
    .bind(&req.policy_type)
    .bind(req.premium)
    .bind(req.coverage_amount)
    .bind(req.start_date)
    .bind(req.end_date)
    .fetch_one(&pool)
    .await?;

    Ok(ApiResponse::created(json!({ "policy": policy })))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePolicyRequest {
    pub status: Option<String>,
    pub premium: Option<Decimal>,
    pub coverage_amount: Option<Decimal>,
    pub end_date: Option<NaiveDate>,
}

/// PUT /api/policies/:id - Staff update status, premium, coverage or term.
pub async fn update(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePolicyRequest>,
) -> ApiResult {
    require_role(&principal, STAFF_ROLES)?;

    let mut field_errors = HashMap::new();
    if let Some(status) = &req.status {
        if !reference_data::is_valid(status, POLICY_STATUSES) {
            field_errors.insert(
                "status".to_string(),
                format!("Must be one of {}", POLICY_STATUSES.join(", ")),
            );
        }
    }
    if matches!(req.premium, Some(p) if p <= Decimal::ZERO) {
        field_errors.insert("premium".to_string(), "Premium must be positive".to_string());
    }
    if matches!(req.coverage_amount, Some(c) if c <= Decimal::ZERO) {
        field_errors.insert(
            "coverage_amount".to_string(),
            "Coverage amount must be positive".to_string(),
        );
    }
    if !field_errors.is_empty() {
        return Err(ApiError::validation("Validation failed", field_errors));
    }

    let pool = DatabaseManager::pool().await?;

    let policy = sqlx::query_as::<_, Policy>(
        r#"
        UPDATE policies SET
            status = COALESCE($2, status),
            premium = COALESCE($3, premium),
            coverage_amount = COALESCE($4, coverage_amount),
            end_date = COALESCE($5, end_date),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.status)
    .bind(req.premium)
    .bind(req.coverage_amount)
    .bind(req.end_date)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Policy not found"))?;

    Ok(ApiResponse::updated(json!({ "policy": policy })))
}

/// DELETE /api/policies/:id - Admin only.
pub async fn delete(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult {
    require_role(&principal, ADMIN_ROLES)?;

    let pool = DatabaseManager::pool().await?;
    let result = sqlx::query("DELETE FROM policies WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Policy not found"));
    }

    Ok(ApiResponse::deleted("Policy deleted"))
}

fn generate_policy_number() -> String {
    // Uniqueness is enforced by the column constraint; the uuid source makes
    // collisions practically impossible
    let suffix = Uuid::new_v4().simple().to_string();
    format!("POL-{}", &suffix[..12].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_numbers_are_prefixed_and_unique() {
        let a = generate_policy_number();
        let b = generate_policy_number();
        assert!(a.starts_with("POL-"));
        assert_eq!(a.len(), "POL-".len() + 12);
        assert_ne!(a, b);
    }
}
