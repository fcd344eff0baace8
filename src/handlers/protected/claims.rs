use axum::extract::{Extension, Path, Query};
use axum::Json;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::claim::Claim;
use crate::database::models::policy::Policy;
use crate::database::models::user::{Role, User};
use crate::database::repository::Repository;
use crate::error::ApiError;
use crate::filter::{params, FilterData, Pagination};
use crate::middleware::auth::Principal;
use crate::middleware::authorize::{check_ownership, require_role, CLAIMS_ROLES};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::email_service::EmailService;
use crate::services::reference_data::{self, CLAIM_STATUSES};

/// GET /api/claims - Paginated list. Clients only see their own rows.
pub async fn list(
    Extension(principal): Extension<Principal>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult {
    let pagination = Pagination::from_query(&query);

    let mut conditions = params::allowed_filters(&query, &["status", "policy_id"]);
    if principal.role == Role::Client {
        conditions.insert("user_id".to_string(), json!(principal.id));
    }
    if let Some(term) = query.get("search") {
        for (k, v) in params::search_condition(term, &["claim_number", "description"]) {
            conditions.insert(k, v);
        }
    }
    let where_clause = Value::Object(conditions);

    let pool = DatabaseManager::pool().await?;
    let repo = Repository::<Claim>::new("claims", pool);

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

/// GET /api/claims/:id
pub async fn get(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult {
    let pool = DatabaseManager::pool().await?;
    let repo = Repository::<Claim>::new("claims", pool);

    let claim = repo.select_by_id(id).await?;
    check_ownership(&principal, &claim.user_id)?;

    Ok(ApiResponse::success(json!({ "claim": claim })))
}

#[derive(Debug, Deserialize)]
pub struct FileClaimRequest {
    pub policy_id: Uuid,
    pub description: String,
    pub amount_claimed: Decimal,
    pub incident_date: NaiveDate,
}

/// POST /api/claims - File a claim against an owned policy.
pub async fn create(
    Extension(principal): Extension<Principal>,
    Json(req): Json<FileClaimRequest>,
) -> ApiResult {
    let mut field_errors = HashMap::new();
    if req.description.trim().is_empty() {
        field_errors.insert(
            "description".to_string(),
            "Description is required".to_string(),
        );
    }
    if req.amount_claimed <= Decimal::ZERO {
        field_errors.insert(
            "amount_claimed".to_string(),
            "Claimed amount must be positive".to_string(),
        );
    }
    if !field_errors.is_empty() {
        return Err(ApiError::validation("Validation failed", field_errors));
    }

    let pool = DatabaseManager::pool().await?;

    // Clients can only file against policies they own
    let policy = Repository::<Policy>::new("policies", pool.clone())
        .select_by_id(req.policy_id)
        .await?;
    check_ownership(&principal, &policy.user_id)?;

    let claim = sqlx::query_as::<_, Claim>(
        r#"
        INSERT INTO claims
            (id, claim_number, policy_id, user_id, status, description, amount_claimed,
             amount_approved, incident_date, created_at, updated_at)
        VALUES ($1, $2, $3, $4, 'SUBMITTED', $5, $6, NULL, $7, now(), now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(generate_claim_number())
    .bind(policy.id)
    .bind(policy.user_id)
    .bind(req.description.trim())
    .bind(req.amount_claimed)
    .bind(req.incident_date)
    .fetch_one(&pool)
    .await?;

    Ok(ApiResponse::created(json!({ "claim": claim })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateClaimStatusRequest {
    pub status: String,
    pub amount_approved: Option<Decimal>,
}

/// PATCH /api/claims/:id/status - Claims staff adjudicate a claim.
pub async fn update_status(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateClaimStatusRequest>,
) -> ApiResult {
    require_role(&principal, CLAIMS_ROLES)?;

    let mut field_errors = HashMap::new();
    if !reference_data::is_valid(&req.status, CLAIM_STATUSES) {
        field_errors.insert(
            "status".to_string(),
            format!("Must be one of {}", CLAIM_STATUSES.join(", ")),
        );
    }
    if matches!(req.amount_approved, Some(a) if a < Decimal::ZERO) {
        field_errors.insert(
            "amount_approved".to_string(),
            "Approved amount cannot be negative".to_string(),
        );
    }
    if !field_errors.is_empty() {
        return Err(ApiError::validation("Validation failed", field_errors));
    }

    let pool = DatabaseManager::pool().await?;

    let claim = sqlx::query_as::<_, Claim>(
        r#"
        UPDATE claims SET
            status = $2,
            amount_approved = COALESCE($3, amount_approved),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.status)
    .bind(req.amount_approved)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Claim not found"))?;

    // Status notification is best-effort
    let claimant = Repository::<User>::new("users", pool)
        .select_by_id(claim.user_id)
        .await;
    match (claimant, EmailService::from_config()) {
        (Ok(user), Ok(mailer)) => {
            if let Err(e) = mailer
                .send_claim_status(&user.email, &claim.claim_number, &claim.status)
                .await
            {
                tracing::warn!("Claim status email for {} failed: {}", claim.claim_number, e);
            }
        }
        (Err(e), _) => tracing::warn!("Claimant lookup for notification failed: {}", e),
        (_, Err(e)) => tracing::warn!("Email service unavailable: {}", e),
    }

    Ok(ApiResponse::updated(json!({ "claim": claim })))
}

fn generate_claim_number() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("CLM-{}", &suffix[..12].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_numbers_are_prefixed_and_unique() {
        let a = generate_claim_number();
        assert!(a.starts_with("CLM-"));
        assert_ne!(a, generate_claim_number());
    }
}
