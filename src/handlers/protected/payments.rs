use axum::extract::{Extension, Path, Query};
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::payment::Payment;
use crate::database::models::policy::Policy;
use crate::database::repository::Repository;
use crate::error::ApiError;
use crate::filter::{params, FilterData, Pagination};
use crate::middleware::auth::Principal;
use crate::middleware::authorize::{check_ownership, BILLING_ROLES};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::reference_data::{self, PAYMENT_METHODS};

/// GET /api/payments - Paginated list. Only billing staff and admins see
/// payments across accounts; everyone else is scoped to their own.
pub async fn list(
    Extension(principal): Extension<Principal>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult {
    let pagination = Pagination::from_query(&query);

    let mut conditions = params::allowed_filters(&query, &["status", "method", "policy_id", "user_id"]);
    if !BILLING_ROLES.contains(&principal.role) {
        conditions.insert("user_id".to_string(), json!(principal.id));
    }
    let where_clause = Value::Object(conditions);

    let pool = DatabaseManager::pool().await?;
    let repo = Repository::<Payment>::new("payments", pool);

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

/// GET /api/payments/:id
pub async fn get(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult {
    let pool = DatabaseManager::pool().await?;
    let repo = Repository::<Payment>::new("payments", pool);

    let payment = repo.select_by_id(id).await?;
    check_ownership(&principal, &payment.user_id)?;

    Ok(ApiResponse::success(json!({ "payment": payment })))
}

#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    pub policy_id: Uuid,
    pub amount: Decimal,
    pub method: String,
}

/// POST /api/payments - Record a premium payment against an owned policy.
/// The gateway capture itself happens upstream; this records the result.
pub async fn create(
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreatePaymentRequest>,
) -> ApiResult {
    let mut field_errors = HashMap::new();
    if req.amount <= Decimal::ZERO {
        field_errors.insert("amount".to_string(), "Amount must be positive".to_string());
    }
    if !reference_data::is_valid(&req.method, PAYMENT_METHODS) {
        field_errors.insert(
            "method".to_string(),
            format!("Must be one of {}", PAYMENT_METHODS.join(", ")),
        );
    }
    if !field_errors.is_empty() {
        return Err(ApiError::validation("Validation failed", field_errors));
    }

    let pool = DatabaseManager::pool().await?;

    let policy = Repository::<Policy>::new("policies", pool.clone())
        .select_by_id(req.policy_id)
        .await?;
    check_ownership(&principal, &policy.user_id)?;

    let payment = sqlx::query_as::<_, Payment>(
        r#"
        INSERT INTO payments
            (id, user_id, policy_id, amount, method, status, paid_at, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, 'COMPLETED', now(), now(), now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(policy.user_id)
    .bind(policy.id)
    .bind(req.amount)
    .bind(&req.method)
    .fetch_one(&pool)
    .await?;

    Ok(ApiResponse::created(json!({ "payment": payment })))
}
