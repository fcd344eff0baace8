use serde_json::json;

use crate::middleware::response::ApiResponse;
use crate::services::reference_data;

/// GET /api/reference/policy-types
pub async fn policy_types() -> ApiResponse {
    ApiResponse::success(json!({ "policy_types": reference_data::POLICY_TYPES }))
}

/// GET /api/reference/claim-statuses
pub async fn claim_statuses() -> ApiResponse {
    ApiResponse::success(json!({ "claim_statuses": reference_data::CLAIM_STATUSES }))
}

/// GET /api/reference/payment-methods
pub async fn payment_methods() -> ApiResponse {
    ApiResponse::success(json!({ "payment_methods": reference_data::PAYMENT_METHODS }))
}
