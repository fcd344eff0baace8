use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Claim {
    pub id: Uuid,
    pub claim_number: String,
    pub policy_id: Uuid,
    /// Owning client account (denormalized from the policy at filing time).
    pub user_id: Uuid,
    pub status: String,
    pub description: String,
    pub amount_claimed: Decimal,
    pub amount_approved: Option<Decimal>,
    pub incident_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
