/// Static reference data served to the SPA's form controls. These sets are
/// closed: handlers validate inbound values against them.
pub const POLICY_TYPES: &[&str] = &["AUTO", "HOME", "LIFE", "HEALTH", "BUSINESS"];

pub const POLICY_STATUSES: &[&str] = &["ACTIVE", "PENDING", "EXPIRED", "CANCELLED"];

pub const CLAIM_STATUSES: &[&str] = &[
    "SUBMITTED",
    "UNDER_REVIEW",
    "APPROVED",
    "REJECTED",
    "PAID",
];

pub const PAYMENT_METHODS: &[&str] = &["CARD", "BANK_TRANSFER", "CHECK"];

pub const PAYMENT_STATUSES: &[&str] = &["PENDING", "COMPLETED", "FAILED"];

pub fn is_valid(value: &str, set: &[&str]) -> bool {
    set.contains(&value)
}
