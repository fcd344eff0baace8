use serde_json::{json, Value};

use crate::auth::{generate_token, Claims};
use crate::config;
use crate::database::models::user::User;
use crate::error::ApiError;

/// Token + user payload returned by login, register and refresh. The user
/// row serializes without its password hash.
pub fn token_payload(user: &User) -> Result<Value, ApiError> {
    let claims = Claims::new(user.id, user.email.clone(), user.role);
    let token = generate_token(&claims)?;
    let expires_in = config::config().security.jwt_expiry_hours * 3600;

    Ok(json!({
        "token": token,
        "user": user,
        "expires_in": expires_in,
    }))
}

/// Minimal shape checks for credential fields; returns field-level errors
/// keyed by input name.
pub fn validate_email(email: &str) -> Option<String> {
    let email = email.trim();
    if email.is_empty() {
        return Some("Email is required".to_string());
    }
    // Full RFC validation is the frontend's problem; reject the obviously broken.
    let valid = email.contains('@') && !email.starts_with('@') && !email.ends_with('@');
    if valid {
        None
    } else {
        Some("Email is not a valid address".to_string())
    }
}

pub fn validate_password(password: &str) -> Option<String> {
    if password.len() < 8 {
        Some("Password must be at least 8 characters".to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_checks() {
        assert!(validate_email("a@b.com").is_none());
        assert!(validate_email("").is_some());
        assert!(validate_email("no-at-sign").is_some());
        assert!(validate_email("@leading").is_some());
    }

    #[test]
    fn password_length_check() {
        assert!(validate_password("short").is_some());
        assert!(validate_password("long enough").is_none());
    }
}
