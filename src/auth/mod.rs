use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::database::models::user::Role;
use crate::error::ApiError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: String, role: Role) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            email,
            role,
            exp,
            iat: now.timestamp(),
        }
    }
}

/// Sign a token for the given claims.
///
/// An empty secret means the verification strategy is unusable, which is a
/// server-side failure rather than a credential problem.
pub fn generate_token(claims: &Claims) -> Result<String, ApiError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(ApiError::internal("Authentication error"));
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(ApiError::from)
}

/// Verify a bearer token and return its claims.
pub fn verify_token(token: &str) -> Result<Claims, ApiError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(ApiError::internal("Authentication error"));
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())?;
    Ok(token_data.claims)
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            ApiError::internal("Failed to process credentials")
        })
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_test_secret() {
        std::env::set_var("JWT_SECRET", "test-secret");
    }

    #[test]
    fn token_round_trip_preserves_claims() {
        with_test_secret();
        let id = Uuid::new_v4();
        let claims = Claims::new(id, "client@example.com".to_string(), Role::Client);
        let token = generate_token(&claims).unwrap();

        let decoded = verify_token(&token).unwrap();
        assert_eq!(decoded.sub, id);
        assert_eq!(decoded.email, "client@example.com");
        assert_eq!(decoded.role, Role::Client);
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        with_test_secret();
        let mut claims = Claims::new(Uuid::new_v4(), "old@example.com".to_string(), Role::Client);
        claims.iat = (Utc::now() - Duration::hours(48)).timestamp();
        claims.exp = (Utc::now() - Duration::hours(24)).timestamp();
        let token = generate_token(&claims).unwrap();

        let err = verify_token(&token).unwrap_err();
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.message(), "Token expired");
    }

    #[test]
    fn garbage_token_is_rejected_as_invalid() {
        with_test_secret();
        let err = verify_token("not.a.token").unwrap_err();
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.message(), "Invalid token");
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("hunter2!").unwrap();
        assert!(verify_password("hunter2!", &hash));
        assert!(!verify_password("hunter3!", &hash));
        assert!(!verify_password("hunter2!", "not-a-phc-string"));
    }
}
