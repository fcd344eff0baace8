use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

use super::auth::Principal;
use crate::database::models::user::Role;
use crate::error::ApiError;

/// Back-office roles.
pub const STAFF_ROLES: &[Role] = &[
    Role::Agent,
    Role::Admin,
    Role::SuperAdmin,
    Role::ClaimsAdjuster,
    Role::BillingSpecialist,
];

pub const ADMIN_ROLES: &[Role] = &[Role::Admin, Role::SuperAdmin];

/// Roles that may adjudicate claims.
pub const CLAIMS_ROLES: &[Role] = &[Role::ClaimsAdjuster, Role::Admin, Role::SuperAdmin];

/// Roles that may see payments across all accounts.
pub const BILLING_ROLES: &[Role] = &[Role::BillingSpecialist, Role::Admin, Role::SuperAdmin];

/// Role allow-list primitive: 401 when no principal was attached, 403 when
/// the principal's role is not in the list.
fn role_allowed(principal: Option<&Principal>, allowed: &[Role]) -> Result<(), ApiError> {
    let principal = principal.ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if allowed.contains(&principal.role) {
        Ok(())
    } else {
        tracing::warn!(
            "Access denied: {} ({}) not in permitted roles {:?}",
            principal.email,
            principal.role.as_str(),
            allowed
        );
        Err(ApiError::forbidden(
            "You do not have permission to perform this action",
        ))
    }
}

/// Handler-level role guard for routes whose methods carry different
/// privilege requirements.
pub fn require_role(principal: &Principal, allowed: &[Role]) -> Result<(), ApiError> {
    role_allowed(Some(principal), allowed)
}

/// Router-level guard for the admin portal subtree.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    role_allowed(request.extensions().get::<Principal>(), ADMIN_ROLES)?;
    Ok(next.run(request).await)
}

/// Resource-ownership policy.
///
/// Admin tiers may act on any resource. Mid-privileged roles pass here and
/// are narrowed per endpoint with the role guards above. Clients only reach
/// resources they own; ownership is strict identifier equality.
pub fn check_ownership(principal: &Principal, owner_id: &Uuid) -> Result<(), ApiError> {
    match principal.role {
        Role::Admin | Role::SuperAdmin => Ok(()),
        Role::Agent | Role::ClaimsAdjuster | Role::BillingSpecialist => Ok(()),
        Role::Client => {
            if principal.id == *owner_id {
                Ok(())
            } else {
                tracing::warn!(
                    "Ownership check failed: {} requested resource owned by {}",
                    principal.id,
                    owner_id
                );
                Err(ApiError::forbidden(
                    "You do not have access to this resource",
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> Principal {
        Principal {
            id: Uuid::new_v4(),
            email: "someone@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn client_owning_resource_is_allowed() {
        let p = principal(Role::Client);
        assert!(check_ownership(&p, &p.id).is_ok());
    }

    #[test]
    fn client_on_foreign_resource_is_forbidden() {
        let p = principal(Role::Client);
        let err = check_ownership(&p, &Uuid::new_v4()).unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn super_admin_is_always_allowed() {
        let p = principal(Role::SuperAdmin);
        assert!(check_ownership(&p, &Uuid::new_v4()).is_ok());
        assert!(check_ownership(&p, &p.id).is_ok());
    }

    #[test]
    fn mid_privileged_roles_pass_the_shared_primitive() {
        for role in [Role::Agent, Role::ClaimsAdjuster, Role::BillingSpecialist] {
            let p = principal(role);
            assert!(check_ownership(&p, &Uuid::new_v4()).is_ok());
        }
    }

    #[test]
    fn missing_principal_is_unauthorized() {
        let err = role_allowed(None, ADMIN_ROLES).unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn wrong_role_is_forbidden() {
        let p = principal(Role::Client);
        let err = require_role(&p, ADMIN_ROLES).unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn member_role_passes() {
        let p = principal(Role::ClaimsAdjuster);
        assert!(require_role(&p, CLAIMS_ROLES).is_ok());
    }
}
