use shared::types::jwt::{JwtClaims, Role};

/// Result of an authorization check on already-verified claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Allowed,
    Denied,
}

/// Admin-only operations require `role == admin`. Every other role,
/// including roles this build does not recognise, is denied.
pub fn authorize_admin(claims: &JwtClaims) -> Authorization {
    match claims.role {
        Role::Admin => Authorization::Allowed,
        Role::User => Authorization::Denied,
        Role::Unknown => Authorization::Denied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role) -> JwtClaims {
        JwtClaims {
            sub: "u1".to_string(),
            email: "u1@example.com".to_string(),
            role,
            iat: 0,
            exp: 60,
        }
    }

    #[test]
    fn admin_is_allowed() {
        assert_eq!(authorize_admin(&claims(Role::Admin)), Authorization::Allowed);
    }

    /// The predicate this service replaces ended every branch in "allow",
    /// so a plain user passed admin checks. Here a user is refused.
    #[test]
    fn plain_user_is_denied_not_waved_through() {
        let outcome = authorize_admin(&claims(Role::User));
        assert_eq!(outcome, Authorization::Denied);
    }

    #[test]
    fn unrecognised_role_is_denied() {
        assert_eq!(authorize_admin(&claims(Role::Unknown)), Authorization::Denied);
    }

    #[test]
    fn decision_ignores_identity_fields() {
        let mut c = claims(Role::Admin);
        c.sub = String::new();
        c.email = String::new();
        assert_eq!(authorize_admin(&c), Authorization::Allowed);
    }
}
