use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use tracing::debug;

use shared::types::jwt::{JwtClaims, Role};

/// Why a credential was refused. Every variant ends up as the same generic
/// 401 for the caller; the reason is only logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("no bearer token")]
    Missing,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token expired at {expired_at} (now {now})")]
    Expired { expired_at: u64, now: u64 },

    #[error("bad token signature")]
    BadSignature,
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::BadSignature,
            _ => AuthError::Malformed(err.to_string()),
        }
    }
}

/// Who a credential is being issued for.
#[derive(Debug, Clone)]
pub struct Subject<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub role: Role,
}

/// Issues and verifies HS256 session tokens.
///
/// Immutable after construction; one instance serves every connection.
/// Expiry is checked against the caller-supplied `now`.
pub struct CredentialVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime_secs: u64,
}

impl CredentialVerifier {
    pub fn new(secret: &str, lifetime_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp", "iat"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime_secs,
        }
    }

    pub fn lifetime_secs(&self) -> u64 {
        self.lifetime_secs
    }

    /// Sign a token for `subject`, valid from `now` for the configured
    /// lifetime.
    pub fn issue(
        &self,
        subject: &Subject<'_>,
        now: u64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = JwtClaims {
            sub: subject.id.to_string(),
            email: subject.email.to_string(),
            role: subject.role,
            iat: now,
            exp: now.saturating_add(self.lifetime_secs),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    /// Check structure, signature and expiry, in that order. Never returns
    /// partially trusted claims.
    pub fn verify(&self, token: &str, now: u64) -> Result<JwtClaims, AuthError> {
        let data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation)?;
        let claims = data.claims;

        if claims.exp < now {
            return Err(AuthError::Expired {
                expired_at: claims.exp,
                now,
            });
        }

        debug!("Token verified for subject {}", claims.sub);
        Ok(claims)
    }
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("algorithm", &Algorithm::HS256)
            .field("lifetime_secs", &self.lifetime_secs)
            .finish()
    }
}

/// Current Unix time in seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SECRET: &str = "storefront-test-secret-0123456789abcdef";
    const OTHER_SECRET: &str = "a-completely-different-secret-0123456789";
    const DAY: u64 = 24 * 60 * 60;
    const T0: u64 = 1_700_000_000;

    fn verifier() -> CredentialVerifier {
        CredentialVerifier::new(SECRET, DAY)
    }

    fn user(id: &str) -> Subject<'_> {
        Subject {
            id,
            email: "u1@example.com",
            role: Role::User,
        }
    }

    #[test]
    fn issue_then_verify_round_trips() {
        let v = verifier();
        let token = v.issue(&user("u1"), T0).unwrap();
        let claims = v.verify(&token, T0 + 10).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.email, "u1@example.com");
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.iat, T0);
        assert_eq!(claims.exp, T0 + DAY);
    }

    #[test]
    fn admin_role_survives_round_trip() {
        let v = verifier();
        let subject = Subject {
            id: "boss",
            email: "boss@example.com",
            role: Role::Admin,
        };
        let token = v.issue(&subject, T0).unwrap();
        assert_eq!(v.verify(&token, T0).unwrap().role, Role::Admin);
    }

    #[test]
    fn token_past_expiry_is_rejected() {
        let v = verifier();
        let token = v.issue(&user("u1"), T0).unwrap();
        let err = v.verify(&token, T0 + DAY + 1).unwrap_err();
        assert_eq!(
            err,
            AuthError::Expired {
                expired_at: T0 + DAY,
                now: T0 + DAY + 1
            }
        );
    }

    #[test]
    fn expiry_saturates_instead_of_wrapping() {
        let v = CredentialVerifier::new(SECRET, u64::MAX);
        let token = v.issue(&user("u1"), T0).unwrap();
        let claims = v.verify(&token, T0).unwrap();
        assert_eq!(claims.exp, u64::MAX);
    }

    #[test]
    fn token_is_valid_up_to_its_expiry_second() {
        let v = verifier();
        let token = v.issue(&user("u1"), T0).unwrap();
        assert!(v.verify(&token, T0 + DAY).is_ok());
    }

    #[test]
    fn token_from_another_secret_is_bad_signature() {
        let forged = CredentialVerifier::new(OTHER_SECRET, DAY)
            .issue(&user("u1"), T0)
            .unwrap();
        assert_eq!(verifier().verify(&forged, T0).unwrap_err(), AuthError::BadSignature);
    }

    #[test]
    fn tampered_payload_is_bad_signature() {
        let v = verifier();
        let token = v.issue(&user("u1"), T0).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let other = v.issue(&user("u2"), T0).unwrap();
        let other_payload = other.split('.').nth(1).unwrap().to_string();
        parts[1] = &other_payload;
        let spliced = parts.join(".");
        // Payload from u2 with u1's signature.
        assert_eq!(v.verify(&spliced, T0).unwrap_err(), AuthError::BadSignature);
    }

    #[test]
    fn garbage_is_malformed() {
        let v = verifier();
        assert!(matches!(v.verify("not-a-jwt", T0), Err(AuthError::Malformed(_))));
        assert!(matches!(v.verify("", T0), Err(AuthError::Malformed(_))));
        assert!(matches!(v.verify("a.b.c", T0), Err(AuthError::Malformed(_))));
    }

    #[test]
    fn other_algorithm_is_rejected() {
        let header = Header::new(Algorithm::HS512);
        let claims = JwtClaims {
            sub: "u1".into(),
            email: "u1@example.com".into(),
            role: Role::Admin,
            iat: T0,
            exp: T0 + DAY,
        };
        let token = encode(&header, &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap();
        assert_eq!(verifier().verify(&token, T0).unwrap_err(), AuthError::BadSignature);
    }

    #[test]
    fn missing_required_claim_is_malformed() {
        #[derive(serde::Serialize)]
        struct NoExp<'a> {
            sub: &'a str,
            email: &'a str,
            role: &'a str,
            iat: u64,
        }
        let token = encode(
            &Header::new(Algorithm::HS256),
            &NoExp {
                sub: "u1",
                email: "u1@example.com",
                role: "user",
                iat: T0,
            },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(matches!(verifier().verify(&token, T0), Err(AuthError::Malformed(_))));
    }

    #[test]
    fn unknown_role_decodes_as_unknown() {
        #[derive(serde::Serialize)]
        struct Raw<'a> {
            sub: &'a str,
            email: &'a str,
            role: &'a str,
            iat: u64,
            exp: u64,
        }
        let token = encode(
            &Header::new(Algorithm::HS256),
            &Raw {
                sub: "u1",
                email: "u1@example.com",
                role: "superuser",
                iat: T0,
                exp: T0 + 60,
            },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert_eq!(verifier().verify(&token, T0).unwrap().role, Role::Unknown);
    }

    #[test]
    fn verifier_is_shareable_across_threads() {
        let v = std::sync::Arc::new(verifier());
        let token = v.issue(&user("u1"), T0).unwrap();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let v = v.clone();
                let token = token.clone();
                std::thread::spawn(move || v.verify(&token, T0).map(|c| c.sub))
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap().unwrap(), "u1");
        }
    }

    proptest! {
        #[test]
        fn foreign_secret_never_verifies(
            id in "[a-z0-9-]{1,36}",
            email in "[a-z]{1,10}@[a-z]{1,10}\\.com",
            admin in any::<bool>(),
        ) {
            let role = if admin { Role::Admin } else { Role::User };
            let subject = Subject { id: &id, email: &email, role };
            let forged = CredentialVerifier::new(OTHER_SECRET, DAY).issue(&subject, T0).unwrap();
            prop_assert_eq!(verifier().verify(&forged, T0), Err(AuthError::BadSignature));
        }

        #[test]
        fn expired_is_rejected_for_any_delay(delay in 1u64..10 * DAY) {
            let v = verifier();
            let token = v.issue(&user("u1"), T0).unwrap();
            let rejected = matches!(
                v.verify(&token, T0 + DAY + delay),
                Err(AuthError::Expired { .. })
            );
            prop_assert!(rejected);
        }

        #[test]
        fn round_trip_preserves_identity(
            id in "[a-z0-9-]{1,36}",
            email in "[a-z]{1,10}@[a-z]{1,10}\\.com",
        ) {
            let v = verifier();
            let subject = Subject { id: &id, email: &email, role: Role::User };
            let claims = v.verify(&v.issue(&subject, T0).unwrap(), T0).unwrap();
            prop_assert_eq!(claims.sub, id);
            prop_assert_eq!(claims.email, email);
        }
    }
}
