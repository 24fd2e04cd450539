use hyper::Method;
use hyper::header::{AUTHORIZATION, HeaderMap};
use tracing::debug;

use shared::types::jwt::JwtClaims;
use shared::types::server_config::AuthConfig;

use super::exemption::{ExemptionError, ExemptionTable};
use super::verifier::{AuthError, CredentialVerifier};

/// How a request got past the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Matched an exemption rule. No credential was looked at.
    Exempt,
    /// Carried a valid credential.
    Authenticated(JwtClaims),
}

impl GateOutcome {
    pub fn into_claims(self) -> Option<JwtClaims> {
        match self {
            GateOutcome::Exempt => None,
            GateOutcome::Authenticated(claims) => Some(claims),
        }
    }
}

/// First stage of every request: exemption lookup, then credential
/// verification for anything not exempt.
///
/// Built once at startup and shared read-only between connections.
#[derive(Debug)]
pub struct AccessGate {
    exemptions: ExemptionTable,
    verifier: CredentialVerifier,
}

impl AccessGate {
    pub fn new(exemptions: ExemptionTable, verifier: CredentialVerifier) -> Self {
        Self {
            exemptions,
            verifier,
        }
    }

    /// Compile the exemption table and key the verifier from `[auth]`.
    /// The secret must already be resolved (see `AuthConfig::resolved_jwt_secret`).
    pub fn from_config(
        auth: &AuthConfig,
        secret: &str,
        api_prefix: &str,
    ) -> Result<Self, ExemptionError> {
        let exemptions = ExemptionTable::compile(&auth.exemptions, api_prefix)?;
        let verifier = CredentialVerifier::new(secret, auth.token_expiry_secs());
        Ok(Self::new(exemptions, verifier))
    }

    pub fn verifier(&self) -> &CredentialVerifier {
        &self.verifier
    }

    pub fn exemptions(&self) -> &ExemptionTable {
        &self.exemptions
    }

    pub fn check(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
        now: u64,
    ) -> Result<GateOutcome, AuthError> {
        let path = normalize_path(path);

        if let Some(rule) = self.exemptions.matching_rule(method, path) {
            debug!("{} {} exempt via {}", method, path, rule.source());
            return Ok(GateOutcome::Exempt);
        }

        let token = bearer_token(headers).ok_or(AuthError::Missing)?;
        let claims = self.verifier.verify(token, now)?;
        Ok(GateOutcome::Authenticated(claims))
    }
}

/// Token from `Authorization: Bearer <token>`. The scheme is matched
/// case-insensitively; an empty token counts as absent.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Drop any query string and a trailing slash (the root `/` is kept).
pub fn normalize_path(path: &str) -> &str {
    let path = path.split('?').next().unwrap_or(path);
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
