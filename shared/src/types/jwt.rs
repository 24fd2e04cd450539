use std::fmt;

use serde::{Deserialize, Serialize};

/// Privilege tier carried in every token.
///
/// Any role string the server does not know deserializes to `Unknown`
/// rather than failing, so a token minted by a newer deployment is still
/// structurally valid here; it simply never passes an admin check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Unknown => "unknown",
        }
    }

    /// Parse a role column value. Unrecognised values map to `Unknown`.
    pub fn parse(value: &str) -> Self {
        match value {
            "user" => Role::User,
            "admin" => Role::Admin,
            _ => Role::Unknown,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims embedded in every JWT issued at login.
///
/// The token is the whole session: there is no server-side session row and
/// no revocation list, so `exp` is the only way a token stops working.
/// Handlers trust `sub` and `role` as-is and never re-read the user row to
/// authorise a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Standard JWT subject: the user's id (`users.id`).
    pub sub: String,

    /// Email the user logged in with.
    pub email: String,

    /// Privilege tier at the time of login. A promoted or demoted user must
    /// log in again for this to change.
    pub role: Role,

    /// Issued-at (Unix timestamp, seconds).
    pub iat: u64,

    /// Standard JWT expiry (Unix timestamp, seconds).
    pub exp: u64,
}
