use serde::{Deserialize, Serialize};

use crate::types::jwt::Role;

/// An image held by the media host.
///
/// `public_id` is absent for the built-in default avatar, which was never
/// uploaded by us.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
    pub url: String,
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub role: Role,
    pub avatar: Image,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: UserProfile,
}

/// Profile edit fields. Anything left out keeps its stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdateData {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
}
