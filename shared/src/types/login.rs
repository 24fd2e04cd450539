use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Login wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    pub email: String,
    pub password: String,
}

/// Body of a successful login: the email echoed back plus the signed JWT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

impl LogoutResponse {
    pub fn logged_out() -> Self {
        Self {
            success: true,
            message: "Logged out".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Login errors
// ---------------------------------------------------------------------------

/// Every login failure is a client error (HTTP 400); none is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    UserNotFound,
    WrongPassword,
    MissingField(String),
}

impl LoginError {
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::WrongPassword => "WRONG_PASSWORD",
            Self::MissingField(_) => "MISSING_FIELD",
        }
    }

    pub fn to_message(&self) -> String {
        match self {
            Self::UserNotFound => "The user not found".to_string(),
            Self::WrongPassword => "password is wrong!".to_string(),
            Self::MissingField(field) => format!("Missing required field: {}", field),
        }
    }
}
