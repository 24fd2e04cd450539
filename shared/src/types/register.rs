use serde::Deserialize;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Registration fields. Arrives as multipart (with an optional `avatar`
/// file), url-encoded or JSON; missing fields default to empty so that
/// `validate_fields` can report them uniformly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationData {
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Error codes for registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    MissingFields,
    EmailTaken,
    PasswordTooShort,
}

impl RegistrationError {
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::MissingFields => "MISSING_FIELDS",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::PasswordTooShort => "PASSWORD_TOO_SHORT",
        }
    }

    pub fn to_message(&self) -> String {
        match self {
            Self::MissingFields => "All fields are required".to_string(),
            Self::EmailTaken => "Email is already registered".to_string(),
            Self::PasswordTooShort => format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LEN
            ),
        }
    }
}

impl RegistrationData {
    /// Every field present and non-blank. Runs first; the duplicate-email
    /// lookup comes next and the password length last.
    pub fn validate_fields(&self) -> Result<(), RegistrationError> {
        if self.firstname.trim().is_empty()
            || self.lastname.trim().is_empty()
            || self.email.trim().is_empty()
            || self.password.is_empty()
        {
            return Err(RegistrationError::MissingFields);
        }
        Ok(())
    }

    pub fn validate_password(&self) -> Result<(), RegistrationError> {
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(RegistrationError::PasswordTooShort);
        }
        Ok(())
    }
}
