use hyper::StatusCode;
use thiserror::Error;
use tracing::error;

use shared::types::{LoginError, ProductError, RegistrationError};

use crate::handlers::http::utils::json_response::{HttpResponse, deliver_error_json};

pub type ApiResult = Result<HttpResponse, ApiError>;

/// Every way a request can fail once it has reached a handler.
///
/// The client only ever sees the status and a `{"message"}` body; for
/// `Internal` the message is fixed and the cause goes to the log.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text sent to the client.
    pub fn public_message(&self) -> &str {
        match self {
            Self::Unauthorized => "Unauthorized access",
            Self::Forbidden => "Forbidden",
            Self::Validation(message) | Self::NotFound(message) => message,
            Self::Internal(_) => "Internal server error",
        }
    }

    pub fn into_response(self) -> HttpResponse {
        if let Self::Internal(ref cause) = self {
            error!("Internal error: {:#}", cause);
        }
        deliver_error_json(self.public_message(), self.status())
    }
}

impl From<LoginError> for ApiError {
    fn from(err: LoginError) -> Self {
        Self::Validation(err.to_message())
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        Self::Validation(err.to_message())
    }
}

impl From<ProductError> for ApiError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound | ProductError::NoProducts => Self::NotFound(err.to_message()),
            _ => Self::Validation(err.to_message()),
        }
    }
}
