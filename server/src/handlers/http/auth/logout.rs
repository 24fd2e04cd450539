use hyper::StatusCode;
use hyper::header::SET_COOKIE;
use tracing::info;

use shared::types::login::LogoutResponse;

use crate::error::ApiResult;
use crate::handlers::http::utils::{delete_cookie, deliver_serialized_json};

/// Handle logout. Tokens cannot be revoked server-side; this only clears the
/// browser's `token` cookie.
pub async fn handle_logout() -> ApiResult {
    info!("User logged out");

    let mut response = deliver_serialized_json(&LogoutResponse::logged_out(), StatusCode::OK)?;
    response.headers_mut().insert(SET_COOKIE, delete_cookie("token")?);
    Ok(response)
}
