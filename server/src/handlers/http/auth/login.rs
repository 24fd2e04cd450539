use std::time::Duration;

use anyhow::Context;
use hyper::body::Incoming;
use hyper::header::SET_COOKIE;
use hyper::{Request, StatusCode};
use tracing::{info, warn};

use shared::types::login::{LoginData, LoginError, LoginResponse};

use crate::AppState;
use crate::auth::{Subject, unix_now};
use crate::database::users as db_users;
use crate::database::utils::verify_password;
use crate::error::ApiResult;
use crate::handlers::http::utils::{
    FormData, create_persistent_cookie, deliver_serialized_json, parse_form,
};

/// Main login handler
pub async fn handle_login(req: Request<Incoming>, state: AppState) -> ApiResult {
    info!("Processing login request");

    let form = parse_form(req, state.config.server.max_body_bytes).await?;
    let data = login_data(&form).inspect_err(|e| {
        warn!("Login parsing failed: {}", e.to_code());
    })?;

    let user = db_users::find_user_by_email(&state.db, &data.email)
        .await
        .context("Failed to look up user")?
        .ok_or_else(|| {
            warn!("Login for unknown email: {}", data.email);
            LoginError::UserNotFound
        })?;

    if !verify_password(&user.password_hash, &data.password)? {
        warn!("Wrong password for user: {}", user.email);
        return Err(LoginError::WrongPassword.into());
    }

    let verifier = state.gate.verifier();
    let token = verifier
        .issue(
            &Subject {
                id: &user.id,
                email: &user.email,
                role: user.role(),
            },
            unix_now(),
        )
        .context("Failed to sign token")?;

    let cookie = create_persistent_cookie(
        "token",
        &token,
        Duration::from_secs(verifier.lifetime_secs()),
        false,
    )?;

    info!("User logged in: {} ({})", user.email, user.id);

    let mut response = deliver_serialized_json(
        &LoginResponse {
            user: user.email,
            token,
        },
        StatusCode::OK,
    )?;
    response.headers_mut().insert(SET_COOKIE, cookie);
    Ok(response)
}

fn login_data(form: &FormData) -> Result<LoginData, LoginError> {
    let email = form
        .field("email")
        .ok_or_else(|| LoginError::MissingField("email".to_string()))?;
    let password = form
        .raw_field("password")
        .filter(|p| !p.is_empty())
        .ok_or_else(|| LoginError::MissingField("password".to_string()))?;

    Ok(LoginData {
        email: email.to_string(),
        password: password.to_string(),
    })
}
