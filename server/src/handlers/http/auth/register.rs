use anyhow::Context;
use hyper::body::Incoming;
use hyper::{Request, StatusCode};
use tracing::{info, warn};

use shared::types::jwt::Role;
use shared::types::register::{RegistrationData, RegistrationError};
use shared::types::user::{Image, UserResponse};

use crate::AppState;
use crate::database::users::{self as db_users, NewUser};
use crate::database::utils::{get_timestamp, hash_password, is_unique_violation, new_id};
use crate::error::{ApiError, ApiResult};
use crate::handlers::http::utils::{FormData, deliver_serialized_json, parse_form, store_upload};
use crate::media::{DEFAULT_AVATAR_URL, PROFILE_FOLDER};

/// Main registration handler
pub async fn handle_register(req: Request<Incoming>, state: AppState) -> ApiResult {
    info!("Processing registration request");

    let mut form = parse_form(req, state.config.server.max_body_bytes).await?;
    let data = registration_data(&form);

    if let Err(e) = data.validate_fields() {
        warn!("Registration validation failed: {}", e.to_code());
        return Err(e.into());
    }

    let email = data.email.trim().to_string();

    let existing = db_users::find_user_by_email(&state.db, &email)
        .await
        .context("Failed to look up email")?;
    if existing.is_some() {
        warn!("Registration with taken email: {}", email);
        return Err(RegistrationError::EmailTaken.into());
    }

    if let Err(e) = data.validate_password() {
        warn!("Registration validation failed: {}", e.to_code());
        return Err(e.into());
    }

    let avatar = match form.take_file("avatar") {
        Some(file) => store_upload(&state, file, PROFILE_FOLDER).await?,
        None => Image {
            public_id: None,
            url: DEFAULT_AVATAR_URL.to_string(),
        },
    };

    let role = if state.config.auth.is_admin_email(&email) {
        Role::Admin
    } else {
        Role::User
    };

    let user = NewUser {
        id: new_id(),
        firstname: data.firstname.trim().to_string(),
        lastname: data.lastname.trim().to_string(),
        email,
        password_hash: hash_password(&data.password)?,
        role,
        avatar,
        created_at: get_timestamp(),
    };

    db_users::insert_user(&state.db, &user)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                warn!("Email registered concurrently: {}", user.email);
                ApiError::from(RegistrationError::EmailTaken)
            } else {
                ApiError::Internal(anyhow::Error::new(e).context("Failed to insert user"))
            }
        })?;

    info!("User registered: {} ({}, role {})", user.email, user.id, user.role);

    let profile = db_users::get_user(&state.db, &user.id)
        .await
        .context("Failed to reload user")?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("User {} vanished", user.id)))?
        .into_profile();

    Ok(deliver_serialized_json(
        &UserResponse {
            success: true,
            user: profile,
        },
        StatusCode::CREATED,
    )?)
}

fn registration_data(form: &FormData) -> RegistrationData {
    let text = |name: &str| form.field(name).unwrap_or_default().to_string();
    RegistrationData {
        firstname: text("firstname"),
        lastname: text("lastname"),
        email: text("email"),
        password: form.raw_field("password").unwrap_or_default().to_string(),
    }
}
