use anyhow::Context;
use hyper::body::Incoming;
use hyper::{Request, StatusCode};
use tracing::{info, warn};

use shared::types::register::RegistrationError;
use shared::types::user::{ProfileUpdateData, UserResponse};

use crate::AppState;
use crate::database::users as db_users;
use crate::database::utils::{is_unique_violation, is_valid_id};
use crate::error::{ApiError, ApiResult};
use crate::handlers::http::utils::{
    FormData, deliver_serialized_json, parse_form, path_id, store_upload,
};
use crate::media::PROFILE_FOLDER;

/// Edit name, email and avatar. Fields left out keep their stored value;
/// an `image` file replaces the avatar.
pub async fn handle_update_profile(req: Request<Incoming>, state: AppState) -> ApiResult {
    let id = path_id(req.uri().path()).unwrap_or_default().to_string();

    if !is_valid_id(&id) {
        warn!("Profile update with malformed id: {}", id);
        return Err(ApiError::validation("Invalid User Id"));
    }

    let mut form = parse_form(req, state.config.server.max_body_bytes).await?;

    let mut user = db_users::get_user(&state.db, &id)
        .await
        .context("Failed to load user")?
        .ok_or_else(|| ApiError::validation("Invalid User Profile!"))?;

    let changes = profile_changes(&form);

    if let Some(email) = changes.email {
        if !email.eq_ignore_ascii_case(&user.email) {
            let taken = db_users::find_user_by_email(&state.db, &email)
                .await
                .context("Failed to look up email")?
                .is_some_and(|other| other.id != user.id);
            if taken {
                return Err(RegistrationError::EmailTaken.into());
            }
        }
        user.email = email;
    }
    if let Some(firstname) = changes.firstname {
        user.firstname = firstname;
    }
    if let Some(lastname) = changes.lastname {
        user.lastname = lastname;
    }

    if let Some(file) = form.take_file("image") {
        let avatar = store_upload(&state, file, PROFILE_FOLDER).await?;
        user.avatar_public_id = avatar.public_id;
        user.avatar_url = avatar.url;
    }

    let updated = db_users::update_user_profile(&state.db, &user)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::from(RegistrationError::EmailTaken)
            } else {
                ApiError::Internal(anyhow::Error::new(e).context("Failed to update user"))
            }
        })?;
    if !updated {
        return Err(ApiError::validation("The user cannot be updated"));
    }

    info!("Profile updated for {}", user.id);

    Ok(deliver_serialized_json(
        &UserResponse {
            success: true,
            user: user.into_profile(),
        },
        StatusCode::OK,
    )?)
}

fn profile_changes(form: &FormData) -> ProfileUpdateData {
    let text = |name: &str| form.field(name).map(str::to_string);
    ProfileUpdateData {
        email: text("email"),
        firstname: text("firstname"),
        lastname: text("lastname"),
    }
}
