use anyhow::Context;
use hyper::body::Incoming;
use hyper::{Request, StatusCode};
use tracing::{debug, warn};

use shared::types::user::UserProfile;

use crate::AppState;
use crate::database::users as db_users;
use crate::database::utils::is_valid_id;
use crate::error::{ApiError, ApiResult};
use crate::handlers::http::utils::{deliver_serialized_json, path_id};

const USER_NOT_FOUND: &str = "The user with the given ID was not found.";

/// Every user, without password hashes.
pub async fn handle_list_users(state: AppState) -> ApiResult {
    let users: Vec<UserProfile> = db_users::list_users(&state.db)
        .await
        .context("Failed to list users")?
        .into_iter()
        .map(|row| row.into_profile())
        .collect();

    debug!("Listing {} users", users.len());
    Ok(deliver_serialized_json(&users, StatusCode::OK)?)
}

pub async fn handle_get_user(req: Request<Incoming>, state: AppState) -> ApiResult {
    let id = path_id(req.uri().path()).unwrap_or_default();

    if !is_valid_id(id) {
        warn!("User lookup with malformed id: {}", id);
        return Err(ApiError::not_found(USER_NOT_FOUND));
    }

    let user = db_users::get_user(&state.db, id)
        .await
        .context("Failed to load user")?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;

    Ok(deliver_serialized_json(&user.into_profile(), StatusCode::OK)?)
}
