use anyhow::Context;
use hyper::body::Incoming;
use hyper::{Request, StatusCode};
use tracing::info;

use shared::types::jwt::JwtClaims;
use shared::types::product::MessageResponse;

use crate::AppState;
use crate::database::products as db_products;
use crate::database::utils::is_valid_id;
use crate::error::{ApiError, ApiResult};
use crate::handlers::http::utils::{deliver_serialized_json, path_id};

const NOT_FOUND: &str = "product not found!";

/// Admin only; the router has already checked the role.
pub async fn handle_delete_product(
    req: Request<Incoming>,
    state: AppState,
    claims: JwtClaims,
) -> ApiResult {
    let id = path_id(req.uri().path()).unwrap_or_default();

    if !is_valid_id(id) {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    let deleted = db_products::delete_product(&state.db, id)
        .await
        .context("Failed to delete product")?;
    if !deleted {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    info!("Product {} deleted by {}", id, claims.sub);

    Ok(deliver_serialized_json(
        &MessageResponse {
            success: true,
            message: "the product is deleted!".to_string(),
        },
        StatusCode::OK,
    )?)
}
