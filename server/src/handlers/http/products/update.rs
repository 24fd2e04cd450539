use anyhow::Context;
use hyper::body::Incoming;
use hyper::{Request, StatusCode};
use tracing::{info, warn};

use shared::types::product::{ProductError, ProductResponse, ReactivateResponse};

use crate::AppState;
use crate::database::products as db_products;
use crate::database::utils::is_valid_id;
use crate::error::{ApiError, ApiResult};
use crate::handlers::http::utils::{deliver_serialized_json, parse_form, path_id, store_upload};
use crate::media::PRODUCT_FOLDER;

use super::fields::product_data;

/// Partial update: only the fields present in the body change. A new
/// `images` file replaces the stored image.
pub async fn handle_update_product(req: Request<Incoming>, state: AppState) -> ApiResult {
    let id = path_id(req.uri().path()).unwrap_or_default().to_string();

    if !is_valid_id(&id) {
        warn!("Product update with malformed id: {}", id);
        return Err(ProductError::InvalidId.into());
    }

    let mut form = parse_form(req, state.config.server.max_body_bytes).await?;

    let mut product = db_products::get_product(&state.db, &id)
        .await
        .context("Failed to load product")?
        .ok_or(ProductError::InvalidProduct)?;

    let data = product_data(&form)?;

    if let Some(title) = data.project_title {
        if title != product.project_title {
            let clash = db_products::find_product_by_title(&state.db, &title)
                .await
                .context("Failed to look up product title")?
                .is_some_and(|other| other.id != product.id);
            if clash {
                return Err(ProductError::TitleTaken.into());
            }
        }
        product.project_title = title;
    }
    if let Some(description) = data.description {
        product.description = description;
    }
    if let Some(price) = data.price {
        product.price = price;
    }
    if let Some(product_type) = data.product_type {
        product.product_type = product_type;
    }
    if let Some(activation) = data.activation {
        product.activation = activation;
    }

    if let Some(file) = form.take_file("images") {
        let image = store_upload(&state, file, PRODUCT_FOLDER).await?;
        product.image_public_id = image.public_id;
        product.image_url = image.url;
    }

    let updated = db_products::update_product(&state.db, &product)
        .await
        .context("Failed to update product")?;
    if !updated {
        return Err(ApiError::Internal(anyhow::anyhow!(
            "Product {} disappeared during update",
            product.id
        )));
    }

    info!("Product updated: {}", product.id);

    Ok(deliver_serialized_json(
        &ProductResponse {
            success: true,
            product: product.into_product(),
        },
        StatusCode::OK,
    )?)
}

pub async fn handle_reactivate_product(req: Request<Incoming>, state: AppState) -> ApiResult {
    let id = path_id(req.uri().path()).unwrap_or_default();

    // A malformed id cannot name a product.
    if !is_valid_id(id) {
        return Err(ProductError::NotFound.into());
    }

    let product = db_products::set_activation(&state.db, id, true)
        .await
        .context("Failed to reactivate product")?
        .ok_or(ProductError::NotFound)?;

    info!("Product reactivated: {}", product.id);

    Ok(deliver_serialized_json(
        &ReactivateResponse {
            success: true,
            message: "Reactivation Success!".to_string(),
            product: product.into_product(),
        },
        StatusCode::OK,
    )?)
}
