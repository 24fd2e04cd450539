use anyhow::Context;
use hyper::body::Incoming;
use hyper::{Request, StatusCode};
use tracing::{info, warn};

use shared::types::product::{ProductError, ProductResponse};

use crate::AppState;
use crate::database::products::{self as db_products, ProductRow};
use crate::database::utils::{get_timestamp, is_unique_violation, new_id};
use crate::error::{ApiError, ApiResult};
use crate::handlers::http::utils::{deliver_serialized_json, parse_form, store_upload};
use crate::media::PRODUCT_FOLDER;

use super::fields::product_data;

pub async fn handle_create_product(req: Request<Incoming>, state: AppState) -> ApiResult {
    info!("Processing product creation");

    let mut form = parse_form(req, state.config.server.max_body_bytes).await?;
    let data = product_data(&form)?;

    let title = data.project_title.ok_or(ProductError::TitleRequired)?;

    let existing = db_products::find_product_by_title(&state.db, &title)
        .await
        .context("Failed to look up product title")?;
    if existing.is_some() {
        warn!("Duplicate product title: {}", title);
        return Err(ProductError::TitleTaken.into());
    }

    let file = form.take_file("images").ok_or(ProductError::NoImage)?;
    let image = store_upload(&state, file, PRODUCT_FOLDER).await?;

    let row = ProductRow {
        id: new_id(),
        project_title: title,
        description: data.description.unwrap_or_default(),
        price: data.price.unwrap_or(0.0),
        product_type: data.product_type.unwrap_or_default(),
        image_public_id: image.public_id,
        image_url: image.url,
        activation: data.activation.unwrap_or(true),
        created_at: get_timestamp(),
    };

    db_products::insert_product(&state.db, &row)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                warn!("Product title stored concurrently: {}", row.project_title);
                ApiError::from(ProductError::TitleTaken)
            } else {
                ApiError::Internal(anyhow::Error::new(e).context("Failed to insert product"))
            }
        })?;

    info!("Product created: {} ({})", row.project_title, row.id);

    Ok(deliver_serialized_json(
        &ProductResponse {
            success: true,
            product: row.into_product(),
        },
        StatusCode::CREATED,
    )?)
}
