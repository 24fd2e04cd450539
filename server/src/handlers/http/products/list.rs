use anyhow::Context;
use hyper::StatusCode;
use tracing::debug;

use shared::types::product::{Product, ProductError};

use crate::AppState;
use crate::database::products as db_products;
use crate::error::ApiResult;
use crate::handlers::http::utils::deliver_serialized_json;

/// The whole catalogue. An empty catalogue is reported as 404.
pub async fn handle_list_products(state: AppState) -> ApiResult {
    let products: Vec<Product> = db_products::list_products(&state.db)
        .await
        .context("Failed to list products")?
        .into_iter()
        .map(|row| row.into_product())
        .collect();

    if products.is_empty() {
        return Err(ProductError::NoProducts.into());
    }

    debug!("Listing {} products", products.len());
    Ok(deliver_serialized_json(&products, StatusCode::OK)?)
}
