use shared::types::product::{ProductData, ProductError};

use crate::handlers::http::utils::FormData;

/// Pull product fields out of a form. Absent fields stay `None`; present
/// but unparseable numbers and flags are rejected.
pub fn product_data(form: &FormData) -> Result<ProductData, ProductError> {
    let price = form
        .field("price")
        .map(|p| p.parse::<f64>().ok().filter(|v| v.is_finite()))
        .map(|p| p.ok_or(ProductError::InvalidPrice))
        .transpose()?;

    let activation = form
        .field("activation")
        .map(parse_flag)
        .map(|a| a.ok_or(ProductError::InvalidActivation))
        .transpose()?;

    Ok(ProductData {
        project_title: form.field("projectTitle").map(str::to_string),
        description: form.field("description").map(str::to_string),
        price,
        product_type: form.field("type").map(str::to_string),
        activation,
    })
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "on" => Some(true),
        "false" | "0" | "off" => Some(false),
        _ => None,
    }
}
