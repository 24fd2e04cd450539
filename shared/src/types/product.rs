use serde::{Deserialize, Serialize};

use crate::types::user::Image;

/// A catalogue entry as stored and as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(rename = "projectTitle")]
    pub project_title: String,
    pub description: String,
    pub price: f64,
    #[serde(rename = "type")]
    pub product_type: String,
    pub images: Image,
    pub activation: bool,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

/// Product fields supplied on create or update. Every field is optional on
/// the wire; on update a missing field keeps its stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductData {
    pub project_title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub product_type: Option<String>,
    pub activation: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductResponse {
    pub success: bool,
    pub product: Product,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactivateResponse {
    pub success: bool,
    pub message: String,
    pub product: Product,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Error codes for product operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductError {
    TitleTaken,
    TitleRequired,
    NoImage,
    InvalidId,
    InvalidProduct,
    InvalidPrice,
    InvalidActivation,
    NotFound,
    NoProducts,
}

impl ProductError {
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::TitleTaken => "TITLE_TAKEN",
            Self::TitleRequired => "TITLE_REQUIRED",
            Self::NoImage => "NO_IMAGE",
            Self::InvalidId => "INVALID_ID",
            Self::InvalidProduct => "INVALID_PRODUCT",
            Self::InvalidPrice => "INVALID_PRICE",
            Self::InvalidActivation => "INVALID_ACTIVATION",
            Self::NotFound => "NOT_FOUND",
            Self::NoProducts => "NO_PRODUCTS",
        }
    }

    pub fn to_message(&self) -> String {
        match self {
            Self::TitleTaken => "Project Title already exists!".to_string(),
            Self::TitleRequired => "Project Title is required".to_string(),
            Self::NoImage => "No image in the request".to_string(),
            Self::InvalidId => "Invalid Product Id".to_string(),
            Self::InvalidProduct => "Invalid Product!".to_string(),
            Self::InvalidPrice => "Price must be a number".to_string(),
            Self::InvalidActivation => "Activation must be true or false".to_string(),
            Self::NotFound => "Product not found".to_string(),
            Self::NoProducts => "No products found".to_string(),
        }
    }
}
