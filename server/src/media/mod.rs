//! Image storage. Handlers only see the `MediaStore` trait; production
//! talks to Cloudinary, tests use the in-memory store.

pub mod cloudinary;
pub mod memory;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use shared::types::user::Image;

pub use cloudinary::CloudinaryStore;
pub use memory::MemoryStore;

pub const PRODUCT_FOLDER: &str = "products";
pub const PROFILE_FOLDER: &str = "UserProfile";

/// Avatar given to users who register without uploading one.
pub const DEFAULT_AVATAR_URL: &str = "https://res.cloudinary.com/dn638duad/image/upload/v1708276779/Student%20Profile/fghiuvjlxd5vbcnjxy2t.jpg";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("Invalid image type")]
    InvalidImageType(String),
}

/// An image accepted for upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Name the host stores it under, without extension.
    pub name: String,
    pub content_type: String,
    pub extension: &'static str,
    pub bytes: Bytes,
}

impl ImageUpload {
    /// Check the declared type and derive the stored name from the client's
    /// filename: spaces become `-`, the extension is dropped and
    /// `-<unix millis>` is appended.
    pub fn new(
        filename: &str,
        content_type: &str,
        bytes: Bytes,
        now_millis: u128,
    ) -> Result<Self, MediaError> {
        let extension = image_extension(content_type)
            .ok_or_else(|| MediaError::InvalidImageType(content_type.to_string()))?;

        Ok(Self {
            name: upload_name(filename, now_millis),
            content_type: content_type.to_string(),
            extension,
            bytes,
        })
    }
}

/// Where the host put an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub public_id: String,
    pub url: String,
}

impl From<StoredImage> for Image {
    fn from(stored: StoredImage) -> Self {
        Image {
            public_id: Some(stored.public_id),
            url: stored.url,
        }
    }
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, image: ImageUpload, folder: &str) -> anyhow::Result<StoredImage>;
}

pub fn image_extension(content_type: &str) -> Option<&'static str> {
    match content_type.trim().to_ascii_lowercase().as_str() {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpeg"),
        "image/jpg" => Some("jpg"),
        _ => None,
    }
}

pub fn upload_name(filename: &str, now_millis: u128) -> String {
    let stem = match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => filename,
    };
    let stem = stem.trim().replace(' ', "-");
    let stem = if stem.is_empty() { "image".to_string() } else { stem };
    format!("{}-{}", stem, now_millis)
}
