use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::{ImageUpload, MediaStore, StoredImage};

/// One upload seen by a `MemoryStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpload {
    pub folder: String,
    pub name: String,
    pub content_type: String,
    pub size: usize,
}

/// Keeps uploads in memory and hands back `memory://` URLs. For tests and
/// local runs without media credentials.
#[derive(Debug, Default)]
pub struct MemoryStore {
    uploads: Mutex<Vec<RecordedUpload>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().await.clone()
    }
}

#[async_trait]
impl MediaStore for MemoryStore {
    async fn upload(&self, image: ImageUpload, folder: &str) -> anyhow::Result<StoredImage> {
        let public_id = format!("{}/{}", folder, image.name);
        debug!("Storing {} ({} bytes) in memory", public_id, image.bytes.len());

        self.uploads.lock().await.push(RecordedUpload {
            folder: folder.to_string(),
            name: image.name.clone(),
            content_type: image.content_type.clone(),
            size: image.bytes.len(),
        });

        Ok(StoredImage {
            url: format!("memory://{}.{}", public_id, image.extension),
            public_id,
        })
    }
}
