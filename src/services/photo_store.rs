use std::collections::HashMap;
use std::sync::RwLock;

use bytes::Bytes;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum PhotoStoreError {
    #[error("Photo is {size} bytes, the limit is {max}")]
    TooLarge { size: usize, max: usize },

    #[error("Photo is not valid base64: {0}")]
    InvalidEncoding(String),

    #[error("Photo store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPhoto {
    pub photo_ref: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Blob store for profile photos, keyed by user. Kept apart from the
/// replicated store so photos never ride along in live updates.
pub trait PhotoStore: Send + Sync {
    /// Stores the photo and returns its opaque reference.
    fn put(&self, user_id: Uuid, content_type: &str, data: Bytes) -> Result<String, PhotoStoreError>;

    fn get(&self, user_id: Uuid) -> Result<Option<StoredPhoto>, PhotoStoreError>;
}

/// Sniffs the image type from its magic bytes.
pub fn detect_content_type(data: &[u8]) -> &'static str {
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if data.starts_with(b"\x89PNG\r\n\x1a\n") {
        "image/png"
    } else if data.starts_with(b"GIF8") {
        "image/gif"
    } else if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "application/octet-stream"
    }
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    }
}

pub struct InMemoryPhotoStore {
    max_bytes: usize,
    photos: RwLock<HashMap<Uuid, StoredPhoto>>,
}

impl InMemoryPhotoStore {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            photos: RwLock::new(HashMap::new()),
        }
    }
}

impl PhotoStore for InMemoryPhotoStore {
    fn put(&self, user_id: Uuid, content_type: &str, data: Bytes) -> Result<String, PhotoStoreError> {
        if data.len() > self.max_bytes {
            return Err(PhotoStoreError::TooLarge {
                size: data.len(),
                max: self.max_bytes,
            });
        }

        let photo_ref = format!(
            "users/{}/profile-{}.{}",
            user_id,
            Uuid::new_v4().simple(),
            extension_for(content_type)
        );
        tracing::info!(%user_id, size = data.len(), %photo_ref, "Storing profile photo");

        let mut photos = self
            .photos
            .write()
            .map_err(|_| PhotoStoreError::Unavailable("photo lock poisoned".to_string()))?;
        photos.insert(
            user_id,
            StoredPhoto {
                photo_ref: photo_ref.clone(),
                content_type: content_type.to_string(),
                data,
            },
        );
        Ok(photo_ref)
    }

    fn get(&self, user_id: Uuid) -> Result<Option<StoredPhoto>, PhotoStoreError> {
        let photos = self
            .photos
            .read()
            .map_err(|_| PhotoStoreError::Unavailable("photo lock poisoned".to_string()))?;
        Ok(photos.get(&user_id).cloned())
    }
}
