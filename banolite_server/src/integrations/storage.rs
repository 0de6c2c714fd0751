use std::path::{Path, PathBuf};

use chrono::Utc;
use log::debug;
use thiserror::Error;
use tokio::fs;

use crate::config::StorageConfig;

/// The buckets uploads may land in. Anything else is rejected.
pub const ALLOWED_BUCKETS: [&str; 4] = ["covers", "files", "avatars", "banners"];

/// 10 MB, the same cap the storefront enforces client-side.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Unknown bucket: {0}")]
    UnknownBucket(String),
    #[error("The file is too large ({0} bytes). The limit is {MAX_UPLOAD_BYTES} bytes.")]
    FileTooLarge(usize),
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),
    #[error("Could not store the file. {0}")]
    WriteError(String),
}

/// Local-disk object storage for upload buckets. Files are stored under
/// `{root}/{bucket}/{user_id}/{timestamp}.{ext}` and served from the configured public URL.
#[derive(Debug, Clone)]
pub struct ObjectStorage {
    root: PathBuf,
    public_url: String,
}

impl ObjectStorage {
    pub fn new(config: &StorageConfig) -> Self {
        Self { root: PathBuf::from(&config.root_dir), public_url: config.public_url.clone() }
    }

    /// Stores `data` and returns the public URL it will be served from.
    pub async fn store(&self, bucket: &str, user_id: &str, filename: &str, data: &[u8]) -> Result<String, StorageError> {
        if !ALLOWED_BUCKETS.contains(&bucket) {
            return Err(StorageError::UnknownBucket(bucket.to_string()));
        }
        if data.len() > MAX_UPLOAD_BYTES {
            return Err(StorageError::FileTooLarge(data.len()));
        }
        let ext = extension_of(filename)?;
        let key = format!("{user_id}/{}.{ext}", Utc::now().timestamp_millis());
        let path = self.root.join(bucket).join(&key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| StorageError::WriteError(e.to_string()))?;
        }
        fs::write(&path, data).await.map_err(|e| StorageError::WriteError(e.to_string()))?;
        debug!("🗂️ Stored {} bytes at {bucket}/{key}", data.len());
        Ok(format!("{}/{bucket}/{key}", self.public_url))
    }
}

/// The extension of the uploaded file, sanitised so the key can never traverse out of the bucket.
fn extension_of(filename: &str) -> Result<String, StorageError> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| StorageError::InvalidFilename(filename.to_string()))?;
    if ext.chars().all(|c| c.is_ascii_alphanumeric()) && !ext.is_empty() {
        Ok(ext.to_lowercase())
    } else {
        Err(StorageError::InvalidFilename(filename.to_string()))
    }
}
