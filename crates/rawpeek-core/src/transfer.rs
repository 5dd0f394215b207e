use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// What the destination service handed back after accepting an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub storage_id: String,
}

/// Fetches a remote RAW file onto local disk.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Write the body of `url` to `dest` and return the byte count.
    ///
    /// `dest` must be fully written and closed when this returns `Ok`.
    async fn download(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// Delivers the finished preview to its destination.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, url: &str, image: Vec<u8>) -> Result<UploadReceipt>;
}
