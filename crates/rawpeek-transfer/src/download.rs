use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use rawpeek_core::error::{RawPeekError, Result};
use rawpeek_core::transfer::Downloader;

use crate::parse_http_url;

const FALLBACK_RAW_EXTENSION: &str = "dng";

/// Extension to give the local copy of a RAW file at `url`.
///
/// Decoders sniff content, but some still look at the suffix, so a short
/// alphanumeric extension from the URL path is kept. Anything else becomes
/// `dng`.
pub fn raw_extension_for(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| {
            let last = u.path_segments()?.next_back()?.to_string();
            let (_, ext) = last.rsplit_once('.')?;
            let valid = (1..=5).contains(&ext.len()) && ext.chars().all(|c| c.is_ascii_alphanumeric());
            valid.then(|| ext.to_ascii_lowercase())
        })
        .unwrap_or_else(|| FALLBACK_RAW_EXTENSION.to_string())
}

/// Streams a RAW file over HTTP(S) to local disk.
pub struct HttpDownloader {
    client: reqwest::Client,
}

impl HttpDownloader {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let parsed = parse_http_url(url)?;
        info!(host = parsed.host_str().unwrap_or(""), "Downloading RAW file");

        let mut response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| RawPeekError::Download(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RawPeekError::Download(format!("source returned status {status}")));
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written: u64 = 0;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| RawPeekError::Download(format!("reading body failed: {e}")))?
        {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        debug!(path = %dest.display(), "RAW file written");
        info!(bytes = written, "RAW file downloaded");
        Ok(written)
    }
}
