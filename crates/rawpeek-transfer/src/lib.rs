mod download;
mod upload;

pub use download::{raw_extension_for, HttpDownloader};
pub use upload::{parse_storage_id, HttpUploader};

use rawpeek_core::error::{RawPeekError, Result};
use url::Url;

/// Parse `input` and require an http or https scheme.
pub fn parse_http_url(input: &str) -> Result<Url> {
    let url = Url::parse(input)
        .map_err(|e| RawPeekError::InvalidInput(format!("'{input}' is not a valid URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(RawPeekError::InvalidInput(format!(
            "unsupported URL scheme '{other}' in '{input}'"
        ))),
    }
}
