use serde::{Deserialize, Serialize};

use crate::extraction::ExtractionAttempt;

// --- Health ---

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

// --- Thumbnails ---

/// Body of `POST /generate-thumbnail`. Fields are optional so that a missing
/// one is reported as a 400 by the handler instead of a generic body rejection.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateThumbnailRequest {
    #[serde(default)]
    pub raw_file_url: Option<String>,
    #[serde(default)]
    pub upload_url: Option<String>,
}

impl GenerateThumbnailRequest {
    /// Both URLs, if both are present and non-blank.
    pub fn urls(&self) -> Option<(&str, &str)> {
        let raw = self.raw_file_url.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let upload = self.upload_url.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((raw, upload))
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateThumbnailResponse {
    pub success: bool,
    pub storage_id: String,
    pub extraction_method: String,
    pub thumbnail_size: usize,
}

// --- Errors ---

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts: Option<Vec<ExtractionAttempt>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            attempts: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_attempts(mut self, attempts: Vec<ExtractionAttempt>) -> Self {
        self.attempts = Some(attempts);
        self
    }
}
