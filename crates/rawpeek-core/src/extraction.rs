use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{RawPeekError, Result, StrategyError};
use crate::scratch::ScratchSpace;

/// A RAW file on local disk, checked to exist and be non-empty.
///
/// Owned by whoever downloaded it; strategies only ever read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInput {
    path: PathBuf,
    size: u64,
}

impl RawInput {
    pub async fn open(path: &Path) -> Result<Self> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            RawPeekError::InvalidInput(format!("RAW file '{}' is not readable: {e}", path.display()))
        })?;

        if !metadata.is_file() {
            return Err(RawPeekError::InvalidInput(format!(
                "RAW path '{}' is not a regular file",
                path.display()
            )));
        }
        if metadata.len() == 0 {
            return Err(RawPeekError::InvalidInput(format!(
                "RAW file '{}' is empty",
                path.display()
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Outcome of running one strategy once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionAttempt {
    pub strategy_name: String,
    pub succeeded: bool,
    pub failure_reason: Option<String>,
    #[serde(skip)]
    pub produced_bytes: Option<Vec<u8>>,
}

impl ExtractionAttempt {
    pub fn succeeded(strategy_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            strategy_name: strategy_name.into(),
            succeeded: true,
            failure_reason: None,
            produced_bytes: Some(bytes),
        }
    }

    pub fn failed(strategy_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            strategy_name: strategy_name.into(),
            succeeded: false,
            failure_reason: Some(reason.into()),
            produced_bytes: None,
        }
    }
}

/// What one pipeline run produced. Built once per request and consumed by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineResult {
    Success {
        strategy_name: String,
        image_bytes: Vec<u8>,
    },
    /// Every strategy failed; one attempt per strategy, in priority order.
    Failure { attempts: Vec<ExtractionAttempt> },
}

impl PipelineResult {
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineResult::Success { .. })
    }

    /// Turn an exhausted run into [`RawPeekError::PipelineExhausted`].
    pub fn into_result(self) -> Result<(String, Vec<u8>)> {
        match self {
            PipelineResult::Success {
                strategy_name,
                image_bytes,
            } => Ok((strategy_name, image_bytes)),
            PipelineResult::Failure { attempts } => {
                Err(RawPeekError::PipelineExhausted { attempts })
            }
        }
    }
}

/// One technique for getting a displayable image out of a RAW file.
///
/// Implementations are stateless. `execute` may only write the candidate it was
/// handed, plus any extra scratch paths it registers with `scratch`.
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Path this strategy's output is expected at once `execute` returns.
    fn candidate_path(&self, raw: &RawInput, scratch: &ScratchSpace) -> PathBuf;

    async fn execute(
        &self,
        raw: &RawInput,
        candidate: &Path,
        scratch: &ScratchSpace,
    ) -> std::result::Result<(), StrategyError>;

    /// Read a validated candidate into memory.
    async fn collect(&self, candidate: &Path) -> std::result::Result<Vec<u8>, StrategyError> {
        Ok(tokio::fs::read(candidate).await?)
    }
}

#[async_trait]
pub trait ExtractionPipeline: Send + Sync {
    /// Try each strategy in order until one yields a non-empty candidate.
    ///
    /// Only a missing or empty `raw_path` is an `Err`; strategy failures end up
    /// in [`PipelineResult::Failure`].
    async fn run(&self, raw_path: &Path, scratch: &ScratchSpace) -> Result<PipelineResult>;

    fn strategy_names(&self) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RawInput::open(&dir.path().join("nope.dng")).await.unwrap_err();
        assert!(matches!(err, RawPeekError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn open_rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.dng");
        std::fs::write(&path, b"").unwrap();

        let err = RawInput::open(&path).await.unwrap_err();
        assert!(err.to_string().contains("is empty"), "got: {err}");
    }

    #[tokio::test]
    async fn open_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = RawInput::open(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("not a regular file"), "got: {err}");
    }

    #[tokio::test]
    async fn open_accepts_non_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.nef");
        std::fs::write(&path, b"II*\0").unwrap();

        let raw = RawInput::open(&path).await.unwrap();
        assert_eq!(raw.path(), path.as_path());
        assert_eq!(raw.size(), 4);
    }

    #[test]
    fn failure_into_result_is_pipeline_exhausted() {
        let result = PipelineResult::Failure {
            attempts: vec![ExtractionAttempt::failed("Decode-and-convert", "dcraw timed out after 30s")],
        };
        match result.into_result() {
            Err(RawPeekError::PipelineExhausted { attempts }) => assert_eq!(attempts.len(), 1),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn attempt_wire_format_omits_bytes() {
        let attempt = ExtractionAttempt::succeeded("Embedded-Preview extraction", vec![1, 2, 3]);
        let json = serde_json::to_value(&attempt).unwrap();
        assert_eq!(json["strategyName"], "Embedded-Preview extraction");
        assert_eq!(json["succeeded"], true);
        assert!(json.get("producedBytes").is_none());
    }
}
