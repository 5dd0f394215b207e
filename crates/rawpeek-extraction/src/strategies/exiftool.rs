use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use rawpeek_core::config::ToolConfig;
use rawpeek_core::error::StrategyError;
use rawpeek_core::extraction::{ExtractionStrategy, RawInput};
use rawpeek_core::scratch::ScratchSpace;

use crate::process::{run_to_file, ToolInvocation};

use super::{EMBEDDED_PREVIEW, EMBEDDED_THUMBNAIL};

/// Which embedded JPEG exiftool is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddedTag {
    /// Largest embedded preview, usually near full resolution.
    PreviewImage,
    /// Small EXIF thumbnail, typically 160x120.
    ThumbnailImage,
}

impl EmbeddedTag {
    fn flag(self) -> &'static str {
        match self {
            EmbeddedTag::PreviewImage => "-PreviewImage",
            EmbeddedTag::ThumbnailImage => "-ThumbnailImage",
        }
    }

    fn label(self) -> &'static str {
        match self {
            EmbeddedTag::PreviewImage => "preview",
            EmbeddedTag::ThumbnailImage => "thumb",
        }
    }
}

/// Dump one binary tag with `exiftool -b -<Tag> <raw>` into the candidate.
///
/// exiftool exits 0 with empty output when the tag is absent; the validator
/// turns that into a failed attempt.
pub struct EmbeddedImageStrategy {
    tag: EmbeddedTag,
    exiftool_bin: String,
    timeout: Duration,
}

impl EmbeddedImageStrategy {
    pub fn new(tag: EmbeddedTag, config: &ToolConfig) -> Self {
        Self {
            tag,
            exiftool_bin: config.exiftool_bin.clone(),
            timeout: config.timeout(),
        }
    }
}

#[async_trait]
impl ExtractionStrategy for EmbeddedImageStrategy {
    fn name(&self) -> &str {
        match self.tag {
            EmbeddedTag::PreviewImage => EMBEDDED_PREVIEW,
            EmbeddedTag::ThumbnailImage => EMBEDDED_THUMBNAIL,
        }
    }

    fn candidate_path(&self, _raw: &RawInput, scratch: &ScratchSpace) -> PathBuf {
        scratch.path_for(self.tag.label(), "jpg")
    }

    async fn execute(
        &self,
        raw: &RawInput,
        candidate: &Path,
        _scratch: &ScratchSpace,
    ) -> Result<(), StrategyError> {
        let invocation = ToolInvocation::new("exiftool", self.exiftool_bin.as_str())
            .arg("-b")
            .arg(self.tag.flag())
            .arg(raw.path());

        let written = run_to_file(&invocation, self.timeout, candidate).await?;
        debug!(tag = self.tag.flag(), bytes = written, "exiftool wrote candidate");
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn config_with(bin: &str) -> ToolConfig {
        ToolConfig {
            exiftool_bin: bin.to_string(),
            timeout_secs: 5,
            ..ToolConfig::default()
        }
    }

    async fn raw_in(dir: &Path) -> RawInput {
        let path = dir.join("raw-req.dng");
        std::fs::write(&path, b"II*\0raw").unwrap();
        RawInput::open(&path).await.unwrap()
    }

    #[tokio::test]
    async fn passes_tag_and_path_as_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let raw = raw_in(dir.path()).await;
        let scratch = ScratchSpace::new(dir.path(), "req");
        // echo stands in for exiftool and reflects its argument vector.
        let strategy = EmbeddedImageStrategy::new(EmbeddedTag::PreviewImage, &config_with("echo"));

        let candidate = strategy.candidate_path(&raw, &scratch);
        strategy.execute(&raw, &candidate, &scratch).await.unwrap();

        let written = std::fs::read_to_string(&candidate).unwrap();
        assert_eq!(written, format!("-b -PreviewImage {}\n", raw.path().display()));
    }

    #[tokio::test]
    async fn candidates_differ_per_tag() {
        let dir = tempfile::tempdir().unwrap();
        let raw = raw_in(dir.path()).await;
        let scratch = ScratchSpace::new(dir.path(), "req");
        let config = ToolConfig::default();

        let preview = EmbeddedImageStrategy::new(EmbeddedTag::PreviewImage, &config);
        let thumb = EmbeddedImageStrategy::new(EmbeddedTag::ThumbnailImage, &config);
        assert_ne!(
            preview.candidate_path(&raw, &scratch),
            thumb.candidate_path(&raw, &scratch)
        );
        assert_eq!(thumb.name(), EMBEDDED_THUMBNAIL);
    }

    #[tokio::test]
    async fn failing_tool_surfaces_as_strategy_error() {
        let dir = tempfile::tempdir().unwrap();
        let raw = raw_in(dir.path()).await;
        let scratch = ScratchSpace::new(dir.path(), "req");
        let strategy = EmbeddedImageStrategy::new(EmbeddedTag::ThumbnailImage, &config_with("false"));

        let candidate = strategy.candidate_path(&raw, &scratch);
        let err = strategy.execute(&raw, &candidate, &scratch).await.unwrap_err();
        assert!(matches!(err, StrategyError::NonZeroExit { .. }), "got: {err:?}");
    }
}
