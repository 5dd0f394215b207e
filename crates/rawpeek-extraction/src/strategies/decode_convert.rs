use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use rawpeek_core::config::ToolConfig;
use rawpeek_core::error::StrategyError;
use rawpeek_core::extraction::{ExtractionStrategy, RawInput};
use rawpeek_core::scratch::ScratchSpace;

use crate::process::{run_to_file, run_tool, ToolInvocation};
use crate::validator::validate;

use super::DECODE_AND_CONVERT;

/// Full decode to a PPM with dcraw, then resize and re-encode with ImageMagick.
///
/// Slowest of the strategies but works on anything dcraw can read. The
/// converter only runs once the decoder has left a non-empty intermediate.
pub struct DecodeConvertStrategy {
    dcraw_bin: String,
    convert_bin: String,
    timeout: Duration,
    max_width: u32,
    max_height: u32,
    quality: u8,
}

impl DecodeConvertStrategy {
    pub fn new(config: &ToolConfig) -> Self {
        Self {
            dcraw_bin: config.dcraw_bin.clone(),
            convert_bin: config.convert_bin.clone(),
            timeout: config.timeout(),
            max_width: config.thumbnail_max_width,
            max_height: config.thumbnail_max_height,
            quality: config.thumbnail_quality,
        }
    }

    /// `dcraw -c -w -h <raw>`: half-size decode with camera white balance to stdout.
    fn decode_invocation(&self, raw: &RawInput) -> ToolInvocation {
        ToolInvocation::new("dcraw", self.dcraw_bin.as_str())
            .arg("-c")
            .arg("-w")
            .arg("-h")
            .arg(raw.path())
    }

    fn convert_invocation(&self, intermediate: &Path, candidate: &Path) -> ToolInvocation {
        ToolInvocation::new("convert", self.convert_bin.as_str())
            .arg(intermediate)
            .arg("-resize")
            .arg(format!("{}x{}", self.max_width, self.max_height))
            .arg("-quality")
            .arg(self.quality.to_string())
            .arg(candidate)
    }
}

#[async_trait]
impl ExtractionStrategy for DecodeConvertStrategy {
    fn name(&self) -> &str {
        DECODE_AND_CONVERT
    }

    fn candidate_path(&self, _raw: &RawInput, scratch: &ScratchSpace) -> PathBuf {
        scratch.path_for("converted", "jpg")
    }

    async fn execute(
        &self,
        raw: &RawInput,
        candidate: &Path,
        scratch: &ScratchSpace,
    ) -> Result<(), StrategyError> {
        let intermediate = scratch.path_for("dcraw", "ppm");

        let decoded = run_to_file(&self.decode_invocation(raw), self.timeout, &intermediate).await?;
        if !validate(&intermediate).await {
            return Err(StrategyError::EmptyOutput(
                "dcraw produced an empty intermediate image".to_string(),
            ));
        }
        debug!(bytes = decoded, "dcraw decode stage complete");

        run_tool(&self.convert_invocation(&intermediate, candidate), self.timeout).await?;
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn config(dcraw: &str, convert: &str) -> ToolConfig {
        ToolConfig {
            dcraw_bin: dcraw.to_string(),
            convert_bin: convert.to_string(),
            timeout_secs: 5,
            ..ToolConfig::default()
        }
    }

    async fn setup() -> (tempfile::TempDir, RawInput, ScratchSpace) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw-req.nef");
        std::fs::write(&path, b"MM\0*raw").unwrap();
        let raw = RawInput::open(&path).await.unwrap();
        let scratch = ScratchSpace::new(dir.path(), "req");
        (dir, raw, scratch)
    }

    #[test]
    fn convert_arguments_carry_bounding_box_and_quality() {
        let strategy = DecodeConvertStrategy::new(&ToolConfig {
            thumbnail_max_width: 1024,
            thumbnail_max_height: 768,
            thumbnail_quality: 70,
            ..ToolConfig::default()
        });
        let inv = strategy.convert_invocation(Path::new("/s/in.ppm"), Path::new("/s/out.jpg"));
        let args: Vec<String> = inv
            .args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(inv.tool(), "convert");
        assert_eq!(
            args,
            vec!["/s/in.ppm", "-resize", "1024x768", "-quality", "70", "/s/out.jpg"]
        );
    }

    #[tokio::test]
    async fn decoder_failure_skips_converter() {
        let (_dir, raw, scratch) = setup().await;
        let strategy = DecodeConvertStrategy::new(&config("false", "/not/installed/convert"));

        let candidate = strategy.candidate_path(&raw, &scratch);
        let err = strategy.execute(&raw, &candidate, &scratch).await.unwrap_err();
        match err {
            StrategyError::NonZeroExit { tool, .. } => assert_eq!(tool, "dcraw"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_intermediate_skips_converter() {
        let (_dir, raw, scratch) = setup().await;
        let strategy = DecodeConvertStrategy::new(&config("true", "/not/installed/convert"));

        let candidate = strategy.candidate_path(&raw, &scratch);
        let err = strategy.execute(&raw, &candidate, &scratch).await.unwrap_err();
        assert!(matches!(err, StrategyError::EmptyOutput(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn converter_failure_is_reported() {
        let (_dir, raw, scratch) = setup().await;
        let strategy = DecodeConvertStrategy::new(&config("echo", "/not/installed/convert"));

        let candidate = strategy.candidate_path(&raw, &scratch);
        let err = strategy.execute(&raw, &candidate, &scratch).await.unwrap_err();
        assert_eq!(
            err,
            StrategyError::ToolMissing {
                tool: "convert".into()
            }
        );
    }

    #[tokio::test]
    async fn intermediate_is_tracked_for_cleanup() {
        let (_dir, raw, scratch) = setup().await;
        let strategy = DecodeConvertStrategy::new(&config("echo", "true"));

        let candidate = strategy.candidate_path(&raw, &scratch);
        strategy.execute(&raw, &candidate, &scratch).await.unwrap();

        let tracked = scratch.tracked();
        assert!(tracked.contains(&candidate));
        assert!(tracked.iter().any(|p| p.extension().is_some_and(|e| e == "ppm")));
    }
}
