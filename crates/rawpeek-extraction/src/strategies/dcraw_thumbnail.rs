use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use rawpeek_core::config::ToolConfig;
use rawpeek_core::error::StrategyError;
use rawpeek_core::extraction::{ExtractionStrategy, RawInput};
use rawpeek_core::scratch::ScratchSpace;

use crate::process::{run_tool, ToolInvocation};

use super::DECODER_THUMBNAIL;

/// Where `dcraw -e` drops a JPEG thumbnail.
///
/// dcraw cuts the input name at the last `.` anywhere in the whole path, not
/// just in the file name, then appends `.thumb.jpg`. An extension-less file
/// under a dotted directory therefore lands outside that directory.
pub fn decoder_thumbnail_path(raw: &Path) -> PathBuf {
    decoder_output_path(raw, "jpg")
}

fn decoder_output_path(raw: &Path, ext: &str) -> PathBuf {
    let full = raw.to_string_lossy();
    let base = full.rfind('.').map_or(&*full, |dot| &full[..dot]);
    PathBuf::from(format!("{base}.thumb.{ext}"))
}

/// `dcraw -e <raw>`, which writes the embedded thumbnail next to the input
/// under a name of its own choosing.
///
/// Non-JPEG thumbnails come out as `.thumb.ppm` or `.thumb.pgm`; those are
/// tracked for cleanup but never accepted as a candidate.
pub struct DcrawThumbnailStrategy {
    dcraw_bin: String,
    timeout: Duration,
}

impl DcrawThumbnailStrategy {
    pub fn new(config: &ToolConfig) -> Self {
        Self {
            dcraw_bin: config.dcraw_bin.clone(),
            timeout: config.timeout(),
        }
    }
}

#[async_trait]
impl ExtractionStrategy for DcrawThumbnailStrategy {
    fn name(&self) -> &str {
        DECODER_THUMBNAIL
    }

    fn candidate_path(&self, raw: &RawInput, scratch: &ScratchSpace) -> PathBuf {
        let jpeg = decoder_thumbnail_path(raw.path());
        scratch.track(&jpeg);
        scratch.track(&decoder_output_path(raw.path(), "ppm"));
        scratch.track(&decoder_output_path(raw.path(), "pgm"));
        jpeg
    }

    async fn execute(
        &self,
        raw: &RawInput,
        _candidate: &Path,
        _scratch: &ScratchSpace,
    ) -> Result<(), StrategyError> {
        let invocation = ToolInvocation::new("dcraw", self.dcraw_bin.as_str())
            .arg("-e")
            .arg(raw.path());
        run_tool(&invocation, self.timeout).await?;
        Ok(())
    }

    /// Read the decoder's file and remove it straight away.
    async fn collect(&self, candidate: &Path) -> Result<Vec<u8>, StrategyError> {
        let bytes = tokio::fs::read(candidate).await?;
        if let Err(e) = tokio::fs::remove_file(candidate).await {
            warn!(path = %candidate.display(), error = %e, "Failed to remove dcraw thumbnail");
        }
        Ok(bytes)
    }
}
