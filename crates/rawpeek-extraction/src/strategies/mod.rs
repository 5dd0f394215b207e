//! The concrete extraction strategies, highest output quality first.

use std::sync::Arc;

use rawpeek_core::config::ToolConfig;
use rawpeek_core::extraction::ExtractionStrategy;

mod dcraw_thumbnail;
mod decode_convert;
mod exiftool;

pub use dcraw_thumbnail::{decoder_thumbnail_path, DcrawThumbnailStrategy};
pub use decode_convert::DecodeConvertStrategy;
pub use exiftool::{EmbeddedImageStrategy, EmbeddedTag};

pub const EMBEDDED_PREVIEW: &str = "Embedded-Preview extraction";
pub const EMBEDDED_THUMBNAIL: &str = "Embedded-Thumbnail extraction";
pub const DECODE_AND_CONVERT: &str = "Decode-and-convert";
pub const DECODER_THUMBNAIL: &str = "Decoder-native-thumbnail extraction";

/// The production strategy list in priority order.
pub fn default_strategies(config: &ToolConfig) -> Vec<Arc<dyn ExtractionStrategy>> {
    vec![
        Arc::new(EmbeddedImageStrategy::new(EmbeddedTag::PreviewImage, config)),
        Arc::new(EmbeddedImageStrategy::new(EmbeddedTag::ThumbnailImage, config)),
        Arc::new(DecodeConvertStrategy::new(config)),
        Arc::new(DcrawThumbnailStrategy::new(config)),
    ]
}
