pub mod api_types;
pub mod capability;
pub mod config;
pub mod error;
pub mod extraction;
pub mod scratch;
pub mod transfer;

pub use capability::{CapabilityReport, ToolCapability};
pub use config::{AppConfig, ToolConfig, UploadMethod};
pub use error::{RawPeekError, Result, StrategyError};
pub use extraction::{
    ExtractionAttempt, ExtractionPipeline, ExtractionStrategy, PipelineResult, RawInput,
};
pub use scratch::ScratchSpace;
pub use transfer::{Downloader, UploadReceipt, Uploader};
