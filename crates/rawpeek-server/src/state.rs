use std::sync::Arc;

use rawpeek_core::{AppConfig, CapabilityReport, Downloader, ExtractionPipeline, Uploader};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pipeline: Arc<dyn ExtractionPipeline>,
    pub downloader: Arc<dyn Downloader>,
    pub uploader: Arc<dyn Uploader>,
    pub capabilities: Arc<CapabilityReport>,
}
