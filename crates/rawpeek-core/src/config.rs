use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// HTTP verb used to deliver the preview to `uploadUrl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UploadMethod {
    Post,
    Put,
}

impl UploadMethod {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            _ => None,
        }
    }
}

/// External tool binaries and how they are driven.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    pub exiftool_bin: String,
    pub dcraw_bin: String,
    pub convert_bin: String,
    pub timeout_secs: u64,
    pub thumbnail_max_width: u32,
    pub thumbnail_max_height: u32,
    pub thumbnail_quality: u8,
}

impl ToolConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            exiftool_bin: "exiftool".into(),
            dcraw_bin: "dcraw".into(),
            convert_bin: "convert".into(),
            timeout_secs: 30,
            thumbnail_max_width: 800,
            thumbnail_max_height: 600,
            thumbnail_quality: 85,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub scratch_dir: PathBuf,
    pub tools: ToolConfig,
    pub download_timeout_secs: u64,
    pub upload_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub upload_method: UploadMethod,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or unparseable values use defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());
        let defaults = ToolConfig::default();

        let tools = ToolConfig {
            exiftool_bin: lookup("EXIFTOOL_BIN").unwrap_or(defaults.exiftool_bin),
            dcraw_bin: lookup("DCRAW_BIN").unwrap_or(defaults.dcraw_bin),
            convert_bin: lookup("CONVERT_BIN").unwrap_or(defaults.convert_bin),
            timeout_secs: parsed("TOOL_TIMEOUT_SECS").unwrap_or(defaults.timeout_secs),
            thumbnail_max_width: parsed("THUMBNAIL_MAX_WIDTH")
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(defaults.thumbnail_max_width),
            thumbnail_max_height: parsed("THUMBNAIL_MAX_HEIGHT")
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(defaults.thumbnail_max_height),
            thumbnail_quality: parsed("THUMBNAIL_QUALITY")
                .map(|q| q.clamp(1, 100) as u8)
                .unwrap_or(defaults.thumbnail_quality),
        };

        Self {
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port: lookup("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(3000),
            scratch_dir: lookup("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            tools,
            download_timeout_secs: parsed("DOWNLOAD_TIMEOUT_SECS").unwrap_or(120),
            upload_timeout_secs: parsed("UPLOAD_TIMEOUT_SECS").unwrap_or(60),
            request_timeout_secs: parsed("REQUEST_TIMEOUT_SECS").unwrap_or(300),
            upload_method: lookup("UPLOAD_METHOD")
                .and_then(|m| UploadMethod::parse(&m))
                .unwrap_or(UploadMethod::Post),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
