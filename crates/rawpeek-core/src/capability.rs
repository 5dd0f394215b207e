use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether one external tool can be run on this host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCapability {
    pub tool: String,
    pub binary: String,
    pub available: bool,
    pub version: Option<String>,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityReport {
    pub tools: Vec<ToolCapability>,
    pub checked_at: DateTime<Utc>,
}

impl CapabilityReport {
    pub fn all_available(&self) -> bool {
        self.tools.iter().all(|t| t.available)
    }

    pub fn missing(&self) -> Vec<&str> {
        self.tools
            .iter()
            .filter(|t| !t.available)
            .map(|t| t.tool.as_str())
            .collect()
    }
}
