//! Startup probe of the external tools the strategies depend on.

use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use rawpeek_core::capability::{CapabilityReport, ToolCapability};
use rawpeek_core::config::ToolConfig;

use crate::process::{run_unchecked, ToolInvocation};

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Check exiftool, dcraw and convert, in that order.
pub async fn probe_tools(config: &ToolConfig) -> CapabilityReport {
    let tools = vec![
        probe_tool("exiftool", &config.exiftool_bin, &["-ver"], None).await,
        // dcraw has no version flag; bare invocation prints usage and exits 1.
        probe_tool("dcraw", &config.dcraw_bin, &[], Some("dcraw")).await,
        probe_tool("convert", &config.convert_bin, &["-version"], None).await,
    ];

    for tool in &tools {
        if tool.available {
            info!(
                tool = %tool.tool,
                version = tool.version.as_deref().unwrap_or("unknown"),
                "External tool available"
            );
        } else {
            warn!(
                tool = %tool.tool,
                detail = tool.detail.as_deref().unwrap_or(""),
                "External tool unavailable, strategies using it will fail"
            );
        }
    }

    CapabilityReport {
        tools,
        checked_at: Utc::now(),
    }
}

/// Run `binary args…`. A zero exit means available; so does any exit whose
/// output mentions `marker`, for tools that only print usage.
pub async fn probe_tool(
    tool: &str,
    binary: &str,
    args: &[&str],
    marker: Option<&str>,
) -> ToolCapability {
    let invocation = args
        .iter()
        .fold(ToolInvocation::new(tool, binary), |inv, a| inv.arg(a));

    let (available, version, detail) = match run_unchecked(&invocation, PROBE_TIMEOUT).await {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            let mentions_marker = marker
                .is_some_and(|m| stdout.contains(m) || stderr.contains(m));

            if output.status.success() || mentions_marker {
                let version = version_line(&stdout, marker)
                    .or_else(|| version_line(&stderr, marker));
                (true, version, None)
            } else {
                (
                    false,
                    None,
                    Some(format!("exited with status {:?}", output.status.code())),
                )
            }
        }
        Err(e) => (false, None, Some(e.to_string())),
    };

    ToolCapability {
        tool: tool.to_string(),
        binary: binary.to_string(),
        available,
        version,
        detail,
    }
}

/// First non-blank line, or the first one mentioning `marker` when given.
fn version_line(output: &str, marker: Option<&str>) -> Option<String> {
    let mut lines = output.lines().map(str::trim).filter(|l| !l.is_empty());
    let line = match marker {
        Some(m) => lines.find(|l| l.contains(m)),
        None => lines.next(),
    };
    line.map(str::to_string)
}
