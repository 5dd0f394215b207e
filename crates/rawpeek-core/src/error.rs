use std::time::Duration;

use thiserror::Error;

use crate::extraction::ExtractionAttempt;

/// Longest slice of tool stderr kept in a failure reason.
const MAX_STDERR_CHARS: usize = 240;

#[derive(Error, Debug)]
pub enum RawPeekError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(
        "Unable to extract thumbnail from RAW file using any available method ({}). \
         The file may not contain embedded preview images.",
        attempted_names(.attempts)
    )]
    PipelineExhausted { attempts: Vec<ExtractionAttempt> },

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request timed out after {}s", .0.as_secs())]
    RequestTimeout(Duration),
}

fn attempted_names(attempts: &[ExtractionAttempt]) -> String {
    attempts
        .iter()
        .map(|a| a.strategy_name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, RawPeekError>;

/// Failure of a single extraction strategy.
///
/// Never crosses the pipeline boundary on its own: the pipeline folds it into
/// an [`ExtractionAttempt`] and moves on to the next strategy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    #[error("{tool} is not installed or not on PATH")]
    ToolMissing { tool: String },

    #[error("failed to start {tool}: {message}")]
    Spawn { tool: String, message: String },

    #[error("{tool} exited with {}: {stderr}", exit_label(.code))]
    NonZeroExit {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{tool} timed out after {secs}s")]
    Timeout { tool: String, secs: u64 },

    #[error("{0}")]
    EmptyOutput(String),

    #[error("I/O error: {0}")]
    Io(String),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "a signal".to_string(),
    }
}

impl StrategyError {
    pub fn non_zero_exit(tool: &str, code: Option<i32>, stderr: &[u8]) -> Self {
        Self::NonZeroExit {
            tool: tool.to_string(),
            code,
            stderr: truncate_stderr(stderr),
        }
    }
}

impl From<std::io::Error> for StrategyError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// Lossy, trimmed and bounded rendering of a tool's stderr.
pub fn truncate_stderr(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.is_empty() {
        return "no error output".to_string();
    }
    if text.chars().count() <= MAX_STDERR_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_STDERR_CHARS).collect();
    cut.push('…');
    cut
}
