use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartGuardError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Unable to parse values file {path}: {reason}")]
    ValuesParse { path: PathBuf, reason: String },

    #[error(
        "template rendering for chart '{}' did not complete within {}s",
        chart_dir.display(),
        timeout.as_secs()
    )]
    RenderTimeout {
        chart_dir: PathBuf,
        timeout: Duration,
    },
}

pub type Result<T> = std::result::Result<T, ChartGuardError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
