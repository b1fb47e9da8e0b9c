use std::path::PathBuf;
use std::time::Duration;

/// Fatal errors raised while loading the manifest. Any of these aborts the run.
#[derive(thiserror::Error, Debug)]
pub enum ManifestError {
    #[error("manifest not found at {}", .0.display())]
    Missing(PathBuf),
    #[error("I/O error reading manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse manifest: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid manifest: {0}")]
    Invalid(String),
}

/// Errors reported by a single synthesis tier.
///
/// Only [`BackendError::Unavailable`] is sticky: the orchestrator stops asking
/// that tier for the rest of the run. Everything else is local to one
/// destination.
#[derive(thiserror::Error, Debug)]
pub enum BackendError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("synthesis failed: {0}")]
    SynthesisFailed(String),
    #[error("backend did not finish within {0:?}")]
    TimedOut(Duration),
    #[error("WAV encoding error: {0}")]
    Encoding(#[from] hound::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BackendError {
    /// Whether the failing tier should be skipped for the remainder of the run.
    pub fn disables_tier(&self) -> bool {
        matches!(self, BackendError::Unavailable(_))
    }
}
