// src/error.rs

use thiserror::Error;

/// Errors surfaced by the analysis engine.
///
/// Structural violations of the input contract propagate as these typed
/// errors; numerical degeneracies (empty histogram bins, silent debug
/// channel) are absorbed locally with documented fallback values and never
/// raised. The engine is deterministic, so a failed input fails identically
/// on retry.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The time series is too short (< 2 samples), non-monotonic, or the
    /// channel arrays disagree in length.
    #[error("invalid axis series: {0}")]
    InvalidSeries(String),

    /// The (valid) series is too short to form even one analysis frame.
    #[error("insufficient frames: {0}")]
    InsufficientFrames(String),
}
