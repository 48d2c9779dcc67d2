// src/config.rs

use crate::constants::{
    CUTOFF_FREQ_HZ, FRAME_LENGTH_S, HIGH_INPUT_THRESHOLD, MIN_INPUT_THRESHOLD,
    NOISE_FRAME_LENGTH_S, NOISE_SUPERPOSITION_FACTOR, RESPONSE_LENGTH_S, SUPERPOSITION_FACTOR,
};

/// Immutable analysis configuration shared read-only across axis computations.
///
/// The defaults reproduce the standard analysis; tests shrink the frame
/// lengths to keep synthetic logs small.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisConfig {
    /// Length of each response window in seconds.
    pub frame_length_s: f64,
    /// Length of the recovered step response in seconds.
    pub response_length_s: f64,
    /// Number of overlapping windows within one frame length.
    pub superposition: usize,
    /// Cutoff frequency (Hz) separating commanded input from noise in the
    /// deconvolution regularization.
    pub cutoff_hz: f64,
    /// Max-input amplitude separating the low and high response subsets.
    pub high_input_threshold: f64,
    /// Max-input amplitude below which a frame is excluded as untrusted.
    pub min_input_threshold: f64,
    /// Length of each noise-analysis window in seconds.
    pub noise_frame_length_s: f64,
    /// Number of overlapping windows within one noise frame length.
    pub noise_superposition: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_length_s: FRAME_LENGTH_S,
            response_length_s: RESPONSE_LENGTH_S,
            superposition: SUPERPOSITION_FACTOR,
            cutoff_hz: CUTOFF_FREQ_HZ,
            high_input_threshold: HIGH_INPUT_THRESHOLD,
            min_input_threshold: MIN_INPUT_THRESHOLD,
            noise_frame_length_s: NOISE_FRAME_LENGTH_S,
            noise_superposition: NOISE_SUPERPOSITION_FACTOR,
        }
    }
}
