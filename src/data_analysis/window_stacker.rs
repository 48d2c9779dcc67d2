// src/data_analysis/window_stacker.rs

use log::warn;
use ndarray::{s, Array1, Array2};

/// Stride between consecutive frames: `frame_len / superpos`.
pub fn frame_stride(frame_len: usize, superpos: usize) -> usize {
    if superpos == 0 {
        return 0;
    }
    frame_len / superpos
}

/// Number of overlapping frames a series of `total_len` samples yields:
/// `floor(total_len / stride) - superpos`, reduced so every frame stays in
/// bounds. Zero means insufficient data.
pub fn frame_count(total_len: usize, frame_len: usize, superpos: usize) -> usize {
    let stride = frame_stride(frame_len, superpos);
    if stride == 0 || frame_len == 0 {
        return 0;
    }
    let mut frames = (total_len / stride).saturating_sub(superpos);
    while frames > 0 && (frames - 1) * stride + frame_len > total_len {
        frames -= 1;
    }
    frames
}

/// Cuts one channel into overlapping frames of `frame_len` samples, frame
/// `i` starting at `i * stride`. Returns an empty stack when the series is
/// too short; callers treat that as "insufficient data".
pub fn winstack(data: &Array1<f64>, frame_len: usize, superpos: usize) -> Array2<f64> {
    let stride = frame_stride(frame_len, superpos);
    if stride == 0 {
        warn!(
            "Window stride is zero (frame_len={}, superpos={}); returning empty stack.",
            frame_len, superpos
        );
        return Array2::zeros((0, 0));
    }
    let frames = frame_count(data.len(), frame_len, superpos);
    if frames == 0 {
        return Array2::zeros((0, 0));
    }
    let mut stacked = Array2::<f64>::zeros((frames, frame_len));
    for i in 0..frames {
        let start = i * stride;
        stacked
            .row_mut(i)
            .assign(&data.slice(s![start..start + frame_len]));
    }
    stacked
}

/// Hann window of length `n` (numpy `hanning` semantics).
pub fn hann_window(n: usize) -> Array1<f64> {
    if n == 0 {
        return Array1::zeros(0);
    }
    if n == 1 {
        return Array1::ones(1);
    }
    Array1::from_iter((0..n).map(|i| {
        0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / (n as f64 - 1.0)).cos()
    }))
}

/// Multiplies every frame of a stack by a tapering window.
pub fn apply_window(frames: &Array2<f64>, window: &Array1<f64>) -> Array2<f64> {
    let mut out = frames.to_owned();
    for mut row in out.rows_mut() {
        row *= window;
    }
    out
}
