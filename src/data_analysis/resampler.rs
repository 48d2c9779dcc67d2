// src/data_analysis/resampler.rs

use ndarray::Array1;

use crate::error::AnalysisError;

/// Validates a time base for resampling: at least two samples, strictly
/// increasing.
pub fn validate_series(time: &Array1<f64>) -> Result<(), AnalysisError> {
    if time.len() < 2 {
        return Err(AnalysisError::InvalidSeries(format!(
            "time series has {} samples, need at least 2",
            time.len()
        )));
    }
    for i in 1..time.len() {
        if time[i] <= time[i - 1] {
            return Err(AnalysisError::InvalidSeries(format!(
                "time not strictly increasing at index {} ({} -> {})",
                i,
                time[i - 1],
                time[i]
            )));
        }
    }
    Ok(())
}

/// Builds the uniform time grid spanning `[time[0], time[N-1]]` with the
/// same sample count as `time`.
pub fn uniform_grid(time: &Array1<f64>) -> Array1<f64> {
    Array1::linspace(time[0], time[time.len() - 1], time.len())
}

/// Linearly interpolates `values` (sampled at `time`) onto `grid`.
///
/// `time` must be validated with [`validate_series`] first; `grid` must be
/// increasing and lie within `[time[0], time[N-1]]` (which [`uniform_grid`]
/// guarantees), so no extrapolation occurs.
pub fn interp_linear(
    time: &Array1<f64>,
    values: &Array1<f64>,
    grid: &Array1<f64>,
) -> Result<Array1<f64>, AnalysisError> {
    if values.len() != time.len() {
        return Err(AnalysisError::InvalidSeries(format!(
            "channel length {} does not match time length {}",
            values.len(),
            time.len()
        )));
    }
    let mut out = Array1::<f64>::zeros(grid.len());
    let mut seg = 0usize; // both time and grid increase, so the bracket only moves forward
    for (i, &t) in grid.iter().enumerate() {
        while seg + 2 < time.len() && time[seg + 1] < t {
            seg += 1;
        }
        let t0 = time[seg];
        let t1 = time[seg + 1];
        let frac = ((t - t0) / (t1 - t0)).clamp(0.0, 1.0);
        out[i] = values[seg] + frac * (values[seg + 1] - values[seg]);
    }
    Ok(out)
}
