// src/axis_data.rs

use log::warn;
use ndarray::Array1;

use crate::constants::P_SCALING_FACTOR;

/// One axis's raw telemetry as supplied by an external loader/decoder.
///
/// All channel arrays must share one length. `time` is in seconds and must
/// be monotonically increasing; it may be irregular. `throttle` is expected
/// in percent (0-100); see [`throttle_percent`] for rescaling raw units.
/// `p_gain` is the axis's proportional gain, or `1.0` for firmwares where P
/// is already applied to `p_err`.
#[derive(Debug, Clone)]
pub struct RawAxisData {
    /// Axis name, conventionally one of `roll`, `pitch`, `yaw`.
    pub name: String,
    /// Timestamps in seconds, monotonically increasing.
    pub time: Array1<f64>,
    /// Filtered gyro rate.
    pub gyro: Array1<f64>,
    /// Controller-loop proportional error.
    pub p_err: Array1<f64>,
    /// Throttle in percent, 0-100.
    pub throttle: Array1<f64>,
    /// D-term error channel.
    pub d_err: Array1<f64>,
    /// Debug channel (unfiltered gyro when debug instrumentation is enabled).
    pub debug: Array1<f64>,
    /// Proportional gain for this axis.
    pub p_gain: f64,
}

/// One axis's telemetry after resampling onto a uniform time grid.
///
/// All arrays share one length; `time[i+1] - time[i]` is constant to
/// floating-point tolerance. `input` is the derived control-loop input,
/// `gyro + p_err / (P_SCALING_FACTOR * P)`.
#[derive(Debug, Clone)]
pub struct AxisSeries {
    pub time: Array1<f64>,
    pub gyro: Array1<f64>,
    pub input: Array1<f64>,
    pub throttle: Array1<f64>,
    pub d_err: Array1<f64>,
    pub debug: Array1<f64>,
}

/// Reconstructs the control-loop input from the proportional error.
///
/// `input = gyro + p_err / (P_SCALING_FACTOR * p_gain)`. A non-positive
/// gain falls back to 1.0 (P pre-applied in the log).
pub fn pid_input(p_err: &Array1<f64>, gyro: &Array1<f64>, p_gain: f64) -> Array1<f64> {
    let p_gain = if p_gain > 0.0 {
        p_gain
    } else {
        warn!("Non-positive P gain {}; assuming pre-applied P (gain 1.0).", p_gain);
        1.0
    };
    gyro + &(p_err / (P_SCALING_FACTOR * p_gain))
}

/// Rescales a raw throttle channel to percent via documented min/max values.
pub fn throttle_percent(raw: &Array1<f64>, min_throttle: f64, max_throttle: f64) -> Array1<f64> {
    let span = max_throttle - min_throttle;
    if span <= 0.0 {
        warn!("Degenerate throttle range [{}, {}]; returning zeros.", min_throttle, max_throttle);
        return Array1::zeros(raw.len());
    }
    raw.mapv(|v| (v - min_throttle) / span * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_pid_input_formula() {
        let gyro = array![10.0, -5.0];
        let p_err = array![0.32029, -0.32029];
        let input = pid_input(&p_err, &gyro, 1.0);
        // 0.32029 / 0.032029 = 10 exactly
        assert!((input[0] - 20.0).abs() < 1e-9);
        assert!((input[1] + 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_pid_input_gain_scaling() {
        let gyro = array![0.0];
        let p_err = array![0.64058];
        let input = pid_input(&p_err, &gyro, 2.0);
        assert!((input[0] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_pid_input_bad_gain_falls_back() {
        let gyro = array![1.0];
        let p_err = array![0.0];
        let input = pid_input(&p_err, &gyro, 0.0);
        assert!((input[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_throttle_percent() {
        let raw = array![1000.0, 1500.0, 2000.0];
        let pct = throttle_percent(&raw, 1000.0, 2000.0);
        assert_eq!(pct[0], 0.0);
        assert_eq!(pct[1], 50.0);
        assert_eq!(pct[2], 100.0);
    }

    #[test]
    fn test_throttle_percent_degenerate_range() {
        let raw = array![1000.0, 2000.0];
        let pct = throttle_percent(&raw, 1500.0, 1500.0);
        assert_eq!(pct, array![0.0, 0.0]);
    }
}
