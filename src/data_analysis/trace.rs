// src/data_analysis/trace.rs

use log::debug;
use ndarray::{Array1, Array2, Axis};
use ndarray_stats::QuantileExt;

use crate::axis_data::{pid_input, AxisSeries, RawAxisData};
use crate::config::AnalysisConfig;
use crate::constants::THROTTLE_MAX_PERCENT;
use crate::data_analysis::hist2d::{create_hist2d, Hist2d};
use crate::data_analysis::noise::{filter_transmission, stack_spectrum, NoiseSpectrum};
use crate::data_analysis::resampler::{interp_linear, uniform_grid, validate_series};
use crate::data_analysis::response::{
    aggregate_response, low_high_masks, masked_mean, response_quality, ResponseSummary,
};
use crate::data_analysis::spectral::{step_responses, wiener_deconvolution};
use crate::data_analysis::window_stacker::{apply_window, frame_count, hann_window, winstack};
use crate::error::AnalysisError;

/// The finished analysis product for one control axis.
///
/// Built once from the axis's raw telemetry; read-only afterwards.
/// Construction runs the full pipeline to completion or fails with a typed
/// error - there are no partial states.
#[derive(Debug, Clone)]
pub struct Trace {
    /// Axis name (`roll`, `pitch`, `yaw`).
    pub name: String,
    /// All channels resampled onto the uniform time grid.
    pub series: AxisSeries,
    /// Uniform sample spacing in seconds.
    pub dt: f64,
    /// Sample rate in Hz (`1/dt`).
    pub sample_rate: f64,
    /// Response time axis in seconds, starting at 0.
    pub time_resp: Array1<f64>,
    /// Whole-flight throttle usage: density histogram over 100 bins, 0-100%.
    pub throttle_hist: Array1<f64>,
    /// Edges of `throttle_hist`, 101 values.
    pub throttle_hist_edges: Array1<f64>,
    /// Center time of each response window.
    pub frame_times: Array1<f64>,
    /// Max absolute (windowed) input amplitude per frame.
    pub max_input: Array1<f64>,
    /// Mean absolute (windowed) input amplitude per frame.
    pub mean_input: Array1<f64>,
    /// Max absolute (windowed) throttle per frame.
    pub max_throttle: Array1<f64>,
    /// Per-frame agreement with the all-frames dominant curve, in [0, 1].
    pub frame_quality: Array1<f64>,
    /// Aggregated step response of the low-input frames.
    pub response_low: ResponseSummary,
    /// Aggregated step response of the high-input frames; absent when fewer
    /// than 10 frames exceed the high-input threshold.
    pub response_high: Option<ResponseSummary>,
    /// (throttle x response time) histogram of trusted responses, for
    /// visualization.
    pub throttle_response: Hist2d,
    /// Noise spectrogram of the gyro channel.
    pub noise_gyro: NoiseSpectrum,
    /// Noise spectrogram of the D-term error channel.
    pub noise_d: NoiseSpectrum,
    /// Noise spectrogram of the debug channel.
    pub noise_debug: NoiseSpectrum,
    /// Filter transmission per frequency bin: gyro/debug spectral ratio, or
    /// all-zero when the debug channel is silent.
    pub filter_trans: Array1<f64>,
}

impl Trace {
    /// Runs the full analysis with the default configuration.
    pub fn new(data: &RawAxisData) -> Result<Self, AnalysisError> {
        Self::with_config(data, AnalysisConfig::default())
    }

    /// Runs the full analysis: resample, window, deconvolve, aggregate, then
    /// noise spectra and filter transmission.
    pub fn with_config(data: &RawAxisData, config: AnalysisConfig) -> Result<Self, AnalysisError> {
        validate_series(&data.time)?;
        let series = resample_axis(data)?;
        let dt = series.time[1] - series.time[0];
        let sample_rate = 1.0 / dt;
        let n = series.time.len();

        let (throttle_hist, throttle_hist_edges) = throttle_usage(&series.throttle);

        // Response windowing.
        let flen = (config.frame_length_s * sample_rate) as usize;
        let rlen = (config.response_length_s * sample_rate) as usize;
        if rlen < 2 || rlen > flen {
            return Err(AnalysisError::InsufficientFrames(format!(
                "response window of {} samples does not fit a {}-sample frame",
                rlen, flen
            )));
        }
        if frame_count(n, flen, config.superposition) == 0 {
            return Err(AnalysisError::InsufficientFrames(format!(
                "{} samples yield no frames of {} samples (superposition {})",
                n, flen, config.superposition
            )));
        }
        let time_resp = series.time.slice(ndarray::s![..rlen]).mapv(|t| t - series.time[0]);

        let time_stack = winstack(&series.time, flen, config.superposition);
        let input_stack = winstack(&series.input, flen, config.superposition);
        let gyro_stack = winstack(&series.gyro, flen, config.superposition);
        let throttle_stack = winstack(&series.throttle, flen, config.superposition);
        debug!(
            "axis {}: {} response frames of {} samples",
            data.name,
            time_stack.nrows(),
            flen
        );

        let window = hann_window(flen);
        let input_w = apply_window(&input_stack, &window);
        let gyro_w = apply_window(&gyro_stack, &window);
        let throttle_w = apply_window(&throttle_stack, &window);

        let impulses = wiener_deconvolution(&input_w, &gyro_w, dt, config.cutoff_hz);
        let responses = step_responses(&impulses, rlen);

        let frame_times = time_stack
            .mean_axis(Axis(1))
            .unwrap_or_else(|| Array1::zeros(0));
        let max_input = row_max_abs(&input_w);
        let mean_input = input_w
            .mapv(f64::abs)
            .mean_axis(Axis(1))
            .unwrap_or_else(|| Array1::zeros(0));
        let max_throttle = row_max_abs(&throttle_w);

        // Frame masking: low/high split plus a trust floor for tiny inputs.
        let (low_mask, high_mask) = low_high_masks(&max_input, config.high_input_threshold);
        let trusted = low_high_masks(&max_input, config.min_input_threshold).1;

        // The all-trusted-frames aggregate is the quality reference.
        let reference = aggregate_response(&responses, &trusted, &time_resp);
        let frame_quality = response_quality(&responses, &reference.response);

        // Throttle-conditioned response histogram: untrusted or disagreeing
        // frames get their throttle signed negative, dropping them from the
        // histogram's 0-100% range.
        let signed_throttle = Array1::from_iter(
            max_throttle
                .iter()
                .zip(trusted.iter().zip(frame_quality.iter()))
                .map(|(&thr, (&m, &q))| thr * (2.0 * m * q - 1.0)),
        );
        let trusted_responses = {
            let mut masked = responses.clone();
            for (mut row, &m) in masked.rows_mut().into_iter().zip(trusted.iter()) {
                row.mapv_inplace(|v| v * m);
            }
            masked
        };
        let throttle_response =
            create_hist2d(&signed_throttle, &time_resp, &trusted_responses, rlen - 1);

        let low_weights = &low_mask * &trusted;
        let mut response_low = aggregate_response(&responses, &low_weights, &time_resp);
        response_low.quality = masked_mean(&frame_quality, &low_weights);

        let response_high = if high_mask.sum() > 0.0 {
            let high_weights = &high_mask * &trusted;
            let mut summary = aggregate_response(&responses, &high_weights, &time_resp);
            summary.quality = masked_mean(&frame_quality, &high_weights);
            Some(summary)
        } else {
            None
        };

        // Noise spectrograms over short windows, trimmed of the landing.
        let noise_flen = (config.noise_frame_length_s * sample_rate) as usize;
        if frame_count(n, noise_flen, config.noise_superposition) == 0 {
            return Err(AnalysisError::InsufficientFrames(format!(
                "{} samples yield no noise frames of {} samples",
                n, noise_flen
            )));
        }
        let noise_window = hann_window(noise_flen);
        let trim_frames =
            (config.noise_superposition as f64 * 2.0 / config.noise_frame_length_s) as usize;
        let noise_throttle = winstack(&series.throttle, noise_flen, config.noise_superposition);
        let noise_gyro = stack_spectrum(
            &winstack(&series.gyro, noise_flen, config.noise_superposition),
            &noise_throttle,
            &noise_window,
            dt,
            trim_frames,
        )?;
        let noise_d = stack_spectrum(
            &winstack(&series.d_err, noise_flen, config.noise_superposition),
            &noise_throttle,
            &noise_window,
            dt,
            trim_frames,
        )?;
        let noise_debug = stack_spectrum(
            &winstack(&series.debug, noise_flen, config.noise_superposition),
            &noise_throttle,
            &noise_window,
            dt,
            trim_frames,
        )?;
        let filter_trans = filter_transmission(&noise_gyro, &noise_debug);

        Ok(Trace {
            name: data.name.clone(),
            series,
            dt,
            sample_rate,
            time_resp,
            throttle_hist,
            throttle_hist_edges,
            frame_times,
            max_input,
            mean_input,
            max_throttle,
            frame_quality,
            response_low,
            response_high,
            throttle_response,
            noise_gyro,
            noise_d,
            noise_debug,
            filter_trans,
        })
    }
}

/// Resamples every raw channel (plus the derived loop input) onto the
/// uniform grid spanning the original time range.
fn resample_axis(data: &RawAxisData) -> Result<AxisSeries, AnalysisError> {
    let input = pid_input(&data.p_err, &data.gyro, data.p_gain);
    let grid = uniform_grid(&data.time);
    Ok(AxisSeries {
        gyro: interp_linear(&data.time, &data.gyro, &grid)?,
        input: interp_linear(&data.time, &input, &grid)?,
        throttle: interp_linear(&data.time, &data.throttle, &grid)?,
        d_err: interp_linear(&data.time, &data.d_err, &grid)?,
        debug: interp_linear(&data.time, &data.debug, &grid)?,
        time: grid,
    })
}

/// Whole-flight throttle usage as a density histogram over 100 one-percent
/// bins; returns (densities, 101 bin edges).
fn throttle_usage(throttle: &Array1<f64>) -> (Array1<f64>, Array1<f64>) {
    let bins = THROTTLE_MAX_PERCENT as usize;
    let edges = Array1::linspace(0.0, THROTTLE_MAX_PERCENT, bins + 1);
    let mut counts = Array1::<f64>::zeros(bins);
    for &v in throttle.iter() {
        if (0.0..=THROTTLE_MAX_PERCENT).contains(&v) {
            let bin = (v.min(THROTTLE_MAX_PERCENT - 1e-9)) as usize;
            counts[bin] += 1.0;
        }
    }
    let total = counts.sum();
    if total > 0.0 {
        // Bin width is 1%, so density = fraction per bin.
        counts.mapv_inplace(|c| c / total);
    }
    (counts, edges)
}

fn row_max_abs(frames: &Array2<f64>) -> Array1<f64> {
    let abs = frames.mapv(f64::abs);
    Array1::from_iter(
        abs.rows()
            .into_iter()
            .map(|row| row.max().copied().unwrap_or(0.0)),
    )
}
