// src/data_analysis/noise.rs

use ndarray::{s, Array1, Array2, Axis};

use crate::constants::{
    EPSILON, NOISE_FREQ_DECIMATION, NOISE_PEAK_MIN_FREQ_HZ, NOISE_SMOOTHING_SIGMA,
};
use crate::data_analysis::hist2d::{create_hist2d, Hist2d};
use crate::data_analysis::smoothing::gaussian_smooth_axis;
use crate::data_analysis::spectral::spectrum;
use crate::data_analysis::window_stacker::apply_window;
use crate::error::AnalysisError;

/// Throttle-conditioned noise spectrogram of one channel.
#[derive(Debug, Clone)]
pub struct NoiseSpectrum {
    /// Frequency bin edges in Hz (one more than the histogram has columns).
    pub freq_edges: Array1<f64>,
    /// Throttle bin edges, 102 values spanning 0-100%.
    pub throttle_edges: Array1<f64>,
    /// Number of frames per throttle bin.
    pub throttle_counts: Array1<f64>,
    /// Raw spectral-magnitude histogram (throttle bin x frequency bin).
    pub hist: Array2<f64>,
    /// `hist` normalized per throttle bin by its frame count (+epsilon).
    pub hist_norm: Array2<f64>,
    /// `hist_norm` smoothed along the frequency axis (Gaussian, sigma 3).
    pub hist_smooth: Array2<f64>,
    /// Maximum smoothed value above 100 Hz; drives default plot scaling.
    pub peak: f64,
}

/// Builds the throttle-conditioned noise spectrogram for one channel's frame
/// stack. The final `trim_frames` frames are dropped first to exclude the
/// landing artifact at the end of a flight log.
pub fn stack_spectrum(
    signal: &Array2<f64>,
    throttle: &Array2<f64>,
    window: &Array1<f64>,
    dt: f64,
    trim_frames: usize,
) -> Result<NoiseSpectrum, AnalysisError> {
    if signal.dim() != throttle.dim() {
        return Err(AnalysisError::InvalidSeries(format!(
            "noise stack shape mismatch: signal {:?}, throttle {:?}",
            signal.dim(),
            throttle.dim()
        )));
    }
    let kept = signal.nrows().saturating_sub(trim_frames);
    if kept == 0 {
        return Err(AnalysisError::InsufficientFrames(format!(
            "{} noise frames left after trimming {} landing frames",
            kept, trim_frames
        )));
    }

    let sig = apply_window(&signal.slice(s![..kept, ..]).to_owned(), window);
    let thr = apply_window(&throttle.slice(s![..kept, ..]).to_owned(), window);

    let (freqs, spec) = spectrum(&sig, dt);
    let weights = spec.mapv(|c| c.re.abs());
    // Peak |throttle| per frame conditions the histogram rows.
    let max_thr = thr.map_axis(Axis(1), |row| {
        row.iter().fold(0.0f64, |acc, &v| acc.max(v.abs()))
    });

    let y_bins = freqs.len() / NOISE_FREQ_DECIMATION;
    let h = create_hist2d(&max_thr, &freqs, &weights, y_bins);
    let hist_smooth = gaussian_smooth_axis(&h.hist_norm, NOISE_SMOOTHING_SIGMA, Axis(1));

    let f_max = freqs[freqs.len() - 1];
    let freq_edges = Array1::linspace(0.0, f_max, y_bins + 1);
    // Report the peak only above the frequency floor; low-frequency motion
    // content would otherwise dominate.
    let mut peak = 0.0f64;
    for j in 0..y_bins {
        if freq_edges[j] >= NOISE_PEAK_MIN_FREQ_HZ {
            for i in 0..hist_smooth.nrows() {
                peak = peak.max(hist_smooth[[i, j]]);
            }
        }
    }

    Ok(NoiseSpectrum {
        freq_edges,
        throttle_edges: h.throttle_edges,
        throttle_counts: h.throttle_counts,
        hist: h.hist,
        hist_norm: h.hist_norm,
        hist_smooth,
        peak,
    })
}

/// Estimates how much spectral energy survives the gyro filtering stage by
/// comparing the filtered gyro channel against the unfiltered debug channel.
///
/// Per frequency bin, both histograms are averaged over the throttle axis
/// weighted by throttle usage (bins with no frames contribute nothing) and
/// the ratio gyro/debug is taken. When the debug channel carries no signal
/// at all the transmission is defined as all-zero: debug instrumentation was
/// not enabled for that flight.
pub fn filter_transmission(gyro: &NoiseSpectrum, debug: &NoiseSpectrum) -> Array1<f64> {
    let y_bins = gyro.hist.ncols();
    if debug.hist.sum() <= 0.0 || debug.hist.ncols() != y_bins {
        return Array1::zeros(y_bins);
    }
    let thr_mask = gyro.throttle_counts.mapv(|v| v.clamp(0.0, 1.0));
    let mask_total = thr_mask.sum();
    if mask_total <= 0.0 {
        return Array1::zeros(y_bins);
    }

    let mut transmission = Array1::<f64>::zeros(y_bins);
    for j in 0..y_bins {
        let mut gyro_avg = 0.0;
        let mut debug_avg = 0.0;
        for i in 0..thr_mask.len() {
            gyro_avg += gyro.hist[[i, j]] * thr_mask[i];
            debug_avg += debug.hist[[i, j]] * thr_mask[i];
        }
        transmission[j] = (gyro_avg / mask_total) / (debug_avg / mask_total + EPSILON);
    }
    transmission
}
