// src/data_analysis/response.rs

use ndarray::{Array1, Array2, Axis};

use crate::constants::{
    MIN_HIGH_INPUT_FRAMES, RESPONSE_AMPLITUDE_BINS, RESPONSE_AMPLITUDE_MAX,
    RESPONSE_AMPLITUDE_MIN, RESPONSE_SMOOTHING_SIGMA, SPREAD_THRESHOLD,
};
use crate::data_analysis::smoothing::gaussian_smooth_axis;

/// The statistically dominant step response aggregated from a stack of noisy
/// per-frame estimates.
#[derive(Debug, Clone)]
pub struct ResponseSummary {
    /// Dominant response curve, one value per response-time sample.
    pub response: Array1<f64>,
    /// Width/uncertainty of the response distribution per time sample, in
    /// amplitude units.
    pub spread: Array1<f64>,
    /// Response time axis in seconds, starting at 0.
    pub time: Array1<f64>,
    /// Amplitude axis of the histogram, spanning [-1.5, 3.5].
    pub amplitudes: Array1<f64>,
    /// Smoothed, per-column peak-normalized histogram
    /// (amplitude bin x time sample).
    pub histogram: Array2<f64>,
    /// Scalar agreement score in [0, 1]; 1.0 = every contributing frame
    /// matches the dominant curve.
    pub quality: f64,
}

/// Aggregates per-frame step responses into a [`ResponseSummary`] via a
/// weighted 2D histogram over (time, amplitude).
///
/// The histogram is smoothed along the amplitude axis (Gaussian, sigma 7
/// bins) and each time column is normalized by its own peak, so the modal
/// amplitude carries weight 1. The dominant curve is the per-column average
/// amplitude weighted by the squared smoothed histogram; squaring sharpens
/// the mode. The spread curve thresholds the raw histogram at 0.5 and sums
/// the surviving mass per column, scaled to amplitude units.
///
/// `quality` is left at 0; the caller fills it in once per-frame qualities
/// exist (they are measured against the all-frames aggregate).
pub fn aggregate_response(
    responses: &Array2<f64>,
    weights: &Array1<f64>,
    time_resp: &Array1<f64>,
) -> ResponseSummary {
    let frames = responses.nrows();
    let len = responses.ncols();
    let bins = RESPONSE_AMPLITUDE_BINS;
    let amp_span = RESPONSE_AMPLITUDE_MAX - RESPONSE_AMPLITUDE_MIN;
    let amplitudes = Array1::linspace(RESPONSE_AMPLITUDE_MIN, RESPONSE_AMPLITUDE_MAX, bins);

    // Each response sample is a point (time_resp[j], responses[i][j]) with
    // the frame's weight; time columns map directly to histogram columns.
    let mut hist = Array2::<f64>::zeros((bins, len));
    for i in 0..frames {
        let w = weights[i];
        if w <= 0.0 {
            continue;
        }
        for j in 0..len {
            let v = responses[[i, j]];
            if (RESPONSE_AMPLITUDE_MIN..=RESPONSE_AMPLITUDE_MAX).contains(&v) {
                let k = (((v - RESPONSE_AMPLITUDE_MIN) / amp_span) * bins as f64)
                    .min(bins as f64 - 1.0) as usize;
                hist[[k, j]] += w;
            }
        }
    }

    let (histogram, response) = if hist.sum() > 0.0 {
        let mut smoothed = gaussian_smooth_axis(&hist, RESPONSE_SMOOTHING_SIGMA, Axis(0));
        for mut col in smoothed.columns_mut() {
            let peak = col.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            if peak > 0.0 {
                col.mapv_inplace(|v| v / peak);
            }
        }
        let mut avr = Array1::<f64>::zeros(len);
        for j in 0..len {
            let mut num = 0.0;
            let mut den = 0.0;
            for k in 0..bins {
                let w = smoothed[[k, j]] * smoothed[[k, j]];
                num += amplitudes[k] * w;
                den += w;
            }
            avr[j] = if den > 0.0 { num / den } else { 0.0 };
        }
        (smoothed, avr)
    } else {
        (hist.clone(), Array1::zeros(len))
    };

    // Spread from the raw (unsmoothed, unsquared) histogram.
    let cell_height = SPREAD_THRESHOLD * amp_span / bins as f64;
    let mut spread = Array1::<f64>::zeros(len);
    for j in 0..len {
        for k in 0..bins {
            if hist[[k, j]] > SPREAD_THRESHOLD {
                spread[j] += cell_height;
            }
        }
    }

    ResponseSummary {
        response,
        spread,
        time: time_resp.to_owned(),
        amplitudes,
        histogram,
        quality: 0.0,
    }
}

/// Partitions frames by max input amplitude against `threshold` into
/// (low, high) 0/1 masks. The high mask is zeroed entirely when fewer than
/// [`MIN_HIGH_INPUT_FRAMES`] frames qualify - too few maneuvers to aggregate.
pub fn low_high_masks(max_input: &Array1<f64>, threshold: f64) -> (Array1<f64>, Array1<f64>) {
    let low = max_input.mapv(|v| if v <= threshold { 1.0 } else { 0.0 });
    let mut high = low.mapv(|v| 1.0 - v);
    if high.sum() < MIN_HIGH_INPUT_FRAMES as f64 {
        high.fill(0.0);
    }
    (low, high)
}

/// Per-frame agreement with the aggregate dominant curve:
/// `1 - clip(mean |frame - reference|, 0, 0.5) / 0.5`, so 1.0 = perfect
/// agreement and any deviation of 0.5 amplitude units or more scores 0.
pub fn response_quality(responses: &Array2<f64>, reference: &Array1<f64>) -> Array1<f64> {
    let len = responses.ncols().min(reference.len()) as f64;
    Array1::from_iter(responses.rows().into_iter().map(|row| {
        let dev = row
            .iter()
            .zip(reference.iter())
            .map(|(a, b)| (a - b).abs())
            .sum::<f64>()
            / len;
        1.0 - dev.clamp(0.0, 0.5) / 0.5
    }))
}

/// Mask-weighted mean of per-frame values; 0 when the mask is empty.
pub fn masked_mean(values: &Array1<f64>, mask: &Array1<f64>) -> f64 {
    let total = mask.sum();
    if total > 0.0 {
        (values * mask).sum() / total
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn ramp_responses(frames: usize, len: usize) -> Array2<f64> {
        // Step-like curve rising from 0 to 1 at one third of the window.
        Array2::from_shape_fn((frames, len), |(_, j)| {
            if j >= len / 3 {
                1.0
            } else {
                0.0
            }
        })
    }

    #[test]
    fn test_identical_frames_yield_their_curve() {
        let len = 100;
        let responses = ramp_responses(20, len);
        let weights = Array1::ones(20);
        let time = Array1::linspace(0.0, 0.099, len);
        let summary = aggregate_response(&responses, &weights, &time);
        assert_eq!(summary.response.len(), len);
        // One amplitude bin is 0.005 wide; allow a few bins of slack.
        assert!((summary.response[0] - 0.0).abs() < 0.02);
        assert!((summary.response[len - 1] - 1.0).abs() < 0.02);
        assert_eq!(summary.histogram.dim(), (1000, len));
    }

    #[test]
    fn test_zero_weights_yield_zero_curve() {
        let responses = ramp_responses(5, 50);
        let weights = Array1::zeros(5);
        let time = Array1::linspace(0.0, 0.049, 50);
        let summary = aggregate_response(&responses, &weights, &time);
        assert!(summary.response.iter().all(|&v| v == 0.0));
        assert_eq!(summary.histogram.sum(), 0.0);
    }

    #[test]
    fn test_out_of_range_amplitudes_are_dropped() {
        let responses = Array2::from_elem((2, 10), 10.0); // above 3.5
        let weights = Array1::ones(2);
        let time = Array1::linspace(0.0, 0.009, 10);
        let summary = aggregate_response(&responses, &weights, &time);
        assert_eq!(summary.histogram.sum(), 0.0);
        assert!(summary.response.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_masks_partition_trusted_frames() {
        let max_in = array![
            5.0, 30.0, 600.0, 400.0, 501.0, 550.0, 700.0, 800.0, 900.0, 1000.0, 1100.0, 1200.0,
            1300.0, 19.0
        ];
        let (low, high) = low_high_masks(&max_in, 500.0);
        let trusted = low_high_masks(&max_in, 20.0).1;
        // Every trusted frame is in exactly one of low/high.
        for i in 0..max_in.len() {
            if trusted[i] > 0.0 {
                assert_eq!(low[i] + high[i], 1.0, "frame {}", i);
            }
        }
    }

    #[test]
    fn test_high_mask_needs_ten_frames() {
        // Only 3 frames above threshold -> high mask zeroed.
        let max_in = array![600.0, 700.0, 800.0, 10.0, 10.0];
        let (_, high) = low_high_masks(&max_in, 500.0);
        assert_eq!(high.sum(), 0.0);

        // 10 frames above threshold -> high mask kept.
        let max_in = Array1::from_elem(10, 600.0);
        let (low, high) = low_high_masks(&max_in, 500.0);
        assert_eq!(high.sum(), 10.0);
        assert_eq!(low.sum(), 0.0);
    }

    #[test]
    fn test_quality_formula() {
        let reference = Array1::zeros(10);
        let responses = ndarray::stack![
            Axis(0),
            Array1::<f64>::zeros(10),      // dev 0.00 -> 1.0
            Array1::from_elem(10, 0.25),   // dev 0.25 -> 0.5
            Array1::from_elem(10, 0.75)    // dev 0.75, clipped -> 0.0
        ];
        let q = response_quality(&responses, &reference);
        assert!((q[0] - 1.0).abs() < 1e-12);
        assert!((q[1] - 0.5).abs() < 1e-12);
        assert!((q[2] - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_masked_mean() {
        let values = array![1.0, 0.5, 0.0];
        let mask = array![1.0, 1.0, 0.0];
        assert!((masked_mean(&values, &mask) - 0.75).abs() < 1e-12);
        assert_eq!(masked_mean(&values, &Array1::zeros(3)), 0.0);
    }
}
