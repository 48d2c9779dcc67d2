// src/data_analysis/hist2d.rs

use log::warn;
use ndarray::{Array1, Array2};

use crate::constants::{EPSILON, THROTTLE_BINS, THROTTLE_MAX_PERCENT};

/// A throttle-conditioned 2D histogram: one row per throttle bin (101 bins
/// spanning 0-100%), one column per bin of the secondary axis (response time
/// or frequency).
#[derive(Debug, Clone)]
pub struct Hist2d {
    /// Raw accumulated weight per (throttle, y) cell.
    pub hist: Array2<f64>,
    /// `hist` normalized per throttle bin by its sample count (+epsilon).
    pub hist_norm: Array2<f64>,
    /// Number of frames that landed in each throttle bin.
    pub throttle_counts: Array1<f64>,
    /// Throttle bin edges, 102 values spanning 0-100.
    pub throttle_edges: Array1<f64>,
}

impl Hist2d {
    fn empty(y_bins: usize) -> Self {
        Hist2d {
            hist: Array2::zeros((THROTTLE_BINS, y_bins)),
            hist_norm: Array2::zeros((THROTTLE_BINS, y_bins)),
            throttle_counts: Array1::zeros(THROTTLE_BINS),
            throttle_edges: Array1::linspace(0.0, THROTTLE_MAX_PERCENT, THROTTLE_BINS + 1),
        }
    }
}

/// Builds a [`Hist2d`] from per-frame throttle values `x` (length M), a
/// shared secondary axis `y` (length L), and per-sample `weights` (M x L).
///
/// Every sample `(x[i], y[j])` adds `weights[i][j]` to its cell; the
/// accumulated histogram is taken as magnitudes, so negative weights cannot
/// leave negative cells. `x` values
/// outside [0, 100] are dropped entirely, which is how untrusted frames are
/// excluded: their throttle is signed negative upstream. `y` is binned over
/// `[y[0], y[L-1]]` into `y_bins` bins.
pub fn create_hist2d(
    x: &Array1<f64>,
    y: &Array1<f64>,
    weights: &Array2<f64>,
    y_bins: usize,
) -> Hist2d {
    let mut out = Hist2d::empty(y_bins);
    if x.len() != weights.nrows() || y.len() != weights.ncols() {
        warn!(
            "hist2d shape mismatch: x {}, y {}, weights {:?}.",
            x.len(),
            y.len(),
            weights.dim()
        );
        return out;
    }
    if y_bins == 0 || y.len() < 2 {
        return out;
    }
    let y0 = y[0];
    let y_span = y[y.len() - 1] - y0;
    if y_span <= 0.0 {
        return out;
    }

    // y bin per column, shared by all frames.
    let y_bin: Vec<Option<usize>> = y
        .iter()
        .map(|&v| {
            if v < y0 || v > y0 + y_span {
                None
            } else {
                Some((((v - y0) / y_span) * y_bins as f64).min(y_bins as f64 - 1.0) as usize)
            }
        })
        .collect();

    for (i, &xv) in x.iter().enumerate() {
        if !(0.0..=THROTTLE_MAX_PERCENT).contains(&xv) {
            continue;
        }
        let x_bin = ((xv / THROTTLE_MAX_PERCENT) * THROTTLE_BINS as f64)
            .min(THROTTLE_BINS as f64 - 1.0) as usize;
        out.throttle_counts[x_bin] += 1.0;
        for (j, bin) in y_bin.iter().enumerate() {
            if let Some(k) = bin {
                out.hist[[x_bin, *k]] += weights[[i, j]];
            }
        }
    }

    // Step-response weights can be negative on undershoot; the histogram
    // carries magnitudes only.
    out.hist.mapv_inplace(f64::abs);

    out.hist_norm = out.hist.clone();
    for (mut row, &count) in out
        .hist_norm
        .rows_mut()
        .into_iter()
        .zip(out.throttle_counts.iter())
    {
        row.mapv_inplace(|v| v / (count + EPSILON));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_total_weight_preserved() {
        let x = array![10.0, 50.0, 90.0];
        let y = Array1::linspace(0.0, 1.0, 8);
        let weights = Array2::from_elem((3, 8), 0.5);
        let h = create_hist2d(&x, &y, &weights, 4);
        assert!((h.hist.sum() - weights.sum()).abs() < 1e-12);
        assert_eq!(h.throttle_counts.sum(), 3.0);
    }

    #[test]
    fn test_negative_throttle_is_dropped() {
        // Signed-negative throttle marks an excluded frame.
        let x = array![-50.0, 50.0];
        let y = Array1::linspace(0.0, 1.0, 4);
        let weights = Array2::from_elem((2, 4), 1.0);
        let h = create_hist2d(&x, &y, &weights, 4);
        assert!((h.hist.sum() - 4.0).abs() < 1e-12);
        assert_eq!(h.throttle_counts.sum(), 1.0);
    }

    #[test]
    fn test_normalization_per_throttle_bin() {
        // Two frames in the same throttle bin halve the normalized weight.
        let x = array![50.0, 50.0];
        let y = Array1::linspace(0.0, 1.0, 4);
        let weights = Array2::from_elem((2, 4), 1.0);
        let h = create_hist2d(&x, &y, &weights, 2);
        let bin = ((50.0 / 100.0) * 101.0) as usize;
        assert!((h.hist[[bin, 0]] - 4.0).abs() < 1e-12);
        assert!((h.hist_norm[[bin, 0]] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_negative_weights_become_magnitudes() {
        // An undershooting response has negative amplitudes; the histogram
        // still holds non-negative cells.
        let x = array![50.0];
        let y = Array1::linspace(0.0, 1.0, 4);
        let weights = Array2::from_elem((1, 4), -0.2);
        let h = create_hist2d(&x, &y, &weights, 4);
        let min = h.hist.iter().copied().fold(f64::INFINITY, f64::min);
        assert!(min >= 0.0, "hist has negative cells (min = {min})");
        assert!((h.hist.sum() - 0.8).abs() < 1e-12);
        let norm_min = h.hist_norm.iter().copied().fold(f64::INFINITY, f64::min);
        assert!(norm_min >= 0.0);
    }

    #[test]
    fn test_shape_and_edges() {
        let x = array![0.0, 100.0];
        let y = Array1::linspace(0.0, 2.0, 10);
        let weights = Array2::from_elem((2, 10), 1.0);
        let h = create_hist2d(&x, &y, &weights, 5);
        assert_eq!(h.hist.dim(), (101, 5));
        assert_eq!(h.throttle_edges.len(), 102);
        assert_eq!(h.throttle_edges[0], 0.0);
        assert_eq!(h.throttle_edges[101], 100.0);
        // x = 100 lands in the last bin, not out of range.
        assert_eq!(h.throttle_counts[100], 1.0);
    }

    #[test]
    fn test_shape_mismatch_yields_empty() {
        let x = array![10.0];
        let y = Array1::linspace(0.0, 1.0, 4);
        let weights = Array2::from_elem((2, 4), 1.0);
        let h = create_hist2d(&x, &y, &weights, 4);
        assert_eq!(h.hist.sum(), 0.0);
    }
}
