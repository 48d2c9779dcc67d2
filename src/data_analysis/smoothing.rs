// src/data_analysis/smoothing.rs

use ndarray::{Array1, Array2, Axis};

/// Gaussian smoothing of a 1D array, mirroring the signal beyond the edges
/// (`scipy.ndimage.gaussian_filter1d` with its default `mode='reflect'`:
/// `d c b a | a b c d | d c b a`). The kernel is truncated at four standard
/// deviations.
pub fn gaussian_filter1d(data: &Array1<f64>, sigma: f64) -> Array1<f64> {
    let n = data.len();
    if n == 0 || sigma <= 0.0 {
        return data.to_owned();
    }
    let radius = (4.0 * sigma + 0.5) as isize;
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f64> = (-radius..=radius)
        .map(|i| (-((i * i) as f64) / denom).exp())
        .collect();
    let ksum: f64 = kernel.iter().sum();
    for k in kernel.iter_mut() {
        *k /= ksum;
    }

    let mut out = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut acc = 0.0;
        for (j, &k) in kernel.iter().enumerate() {
            let idx = i as isize + j as isize - radius;
            acc += k * data[reflect_index(idx, n as isize)];
        }
        out[i] = acc;
    }
    out
}

// Folds an out-of-range index back into [0, n) by repeated mirroring, with
// the edge sample duplicated.
fn reflect_index(mut idx: isize, n: isize) -> usize {
    loop {
        if idx < 0 {
            idx = -idx - 1;
        } else if idx >= n {
            idx = 2 * n - idx - 1;
        } else {
            return idx as usize;
        }
    }
}

/// Applies [`gaussian_filter1d`] to every lane of a 2D array along `axis`.
pub fn gaussian_smooth_axis(data: &Array2<f64>, sigma: f64, axis: Axis) -> Array2<f64> {
    let mut out = data.to_owned();
    for (lane_in, mut lane_out) in data.lanes(axis).into_iter().zip(out.lanes_mut(axis)) {
        let smoothed = gaussian_filter1d(&lane_in.to_owned(), sigma);
        lane_out.assign(&smoothed);
    }
    out
}

/// Rescales an array linearly onto [0, 1]: subtract the minimum, divide by
/// the resulting maximum. A constant array comes back as all zeros.
pub fn normalize_to_unit(data: &Array1<f64>) -> Array1<f64> {
    if data.is_empty() {
        return data.to_owned();
    }
    let min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let shifted = data.mapv(|v| v - min);
    let max = shifted.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max > 0.0 {
        shifted.mapv(|v| v / max)
    } else {
        Array1::zeros(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_kernel_preserves_mass_in_interior() {
        // A centered impulse spreads but keeps its total weight away from edges.
        let mut data = Array1::<f64>::zeros(101);
        data[50] = 1.0;
        let smoothed = gaussian_filter1d(&data, 3.0);
        assert!((smoothed.sum() - 1.0).abs() < 1e-9);
        // Peak stays at the impulse position.
        let peak = smoothed
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 50);
    }

    #[test]
    fn test_reflection_preserves_constant_signal() {
        // Mirrored boundaries keep a constant array constant all the way to
        // the edges.
        let data = Array1::<f64>::ones(50);
        let smoothed = gaussian_filter1d(&data, 3.0);
        for &v in smoothed.iter() {
            assert!((v - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_reflection_keeps_edge_mass() {
        // An impulse at the very edge folds back into range instead of
        // leaking past the boundary.
        let mut data = Array1::<f64>::zeros(50);
        data[0] = 1.0;
        let smoothed = gaussian_filter1d(&data, 3.0);
        assert!((smoothed.sum() - 1.0).abs() < 1e-9);
        // The edge sample sees roughly the mirrored half of the kernel on
        // top of its own center weight.
        assert!(smoothed[0] > smoothed[1]);
    }

    #[test]
    fn test_reflection_with_radius_past_signal_length() {
        // Sigma large enough that the kernel spans several mirror periods.
        let data = array![1.0, 2.0, 3.0];
        let smoothed = gaussian_filter1d(&data, 5.0);
        assert!((smoothed.sum() - data.sum()).abs() < 1e-9);
        for &v in smoothed.iter() {
            assert!(v > 1.0 && v < 3.0);
        }
    }

    #[test]
    fn test_non_positive_sigma_is_identity() {
        let data = array![1.0, 2.0, 3.0];
        assert_eq!(gaussian_filter1d(&data, 0.0), data);
    }

    #[test]
    fn test_smooth_axis_lanes() {
        let mut data = Array2::<f64>::zeros((3, 41));
        data[[1, 20]] = 1.0;
        let smoothed = gaussian_smooth_axis(&data, 2.0, Axis(1));
        // Only the lane containing the impulse is affected.
        assert_eq!(smoothed.row(0).sum(), 0.0);
        assert!((smoothed.row(1).sum() - 1.0).abs() < 1e-9);
        assert_eq!(smoothed.row(2).sum(), 0.0);
    }

    #[test]
    fn test_normalize_to_unit() {
        let data = array![5.0, 7.5, 10.0];
        let norm = normalize_to_unit(&data);
        assert_eq!(norm, array![0.0, 0.5, 1.0]);

        let flat = array![3.0, 3.0, 3.0];
        assert_eq!(normalize_to_unit(&flat), array![0.0, 0.0, 0.0]);
    }
}
