// src/data_analysis/fft_utils.rs

use ndarray::Array1;

/// Calculates the frequencies for the real FFT output, matching numpy's
/// `rfftfreq`: bin width = 1 / (n * d).
pub fn fft_rfftfreq(n: usize, d: f64) -> Array1<f64> {
    if n == 0 || d <= 0.0 {
        return Array1::zeros(0);
    }
    let num_freqs = complex_len(n);
    Array1::from_iter((0..num_freqs).map(|i| i as f64 / (n as f64 * d)))
}

/// Number of complex bins in the real FFT of an N-sample signal.
pub fn complex_len(n: usize) -> usize {
    if n % 2 == 0 {
        n / 2 + 1
    } else {
        (n + 1) / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfftfreq() {
        let freqs = fft_rfftfreq(1000, 0.001);
        assert_eq!(freqs.len(), 501);
        assert_eq!(freqs[0], 0.0);
        assert!((freqs[1] - 1.0).abs() < 1e-12);
        assert!((freqs[500] - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_rfftfreq_empty() {
        assert_eq!(fft_rfftfreq(0, 0.001).len(), 0);
        assert_eq!(fft_rfftfreq(100, 0.0).len(), 0);
    }

    #[test]
    fn test_complex_len() {
        assert_eq!(complex_len(1024), 513);
        assert_eq!(complex_len(1023), 512);
    }
}
