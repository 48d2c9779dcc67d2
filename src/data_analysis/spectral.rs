// src/data_analysis/spectral.rs

use log::warn;
use ndarray::{s, Array1, Array2, Axis};
use num_complex::Complex64;
use realfft::RealFftPlanner;

use crate::constants::{EPSILON, FFT_BLOCK_SIZE};
use crate::data_analysis::fft_utils;
use crate::data_analysis::smoothing::{gaussian_filter1d, normalize_to_unit};

/// Zero-pads every frame of a stack up to the next multiple of `block`
/// samples. A stack already aligned still gains one full block, matching the
/// padding the analysis was calibrated with.
pub fn pad_frames(frames: &Array2<f64>, block: usize) -> Array2<f64> {
    let (rows, cols) = frames.dim();
    if rows == 0 || block == 0 {
        return frames.to_owned();
    }
    let pad = block - (cols % block);
    let mut padded = Array2::<f64>::zeros((rows, cols + pad));
    padded.slice_mut(s![.., ..cols]).assign(frames);
    padded
}

/// Ortho-normalized real FFT of a frame stack for noise analysis.
///
/// Frames are zero-padded to the next multiple of [`FFT_BLOCK_SIZE`].
/// Returns the frequency axis (`rfftfreq` of the padded length) and one
/// complex spectrum row per frame, each scaled by `1/sqrt(n_padded)`.
pub fn spectrum(frames: &Array2<f64>, dt: f64) -> (Array1<f64>, Array2<Complex64>) {
    if frames.nrows() == 0 || frames.ncols() == 0 || dt <= 0.0 {
        return (Array1::zeros(0), Array2::zeros((0, 0)));
    }
    let padded = pad_frames(frames, FFT_BLOCK_SIZE);
    let n = padded.ncols();
    let n_freq = fft_utils::complex_len(n);
    let freqs = fft_utils::fft_rfftfreq(n, dt);

    let plan = RealFftPlanner::<f64>::new().plan_fft_forward(n);
    let scale = 1.0 / (n as f64).sqrt();
    let mut spec = Array2::<Complex64>::zeros((padded.nrows(), n_freq));
    for (i, row) in padded.rows().into_iter().enumerate() {
        let mut input = row.to_vec();
        let mut output = plan.make_output_vec();
        if plan.process(&mut input, &mut output).is_err() {
            warn!("FFT forward processing failed for noise frame {}.", i);
            continue;
        }
        for (j, value) in output.into_iter().enumerate() {
            spec[[i, j]] = value * scale;
        }
    }
    (freqs, spec)
}

/// Frequency-dependent regularization strength `10 * (1 - sn + eps)` over
/// the one-sided spectrum of an `n`-sample frame.
///
/// `sn` is a soft low-pass weight: 0 below `cutoff_hz`, 1 above, with the
/// transition smoothed by a Gaussian whose width is proportional to the
/// low-pass band's bin count. Always strictly positive, so `1/sn` in the
/// deconvolution denominator is never infinite.
fn regularization_weight(n: usize, dt: f64, cutoff_hz: f64) -> Array1<f64> {
    // Built over the full two-sided fftfreq layout so the smoothing sees the
    // mirrored band, then cut down to the rfft half.
    let mut sn = Array1::<f64>::zeros(n);
    for i in 0..n {
        let k = if i <= n / 2 { i } else { n - i };
        let f = k as f64 / (n as f64 * dt);
        sn[i] = f.clamp(cutoff_hz - EPSILON, cutoff_hz);
    }
    let sn = normalize_to_unit(&sn);
    let low_pass_bins: f64 = sn.iter().map(|v| 1.0 - v).sum();
    let sn = normalize_to_unit(&gaussian_filter1d(&sn, low_pass_bins / 6.0));
    let sn = sn.mapv(|v| 10.0 * (1.0 - v + EPSILON));
    sn.slice(s![..fft_utils::complex_len(n)]).to_owned()
}

/// Wiener-style regularized deconvolution of stacked input/output frames.
///
/// Estimates per-frame impulse responses as
/// `Re(IFFT(G * conj(H) / (H * conj(H) + 1/sn)))` where `H` and `G` are the
/// spectra of the (windowed, zero-padded) input and output frames. The
/// regularization grows with frequency above `cutoff_hz`, suppressing noise
/// amplification from the spectral division while leaving the low-frequency
/// dynamics untouched. Rows keep the padded length; callers truncate.
pub fn wiener_deconvolution(
    input: &Array2<f64>,
    output: &Array2<f64>,
    dt: f64,
    cutoff_hz: f64,
) -> Array2<f64> {
    if input.dim() != output.dim() {
        warn!(
            "Deconvolution stack shape mismatch: {:?} vs {:?}.",
            input.dim(),
            output.dim()
        );
        return Array2::zeros((0, 0));
    }
    if input.nrows() == 0 || input.ncols() == 0 {
        return Array2::zeros((0, 0));
    }

    let inp = pad_frames(input, FFT_BLOCK_SIZE);
    let outp = pad_frames(output, FFT_BLOCK_SIZE);
    let n = inp.ncols();
    let n_freq = fft_utils::complex_len(n);
    let reg = regularization_weight(n, dt, cutoff_hz);

    let forward = RealFftPlanner::<f64>::new().plan_fft_forward(n);
    let inverse = RealFftPlanner::<f64>::new().plan_fft_inverse(n);
    let mut impulses = Array2::<f64>::zeros((inp.nrows(), n));

    for i in 0..inp.nrows() {
        let mut in_buf = inp.row(i).to_vec();
        let mut h = forward.make_output_vec();
        let mut out_buf = outp.row(i).to_vec();
        let mut g = forward.make_output_vec();
        if forward.process(&mut in_buf, &mut h).is_err()
            || forward.process(&mut out_buf, &mut g).is_err()
        {
            warn!("FFT forward processing failed in deconvolution frame {}.", i);
            continue;
        }

        let mut deconvolved: Vec<Complex64> = Vec::with_capacity(n_freq);
        for k in 0..n_freq {
            let h_conj = h[k].conj();
            let denominator = (h[k] * h_conj).re + 1.0 / reg[k];
            deconvolved.push(g[k] * h_conj / denominator);
        }
        // The inverse transform requires exactly real DC and Nyquist bins.
        deconvolved[0].im = 0.0;
        if n % 2 == 0 {
            deconvolved[n_freq - 1].im = 0.0;
        }

        let mut time_buf = vec![0.0f64; n];
        if inverse.process(&mut deconvolved, &mut time_buf).is_err() {
            warn!("FFT inverse processing failed in deconvolution frame {}.", i);
            continue;
        }
        let scale = 1.0 / n as f64;
        for (j, v) in time_buf.into_iter().enumerate() {
            impulses[[i, j]] = v * scale;
        }
    }
    impulses
}

/// Truncates per-frame impulse responses to `response_len` samples and
/// integrates each into a step response (cumulative sum along time).
pub fn step_responses(impulses: &Array2<f64>, response_len: usize) -> Array2<f64> {
    if impulses.nrows() == 0 {
        return Array2::zeros((0, 0));
    }
    let cols = impulses.ncols().min(response_len);
    let mut responses = impulses.slice(s![.., ..cols]).to_owned();
    responses.accumulate_axis_inplace(Axis(1), |&prev, cur| *cur += prev);
    responses
}
