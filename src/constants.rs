// src/constants.rs

// Constants for the step response calculation.
pub const FRAME_LENGTH_S: f64 = 10.0; // Length of each window over which to compute a response
pub const RESPONSE_LENGTH_S: f64 = 0.5; // Length of the step response kept from each window
pub const SUPERPOSITION_FACTOR: usize = 16; // Number of overlapping windows within a frame length
pub const CUTOFF_FREQ_HZ: f64 = 25.0; // Frequency below which content counts as commanded input

// Input-amplitude masking of response frames.
pub const HIGH_INPUT_THRESHOLD: f64 = 500.0; // Threshold for the 'high input rate' subset
pub const MIN_INPUT_THRESHOLD: f64 = 20.0; // Frames below this are too noisy to trust
pub const MIN_HIGH_INPUT_FRAMES: usize = 10; // High subset is dropped below this frame count

// Response aggregation histogram.
pub const RESPONSE_AMPLITUDE_MIN: f64 = -1.5;
pub const RESPONSE_AMPLITUDE_MAX: f64 = 3.5;
pub const RESPONSE_AMPLITUDE_BINS: usize = 1000;
pub const RESPONSE_SMOOTHING_SIGMA: f64 = 7.0; // Gaussian width (bins) along the amplitude axis
pub const SPREAD_THRESHOLD: f64 = 0.5; // Raw-histogram mass threshold for the spread curve

// Noise spectrogram constants.
pub const NOISE_FRAME_LENGTH_S: f64 = 0.3;
pub const NOISE_SUPERPOSITION_FACTOR: usize = 16;
pub const NOISE_SMOOTHING_SIGMA: f64 = 3.0; // Gaussian width (bins) along the frequency axis
pub const NOISE_PEAK_MIN_FREQ_HZ: f64 = 100.0; // Peak reporting is restricted to above this
pub const NOISE_FREQ_DECIMATION: usize = 4; // Spectrum bins collapsed per histogram bin

// Throttle axis: 101 bins spanning 0-100%.
pub const THROTTLE_BINS: usize = 101;
pub const THROTTLE_MAX_PERCENT: f64 = 100.0;

// FFT frames are zero-padded up to the next multiple of this block size.
pub const FFT_BLOCK_SIZE: usize = 1024;

// Betaflight P-term scaling; converts raw P gain into loop units so that
// input = gyro + p_err / (P_SCALING_FACTOR * P).
pub const P_SCALING_FACTOR: f64 = 0.032029;

// Additive guard against empty-bin division.
pub const EPSILON: f64 = 1e-9;
