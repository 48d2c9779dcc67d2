// src/data_analysis/mod.rs

pub mod fft_utils;
pub mod hist2d;
pub mod noise;
pub mod resampler;
pub mod response;
pub mod smoothing;
pub mod spectral;
pub mod trace;
pub mod window_stacker;
