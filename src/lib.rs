// src/lib.rs - Library interface for internal module access

//! Per-axis analysis engine for flight-controller blackbox telemetry.
//!
//! Turns one control axis's raw logged channels (gyro rate, controller
//! input, throttle, D-term error, debug) into a finished [`Trace`]:
//! closed-loop step responses recovered by regularized deconvolution,
//! throttle-conditioned noise spectrograms, and a filter-transmission
//! estimate. The engine is a pure batch computation - no I/O, no
//! rendering. Log decoding and plotting live with the callers.
//!
//! Per-axis [`Trace`]s share no mutable state and may be computed on
//! separate threads.

pub mod axis_data;
pub mod axis_names;
pub mod config;
pub mod constants;
pub mod data_analysis;
pub mod error;

pub use axis_data::{AxisSeries, RawAxisData};
pub use config::AnalysisConfig;
pub use data_analysis::noise::NoiseSpectrum;
pub use data_analysis::response::ResponseSummary;
pub use data_analysis::trace::Trace;
pub use error::AnalysisError;
