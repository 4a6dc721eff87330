//! Constants for XcVario Core
//!
//! Centralized, documented constants used by the filters, the barometric
//! conversion and the beep scheduler. Values that a pilot might want to tune
//! are only defaults here; the live values travel in [`crate::config`].
//!
//! ## Organization
//!
//! - **Physics**: atmosphere model used for pressure → altitude
//! - **Filter**: Kalman noise defaults
//! - **Audio**: tone, curve and output format defaults

/// Atmosphere constants for barometric altitude.
pub mod physics;

/// Kalman filter tuning defaults.
pub mod filter;

/// Tone, response curve and audio format defaults.
pub mod audio;

pub use physics::{SEA_LEVEL_PRESSURE_PA, BAROMETRIC_SCALE_M, BAROMETRIC_EXPONENT};

pub use filter::{
    DEFAULT_PROCESS_VARIANCE, DEFAULT_MEASUREMENT_VARIANCE, DEFAULT_INITIAL_VARIANCE,
};

pub use audio::{
    DEFAULT_BASE_TONE_HZ, DEFAULT_DEAD_BAND_M_S, DEFAULT_SAMPLE_RATE_HZ,
    DURATION_CURVE_POINTS, FREQUENCY_CURVE_POINTS,
};
