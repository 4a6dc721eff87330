//! Core filtering engine for XcVario
//!
//! Turns noisy barometer readings into a stable altitude and vertical-speed
//! estimate, and provides the response curves that map vertical speed onto
//! beep length and pitch.
//!
//! Key constraints:
//! - Readings arrive at irregular intervals; every update carries its own `dt`
//! - No allocation per reading
//! - No global state; everything tunable travels in `VarioConfig`
//! - Builds without `std` (default feature) minus config loading and logging
//!
//! ```no_run
//! use xcvario_core::{barometric, Estimator, KalmanFilter, VarioConfig};
//!
//! let config = VarioConfig::default();
//! let mut pressure = KalmanFilter::new(config.filter.process_variance);
//! let mut altitude = KalmanFilter::new(config.filter.process_variance);
//! pressure.reset(101_325.0);
//! altitude.reset(0.0);
//!
//! // On every sensor callback
//! pressure.update(101_320.0, config.filter.measurement_variance, 0.1);
//! let h = barometric::pressure_to_altitude(pressure.estimate(), config.sea_level_pa).unwrap();
//! altitude.update(h, config.filter.measurement_variance, 0.1);
//! let vario = altitude.rate();
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod barometric;
#[cfg(feature = "std")]
pub mod config;
pub mod constants;
pub mod curve;
pub mod errors;
pub mod filter;
pub mod format;

// Public API
#[cfg(feature = "std")]
pub use config::{BeepConfig, FilterConfig, SinkTone, VarioConfig};
pub use curve::{CurvePoint, ResponseCurve};
pub use errors::{ConfigError, CurveError, FilterError, ConfigResult, CurveResult, FilterResult};
pub use filter::{Estimator, FilterState, KalmanFilter};
pub use format::{AudioFormatSpec, ByteOrder, Signedness};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
