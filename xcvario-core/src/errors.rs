//! Error Types for Filtering, Curves and Configuration
//!
//! ## Design Philosophy
//!
//! Errors in the core crate are returned from the sensor-callback thread, so
//! they stay small and cheap to copy:
//!
//! 1. **Copy Semantics**: Every variant carries plain numbers or
//!    `&'static str` reasons. Errors can be logged and returned without
//!    allocation.
//!
//! 2. **Actionable Information**: Each variant names the offending value so
//!    the caller can decide whether to skip a reading or reject a config.
//!
//! ## Error Categories
//!
//! ### Measurement Issues
//! - `FilterError::InvalidMeasurement`: NaN or infinite reading
//! - `FilterError::NonPositivePressure`: pressure that cannot be converted
//!   to an altitude
//!
//! ### Curve Construction
//! - `CurveError::NonIncreasing`: control points out of order
//! - `CurveError::CapacityExceeded`: more points than the fixed storage holds
//!
//! ### Configuration
//! - `ConfigError::OutOfRange`: a tunable outside its accepted interval
//! - `ConfigError::Parse` / `ConfigError::Io`: config file problems
//!
//! ## Handling Strategy
//!
//! ```rust
//! use xcvario_core::errors::FilterError;
//!
//! fn on_reading(result: Result<f64, FilterError>) {
//!     match result {
//!         Ok(_vario) => {}
//!         Err(FilterError::InvalidMeasurement { .. }) => {
//!             // Sensor glitch - hold the last estimate
//!         }
//!         Err(_) => {}
//!     }
//! }
//! ```

#[cfg(not(feature = "std"))]
use alloc::string::String;

use thiserror_no_std::Error;

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;

/// Result type for response curve construction
pub type CurveResult<T> = Result<T, CurveError>;

/// Result type for configuration loading and validation
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Measurement and conversion errors
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum FilterError {
    /// Reading is NaN or infinite
    #[error("Invalid measurement: {value} is not a finite number")]
    InvalidMeasurement {
        /// The rejected reading
        value: f64,
    },

    /// Pressure must be strictly positive to derive an altitude
    #[error("Pressure {pressure_pa} Pa is not positive")]
    NonPositivePressure {
        /// The rejected pressure in pascals
        pressure_pa: f64,
    },
}

/// Response curve construction errors
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum CurveError {
    /// New point's x does not exceed the previous point's x
    #[error("Control point x={x} must be greater than previous x={previous}")]
    NonIncreasing {
        /// x of the rejected point
        x: f64,
        /// x of the last accepted point
        previous: f64,
    },

    /// Curve already holds its maximum number of points
    #[error("Curve capacity of {capacity} points exceeded")]
    CapacityExceeded {
        /// Fixed point capacity
        capacity: usize,
    },

    /// Coordinate is NaN or infinite
    #[error("Control point ({x}, {y}) is not finite")]
    NonFinite {
        /// Rejected x
        x: f64,
        /// Rejected y
        y: f64,
    },

    /// Curve has no control points
    #[error("Curve has no control points")]
    Empty,
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Numeric option outside its accepted range
    #[error("{field} = {value} outside range [{min}, {max}]")]
    OutOfRange {
        /// Option name
        field: &'static str,
        /// Supplied value
        value: f64,
        /// Minimum accepted value
        min: f64,
        /// Maximum accepted value
        max: f64,
    },

    /// Audio format field not supported by the engine
    #[error("Unsupported audio format: {reason}")]
    UnsupportedFormat {
        /// What is wrong with the format
        reason: &'static str,
    },

    /// Curve override could not be built
    #[error("Invalid {field}: {source}")]
    Curve {
        /// Which curve override failed
        field: &'static str,
        /// Underlying curve error
        source: CurveError,
    },

    /// Config text is not valid JSON for `VarioConfig`
    #[error("Config parse error: {0}")]
    Parse(String),

    /// Config file could not be read
    #[error("Config I/O error: {0}")]
    Io(String),
}

#[cfg(feature = "std")]
impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}
