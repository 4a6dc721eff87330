//! Kalman Filter Tuning Defaults
//!
//! Both the pressure filter and the altitude filter use the same constant
//! velocity model. The process variance plays the role of accelerometer
//! noise: larger values let the estimate follow gusts faster at the cost of
//! a jumpier vario.

/// Variance of the acceleration noise driving the model.
///
/// Tuned by ear: 0.0075 gives a vario that settles within ~2 s of entering
/// a thermal without chattering in still air.
pub const DEFAULT_PROCESS_VARIANCE: f64 = 0.0075;

/// Variance of a single sensor reading.
///
/// Matches the noise floor of BMP280-class sensors in high resolution mode.
pub const DEFAULT_MEASUREMENT_VARIANCE: f64 = 0.05;

/// Covariance assigned to estimate and velocity on reset.
///
/// Large enough that the first measurement dominates the prior.
pub const DEFAULT_INITIAL_VARIANCE: f64 = 400.0;

/// Upper bound on a single prediction interval (s).
///
/// `dt⁴` appears in the covariance prediction; clamping keeps it finite
/// after very long sensor gaps.
pub const MAX_PREDICT_INTERVAL_S: f64 = 1.0e6;
