//! Sensor Filtering
//!
//! The variometer runs two independent filters in series:
//!
//! ```text
//! raw pressure ─→ [pressure filter] ─→ barometric altitude ─→ [altitude filter] ─→ vario
//! ```
//!
//! Both are [`KalmanFilter`] instances with a constant-velocity model. The
//! [`Estimator`] trait is the seam callers program against so the session
//! can be exercised with simpler smoothers in tests.

pub mod kalman;

pub use kalman::{KalmanFilter, FilterState};

/// Recursive scalar estimator producing a value and its rate of change
///
/// ## Implementation Guidelines
///
/// 1. **Never panic**: odd `dt` values (zero, negative, huge) are handled,
///    not rejected
/// 2. **Bounded time**: each update is O(1)
/// 3. **Owned state**: an estimator is touched from a single thread only
pub trait Estimator {
    /// Restart from `initial_value` with zero rate and prior covariance
    fn reset(&mut self, initial_value: f64);

    /// Fold in one reading taken `dt` seconds after the previous one
    fn update(&mut self, measurement: f64, measurement_variance: f64, dt: f64);

    /// Current smoothed value
    fn estimate(&self) -> f64;

    /// Current first derivative (units per second)
    fn rate(&self) -> f64;
}
