//! Constant-Velocity Kalman Filter
//!
//! ## Overview
//!
//! A two-state filter tracking a scalar value `x` and its rate `v` from
//! measurements of `x` alone. Process noise is modelled as a white
//! acceleration with variance `q`, which is the natural model for a
//! barometer carried by a pilot: altitude and climb rate are smooth, and
//! any change in climb rate comes from an (unknown) acceleration.
//!
//! ## Equations
//!
//! ### 1. Prediction Step
//! ```text
//! x  ← x + v·dt
//! Pxx ← Pxx + 2·dt·Pxv + dt²·Pvv + q·dt⁴/4
//! Pxv ← Pxv + dt·Pvv + q·dt³/2
//! Pvv ← Pvv + q·dt²
//! ```
//!
//! ### 2. Update Step
//! ```text
//! y  = z - x                       innovation
//! S  = Pxx + R                     innovation variance
//! Kx = Pxx / S,  Kv = Pxv / S      Kalman gains
//! x ← x + Kx·y,  v ← v + Kv·y
//! Pvv ← Pvv - Kv·Pxv
//! Pxv ← Pxv·(1 - Kx)
//! Pxx ← Pxx·(1 - Kx)
//! ```
//!
//! Written out by hand instead of with matrices: with two states the
//! scalar form is short, allocation free and keeps every term visible.
//!
//! ## Edge Cases
//!
//! - `dt == 0` (two readings in the same tick): prediction is skipped, the
//!   measurement is still folded in
//! - `dt < 0` or NaN: treated as zero
//! - very large `dt`: clamped to [`MAX_PREDICT_INTERVAL_S`] so `dt⁴` stays
//!   finite
//!
//! ## Usage Example
//!
//! ```rust
//! use xcvario_core::filter::{Estimator, KalmanFilter};
//!
//! let mut altitude = KalmanFilter::new(0.0075);
//! altitude.reset(0.0);
//! for step in 1..=50 {
//!     altitude.update(step as f64 * 2.0, 0.05, 1.0);
//! }
//! assert!((altitude.rate() - 2.0).abs() < 0.1);
//! ```

#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

use crate::constants::filter::{DEFAULT_INITIAL_VARIANCE, MAX_PREDICT_INTERVAL_S};

use super::Estimator;

/// Snapshot of the filter's state vector and main variances
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterState {
    /// Smoothed value
    pub estimate: f64,
    /// Smoothed first derivative
    pub velocity: f64,
    /// Acceleration noise variance (tuning constant)
    pub process_variance: f64,
    /// Variance of `estimate`
    pub estimate_variance: f64,
}

/// Kalman filter over `[value, rate]`
#[derive(Debug, Clone)]
pub struct KalmanFilter {
    x: f64,
    v: f64,
    /// Acceleration noise variance
    q: f64,
    p_xx: f64,
    p_xv: f64,
    p_vv: f64,
    /// Covariance assigned on reset
    initial_variance: f64,
    /// Updates seen since reset with dt > 0
    timed_updates: u32,
}

impl KalmanFilter {
    /// Create a filter with the given acceleration noise variance
    ///
    /// Starts at zero; call [`Estimator::reset`] with the first reading.
    pub fn new(process_variance: f64) -> Self {
        Self::with_initial_variance(process_variance, DEFAULT_INITIAL_VARIANCE)
    }

    /// Create a filter with a custom prior covariance
    pub fn with_initial_variance(process_variance: f64, initial_variance: f64) -> Self {
        let mut filter = Self {
            x: 0.0,
            v: 0.0,
            q: process_variance.max(0.0),
            p_xx: 0.0,
            p_xv: 0.0,
            p_vv: 0.0,
            initial_variance: initial_variance.max(0.0),
            timed_updates: 0,
        };
        filter.reset(0.0);
        filter
    }

    /// Current state vector and variances
    pub fn state(&self) -> FilterState {
        FilterState {
            estimate: self.x,
            velocity: self.v,
            process_variance: self.q,
            estimate_variance: self.p_xx,
        }
    }

    /// Variance of the rate estimate
    pub fn velocity_variance(&self) -> f64 {
        self.p_vv
    }

    /// True once the rate has been informed by at least one timed update
    pub fn has_rate(&self) -> bool {
        self.timed_updates > 0
    }

    /// Propagate state and covariance forward by `dt` seconds
    fn predict(&mut self, dt: f64) {
        let dt2 = dt * dt;
        let dt3 = dt2 * dt;
        let dt4 = dt3 * dt;

        self.x += self.v * dt;

        self.p_xx += 2.0 * dt * self.p_xv + dt2 * self.p_vv + self.q * dt4 / 4.0;
        self.p_xv += dt * self.p_vv + self.q * dt3 / 2.0;
        self.p_vv += self.q * dt2;
    }

    /// Fold a measurement into the predicted state
    fn correct(&mut self, measurement: f64, measurement_variance: f64) {
        let innovation = measurement - self.x;
        let innovation_variance = self.p_xx + measurement_variance;

        // Zero prior and zero noise: nothing to weigh, take the reading
        if innovation_variance <= 0.0 {
            self.x = measurement;
            return;
        }

        let k_x = self.p_xx / innovation_variance;
        let k_v = self.p_xv / innovation_variance;

        self.x += k_x * innovation;
        self.v += k_v * innovation;

        self.p_vv -= k_v * self.p_xv;
        self.p_xv *= 1.0 - k_x;
        self.p_xx *= 1.0 - k_x;

        // Rounding can leave tiny negatives
        self.p_xx = self.p_xx.max(0.0);
        self.p_vv = self.p_vv.max(0.0);
    }
}

/// Map any `dt` onto the interval the predictor can handle
fn sanitize_dt(dt: f64) -> f64 {
    if dt.is_nan() || dt <= 0.0 {
        0.0
    } else if dt > MAX_PREDICT_INTERVAL_S {
        log_warn!("Predict interval {} s clamped to {} s", dt, MAX_PREDICT_INTERVAL_S);
        MAX_PREDICT_INTERVAL_S
    } else {
        dt
    }
}

impl Estimator for KalmanFilter {
    fn reset(&mut self, initial_value: f64) {
        self.x = initial_value;
        self.v = 0.0;
        self.p_xx = self.initial_variance;
        self.p_xv = 0.0;
        self.p_vv = self.initial_variance;
        self.timed_updates = 0;
    }

    fn update(&mut self, measurement: f64, measurement_variance: f64, dt: f64) {
        let dt = sanitize_dt(dt);
        if dt > 0.0 {
            self.predict(dt);
            self.timed_updates = self.timed_updates.saturating_add(1);
        }
        self.correct(measurement, measurement_variance.max(0.0));
    }

    fn estimate(&self) -> f64 {
        self.x
    }

    fn rate(&self) -> f64 {
        self.v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_restores_value_and_zero_rate() {
        let mut kf = KalmanFilter::new(0.0075);
        kf.update(12.0, 0.05, 1.0);
        kf.update(15.0, 0.05, 1.0);

        kf.reset(101_325.0);
        assert_eq!(kf.estimate(), 101_325.0);
        assert_eq!(kf.rate(), 0.0);
        assert!(!kf.has_rate());
        assert_eq!(kf.state().estimate_variance, DEFAULT_INITIAL_VARIANCE);
    }

    #[test]
    fn zero_dt_skips_prediction() {
        let mut kf = KalmanFilter::new(0.0075);
        kf.reset(10.0);
        kf.update(10.0, 0.05, 0.0);

        assert_eq!(kf.rate(), 0.0);
        assert!(!kf.has_rate());
        assert!(kf.state().estimate_variance < DEFAULT_INITIAL_VARIANCE);
    }

    #[test]
    fn negative_and_nan_dt_behave_like_zero() {
        let mut a = KalmanFilter::new(0.0075);
        let mut b = KalmanFilter::new(0.0075);
        let mut c = KalmanFilter::new(0.0075);
        for kf in [&mut a, &mut b, &mut c] {
            kf.reset(5.0);
        }

        a.update(6.0, 0.05, 0.0);
        b.update(6.0, 0.05, -3.0);
        c.update(6.0, 0.05, f64::NAN);

        assert_eq!(a.state(), b.state());
        assert_eq!(a.state(), c.state());
    }

    #[test]
    fn huge_dt_stays_finite() {
        let mut kf = KalmanFilter::new(0.0075);
        kf.reset(0.0);
        kf.update(1.0, 0.05, 1.0);
        kf.update(2.0, 0.05, 1.0e300);

        let state = kf.state();
        assert!(state.estimate.is_finite());
        assert!(state.velocity.is_finite());
        assert!(state.estimate_variance.is_finite());
        assert!(state.estimate_variance >= 0.0);
    }

    #[test]
    fn tracks_constant_rate() {
        let mut kf = KalmanFilter::new(0.0075);
        kf.reset(0.0);

        for step in 1..=200 {
            kf.update(step as f64 * -1.5, 0.05, 1.0);
        }

        assert!((kf.rate() + 1.5).abs() < 0.01, "rate = {}", kf.rate());
        assert!((kf.estimate() + 300.0).abs() < 0.1);
    }

    #[test]
    fn zero_noise_takes_measurement() {
        let mut kf = KalmanFilter::with_initial_variance(0.0, 0.0);
        kf.reset(1.0);
        kf.update(4.0, 0.0, 0.0);
        assert_eq!(kf.estimate(), 4.0);
    }
}
