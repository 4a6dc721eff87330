//! Piecewise-Linear Response Curves
//!
//! ## Motivation
//!
//! A vario's sound is tuned by ear, not derived from a formula. Pilots
//! expect weak lift to already sound clearly different from still air and
//! strong lift to stop getting faster at some point. A handful of control
//! points joined by straight lines captures that shape and is trivial to
//! retune.
//!
//! Two curves drive the beeper:
//! - **Duration**: |vario| → seconds of tone (the following silence is a
//!   fixed fraction of it)
//! - **Frequency**: climb rate → Hz added to the base pitch
//!
//! ## Evaluation
//!
//! ```text
//!   y
//!   │      ●───────●            clamp above the last point
//!   │     ╱
//!   │    ╱
//!   ●───●                       clamp below the first point
//!   └──────────────────── x
//! ```
//!
//! Between two adjacent points `(x0, y0)` and `(x1, y1)`:
//!
//! ```text
//! y = y0 + (y1 - y0) × (x - x0) / (x1 - x0)
//! ```
//!
//! An `x` that hits a control point exactly returns that point's `y`
//! without any arithmetic.
//!
//! ## Storage
//!
//! Points live in a `heapless::Vec` with [`MAX_CURVE_POINTS`] capacity so a
//! curve is a plain value with no allocation.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::constants::audio::{DURATION_CURVE_POINTS, FREQUENCY_CURVE_POINTS, MAX_CURVE_POINTS};
use crate::errors::{CurveError, CurveResult};

/// One `(x, y)` control point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Input coordinate (vario, m/s)
    pub x: f64,
    /// Output value at `x`
    pub y: f64,
}

/// Interpolating function over control points strictly increasing in `x`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseCurve {
    points: Vec<CurvePoint, MAX_CURVE_POINTS>,
}

impl ResponseCurve {
    /// Create an empty curve
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Build a curve from `(x, y)` pairs in increasing `x`
    ///
    /// Fails on an empty slice as well as on any point `add_point` rejects.
    pub fn from_points(points: &[(f64, f64)]) -> CurveResult<Self> {
        if points.is_empty() {
            return Err(CurveError::Empty);
        }

        let mut curve = Self::new();
        for &(x, y) in points {
            curve.add_point(x, y)?;
        }
        Ok(curve)
    }

    /// Default beep duration curve (|vario| m/s → seconds)
    pub fn beep_duration() -> Self {
        Self::from_table(&DURATION_CURVE_POINTS)
    }

    /// Default pitch offset curve (climb m/s → Hz above base)
    pub fn tone_offset() -> Self {
        Self::from_table(&FREQUENCY_CURVE_POINTS)
    }

    /// Build one of the built-in tables; they are covered by tests
    fn from_table(points: &[(f64, f64)]) -> Self {
        let curve = Self::from_points(points);
        debug_assert!(curve.is_ok(), "built-in curve table rejected: {:?}", curve);
        curve.unwrap_or_default()
    }

    /// Append a control point
    ///
    /// `x` must be strictly greater than the last point's `x`.
    pub fn add_point(&mut self, x: f64, y: f64) -> CurveResult<()> {
        if !x.is_finite() || !y.is_finite() {
            return Err(CurveError::NonFinite { x, y });
        }

        if let Some(last) = self.points.last() {
            if x <= last.x {
                return Err(CurveError::NonIncreasing { x, previous: last.x });
            }
        }

        self.points
            .push(CurvePoint { x, y })
            .map_err(|_| CurveError::CapacityExceeded { capacity: MAX_CURVE_POINTS })
    }

    /// Interpolated `y` at `x`, clamped to the boundary points
    ///
    /// An empty curve evaluates to `0.0`. NaN input evaluates to the first
    /// point's `y`.
    pub fn evaluate(&self, x: f64) -> f64 {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };

        if x.is_nan() || x <= first.x {
            return first.y;
        }
        if x >= last.x {
            return last.y;
        }

        // First point with p.x >= x; exists and is > 0 because of the clamps above
        let upper = self.points.partition_point(|p| p.x < x);
        let hi = self.points[upper];
        if hi.x == x {
            return hi.y;
        }
        let lo = self.points[upper - 1];

        let frac = (x - lo.x) / (hi.x - lo.x);
        lo.y + (hi.y - lo.y) * frac
    }

    /// Control points in order
    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Smallest and largest `y` over all points, `None` when empty
    ///
    /// Interpolation never leaves this interval.
    pub fn y_bounds(&self) -> Option<(f64, f64)> {
        let first = self.points.first()?.y;
        Some(self.points.iter().fold((first, first), |(lo, hi), p| (lo.min(p.y), hi.max(p.y))))
    }

    /// Number of control points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when no points have been added
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_outside_domain() {
        let curve = ResponseCurve::from_points(&[(0.0, 2.0), (1.0, 4.0)]).unwrap();
        assert_eq!(curve.evaluate(-10.0), 2.0);
        assert_eq!(curve.evaluate(10.0), 4.0);
        assert_eq!(curve.evaluate(f64::INFINITY), 4.0);
        assert_eq!(curve.evaluate(f64::NEG_INFINITY), 2.0);
    }

    #[test]
    fn exact_points_return_their_y() {
        let curve = ResponseCurve::beep_duration();
        for &(x, y) in DURATION_CURVE_POINTS.iter() {
            assert_eq!(curve.evaluate(x), y);
        }
    }

    #[test]
    fn interpolates_between_points() {
        let curve = ResponseCurve::tone_offset();
        assert!((curve.evaluate(0.125) - 50.0).abs() < 1e-9);
        assert!((curve.evaluate(5.25) - 750.0).abs() < 1e-9);
    }

    #[test]
    fn single_point_is_constant() {
        let curve = ResponseCurve::from_points(&[(1.0, 7.0)]).unwrap();
        assert_eq!(curve.evaluate(0.0), 7.0);
        assert_eq!(curve.evaluate(1.0), 7.0);
        assert_eq!(curve.evaluate(3.0), 7.0);
    }

    #[test]
    fn empty_curve_is_zero() {
        assert_eq!(ResponseCurve::new().evaluate(1.0), 0.0);
        assert_eq!(ResponseCurve::from_points(&[]), Err(CurveError::Empty));
    }

    #[test]
    fn rejects_out_of_order_points() {
        let mut curve = ResponseCurve::new();
        curve.add_point(1.0, 1.0).unwrap();
        assert_eq!(
            curve.add_point(1.0, 2.0),
            Err(CurveError::NonIncreasing { x: 1.0, previous: 1.0 })
        );
        assert!(curve.add_point(0.5, 2.0).is_err());
        assert!(curve.add_point(f64::NAN, 2.0).is_err());
        assert_eq!(curve.len(), 1);
    }

    #[test]
    fn rejects_points_beyond_capacity() {
        let mut curve = ResponseCurve::new();
        for i in 0..MAX_CURVE_POINTS {
            curve.add_point(i as f64, 0.0).unwrap();
        }
        assert_eq!(
            curve.add_point(100.0, 0.0),
            Err(CurveError::CapacityExceeded { capacity: MAX_CURVE_POINTS })
        );
    }

    #[test]
    fn default_curves_are_populated() {
        assert_eq!(ResponseCurve::beep_duration().len(), DURATION_CURVE_POINTS.len());
        assert_eq!(ResponseCurve::tone_offset().len(), FREQUENCY_CURVE_POINTS.len());
    }

    #[test]
    fn built_in_tables_are_valid() {
        assert!(ResponseCurve::from_points(&DURATION_CURVE_POINTS).is_ok());
        assert!(ResponseCurve::from_points(&FREQUENCY_CURVE_POINTS).is_ok());
    }

    #[test]
    #[should_panic(expected = "built-in curve table rejected")]
    #[cfg(debug_assertions)]
    fn broken_table_panics_in_debug() {
        ResponseCurve::from_table(&[(1.0, 0.0), (0.5, 1.0)]);
    }

    #[test]
    fn y_bounds_span_all_points() {
        assert_eq!(ResponseCurve::new().y_bounds(), None);
        assert_eq!(ResponseCurve::beep_duration().y_bounds(), Some((0.05, 0.4763)));
        assert_eq!(ResponseCurve::tone_offset().y_bounds(), Some((0.0, 800.0)));

        let dip = ResponseCurve::from_points(&[(0.0, 3.0), (1.0, -2.0), (2.0, 1.0)]).unwrap();
        assert_eq!(dip.y_bounds(), Some((-2.0, 3.0)));
    }
}
