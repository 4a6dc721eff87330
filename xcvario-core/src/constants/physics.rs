//! Physical Constants for Barometric Altitude
//!
//! The variometer only needs the hypsometric approximation used by common
//! MEMS barometer application notes:
//!
//! ```text
//! h = 44330 × (1 - (P / P₀)^0.19)
//! ```
//!
//! Valid in the troposphere (below ~11 km), which covers free flight.

/// Standard atmospheric pressure at sea level (Pa).
///
/// Reference pressure P₀ for altitude calculations. A QNH-corrected value
/// can be supplied through the config instead.
///
/// Source: International Standard Atmosphere (ISA)
pub const SEA_LEVEL_PRESSURE_PA: f64 = 101_325.0;

/// Scale height factor of the barometric approximation (m).
pub const BAROMETRIC_SCALE_M: f64 = 44_330.0;

/// Exponent of the pressure ratio in the barometric approximation.
///
/// Rounded form of R·L / (g·M) ≈ 1 / 5.255.
pub const BAROMETRIC_EXPONENT: f64 = 0.19;

/// Lowest pressure the conversion accepts as plausible (Pa).
///
/// Roughly the pressure at 12 km; anything lower is a sensor fault for a
/// glider or paraglider.
pub const MIN_PLAUSIBLE_PRESSURE_PA: f64 = 18_000.0;

/// Highest pressure the conversion accepts as plausible (Pa).
///
/// Source: WMO records (Agata, Siberia: 1083.8 hPa) plus margin
pub const MAX_PLAUSIBLE_PRESSURE_PA: f64 = 110_000.0;
