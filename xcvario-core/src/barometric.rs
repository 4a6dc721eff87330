//! Barometric Altitude
//!
//! ## Physics Background
//!
//! Pressure falls roughly exponentially with height. Over the range a
//! glider or paraglider flies, the approximation
//!
//! ```text
//! h(P) = 44330 × (1 - (P / P₀)^0.19)
//! ```
//!
//! is within a few metres of the full ISA model. The vario never needs the
//! absolute altitude to be right, only its derivative, and a constant
//! `P₀` error shifts `h` without changing `dh/dt` much.
//!
//! ### Local Derivative
//!
//! ```text
//! dh/dt = -44330 × 0.19 × (P / P₀)^(-0.81) / P₀ × dP/dt
//! ```
//!
//! Near sea level a pressure drop of 10 Pa/s is a climb of about 0.83 m/s.
//!
//! ## Usage Example
//!
//! ```rust
//! use xcvario_core::barometric::pressure_to_altitude;
//! use xcvario_core::constants::SEA_LEVEL_PRESSURE_PA;
//!
//! let h = pressure_to_altitude(89_875.0, SEA_LEVEL_PRESSURE_PA).unwrap();
//! assert!((h - 1000.0).abs() < 30.0);
//! ```

use crate::constants::physics::{
    BAROMETRIC_EXPONENT, BAROMETRIC_SCALE_M, MAX_PLAUSIBLE_PRESSURE_PA, MIN_PLAUSIBLE_PRESSURE_PA,
};
use crate::errors::{FilterError, FilterResult};

/// Altitude in metres above the `sea_level_pa` reference
pub fn pressure_to_altitude(pressure_pa: f64, sea_level_pa: f64) -> FilterResult<f64> {
    check_pressure(pressure_pa)?;
    check_pressure(sea_level_pa)?;

    let ratio = pressure_pa / sea_level_pa;
    Ok(BAROMETRIC_SCALE_M * (1.0 - libm::pow(ratio, BAROMETRIC_EXPONENT)))
}

/// Vertical speed (m/s) implied by a pressure rate (Pa/s) at `pressure_pa`
pub fn altitude_rate(pressure_pa: f64, pressure_rate_pa_s: f64, sea_level_pa: f64) -> FilterResult<f64> {
    check_pressure(pressure_pa)?;
    check_pressure(sea_level_pa)?;
    if !pressure_rate_pa_s.is_finite() {
        return Err(FilterError::InvalidMeasurement { value: pressure_rate_pa_s });
    }

    let ratio = pressure_pa / sea_level_pa;
    let dh_dp = -BAROMETRIC_SCALE_M * BAROMETRIC_EXPONENT
        * libm::pow(ratio, BAROMETRIC_EXPONENT - 1.0)
        / sea_level_pa;
    Ok(dh_dp * pressure_rate_pa_s)
}

/// True when the reading lies in the band a flying barometer can report
pub fn is_plausible_pressure(pressure_pa: f64) -> bool {
    (MIN_PLAUSIBLE_PRESSURE_PA..=MAX_PLAUSIBLE_PRESSURE_PA).contains(&pressure_pa)
}

fn check_pressure(pressure_pa: f64) -> FilterResult<()> {
    if !pressure_pa.is_finite() {
        return Err(FilterError::InvalidMeasurement { value: pressure_pa });
    }
    if pressure_pa <= 0.0 {
        return Err(FilterError::NonPositivePressure { pressure_pa });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SEA_LEVEL_PRESSURE_PA;

    #[test]
    fn sea_level_is_zero() {
        let h = pressure_to_altitude(SEA_LEVEL_PRESSURE_PA, SEA_LEVEL_PRESSURE_PA).unwrap();
        assert_eq!(h, 0.0);
    }

    #[test]
    fn lower_pressure_is_higher() {
        let low = pressure_to_altitude(95_000.0, SEA_LEVEL_PRESSURE_PA).unwrap();
        let high = pressure_to_altitude(80_000.0, SEA_LEVEL_PRESSURE_PA).unwrap();
        assert!(low > 0.0);
        assert!(high > low);
    }

    #[test]
    fn rate_matches_finite_difference() {
        let p = 95_000.0;
        let dp = 0.5;
        let h0 = pressure_to_altitude(p, SEA_LEVEL_PRESSURE_PA).unwrap();
        let h1 = pressure_to_altitude(p - dp, SEA_LEVEL_PRESSURE_PA).unwrap();
        let rate = altitude_rate(p, -dp, SEA_LEVEL_PRESSURE_PA).unwrap();
        assert!((rate - (h1 - h0)).abs() < 1e-5);
        assert!(rate > 0.0);
    }

    #[test]
    fn ten_pascal_per_second_near_sea_level() {
        let rate = altitude_rate(SEA_LEVEL_PRESSURE_PA, -10.0, SEA_LEVEL_PRESSURE_PA).unwrap();
        assert!((rate - 0.8312).abs() < 1e-3, "rate = {rate}");
    }

    #[test]
    fn rejects_bad_pressure() {
        assert_eq!(
            pressure_to_altitude(0.0, SEA_LEVEL_PRESSURE_PA),
            Err(FilterError::NonPositivePressure { pressure_pa: 0.0 })
        );
        assert!(matches!(
            pressure_to_altitude(f64::NAN, SEA_LEVEL_PRESSURE_PA),
            Err(FilterError::InvalidMeasurement { .. })
        ));
        assert!(!is_plausible_pressure(500.0));
        assert!(is_plausible_pressure(SEA_LEVEL_PRESSURE_PA));
    }
}
