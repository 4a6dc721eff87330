//! Engine Configuration
//!
//! Every tunable of the variometer lives in one serde-friendly struct that is
//! passed by value at construction. Nothing here is process-wide, so several
//! engines (e.g. one per test) never interfere.
//!
//! Missing fields fall back to the defaults in [`crate::constants`]:
//!
//! ```rust
//! use xcvario_core::config::VarioConfig;
//!
//! let config = VarioConfig::from_json_str(r#"{ "base_tone_hz": 800 }"#).unwrap();
//! assert_eq!(config.base_tone_hz, 800);
//! assert_eq!(config.beep.dead_band, 0.25);
//! ```

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::audio::{
    DEFAULT_BASE_TONE_HZ, DEFAULT_DEAD_BAND_M_S, DEFAULT_IDLE_POLL_MS, DEFAULT_SILENCE_RATIO,
    DEFAULT_VARIO_EPSILON, DEFAULT_VOLUME_PERCENT, MAX_BEEP_DURATION_S, MAX_TONE_OFFSET_HZ,
    MIN_BEEP_DURATION_S,
};
use crate::constants::filter::{
    DEFAULT_INITIAL_VARIANCE, DEFAULT_MEASUREMENT_VARIANCE, DEFAULT_PROCESS_VARIANCE,
};
use crate::constants::physics::SEA_LEVEL_PRESSURE_PA;
use crate::curve::ResponseCurve;
use crate::errors::{ConfigError, ConfigResult};
use crate::format::AudioFormatSpec;

/// Pitch used for sink tones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkTone {
    /// Sink beeps at the base pitch; descent rate is heard as cadence only
    #[default]
    BaseFrequency,
    /// Sink beeps use the frequency curve on |vario|, like climb
    Scaled,
    /// No tone while sinking
    Silent,
}

/// Kalman noise parameters shared by the pressure and altitude filters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Acceleration noise variance
    pub process_variance: f64,
    /// Per-reading noise variance
    pub measurement_variance: f64,
    /// Prior covariance on reset
    pub initial_variance: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            process_variance: DEFAULT_PROCESS_VARIANCE,
            measurement_variance: DEFAULT_MEASUREMENT_VARIANCE,
            initial_variance: DEFAULT_INITIAL_VARIANCE,
        }
    }
}

/// Beep scheduling parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeepConfig {
    /// |vario| below which the beeper stays silent (m/s)
    pub dead_band: f64,
    /// Vario changes smaller than this are ignored (m/s)
    pub vario_epsilon: f64,
    /// Silence length as a fraction of the tone length
    pub silence_ratio: f64,
    /// Re-check interval inside the dead-band (ms)
    pub idle_poll_ms: u64,
    /// Sink pitch policy
    pub sink_tone: SinkTone,
    /// Initial volume (percent)
    pub volume_percent: u8,
    /// Replacement duration curve points
    pub duration_curve: Option<Vec<(f64, f64)>>,
    /// Replacement frequency offset curve points
    pub frequency_curve: Option<Vec<(f64, f64)>>,
}

impl Default for BeepConfig {
    fn default() -> Self {
        Self {
            dead_band: DEFAULT_DEAD_BAND_M_S,
            vario_epsilon: DEFAULT_VARIO_EPSILON,
            silence_ratio: DEFAULT_SILENCE_RATIO,
            idle_poll_ms: DEFAULT_IDLE_POLL_MS,
            sink_tone: SinkTone::default(),
            volume_percent: DEFAULT_VOLUME_PERCENT,
            duration_curve: None,
            frequency_curve: None,
        }
    }
}

impl BeepConfig {
    /// Duration curve, overridden or default
    ///
    /// Override values must lie in `[MIN_BEEP_DURATION_S, MAX_BEEP_DURATION_S]`.
    pub fn duration_curve(&self) -> ConfigResult<ResponseCurve> {
        match &self.duration_curve {
            Some(points) => {
                let curve = ResponseCurve::from_points(points)
                    .map_err(|source| ConfigError::Curve { field: "duration_curve", source })?;
                check_curve_range("beep.duration_curve", &curve, MIN_BEEP_DURATION_S, MAX_BEEP_DURATION_S)?;
                Ok(curve)
            }
            None => Ok(ResponseCurve::beep_duration()),
        }
    }

    /// Frequency offset curve, overridden or default
    ///
    /// Override values must lie in `[0, MAX_TONE_OFFSET_HZ]`.
    pub fn frequency_curve(&self) -> ConfigResult<ResponseCurve> {
        match &self.frequency_curve {
            Some(points) => {
                let curve = ResponseCurve::from_points(points)
                    .map_err(|source| ConfigError::Curve { field: "frequency_curve", source })?;
                check_curve_range("beep.frequency_curve", &curve, 0.0, MAX_TONE_OFFSET_HZ)?;
                Ok(curve)
            }
            None => Ok(ResponseCurve::tone_offset()),
        }
    }
}

/// Complete variometer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VarioConfig {
    /// Pitch of zero-climb and sink tones (Hz)
    pub base_tone_hz: u32,
    /// Reference pressure for altitude (Pa)
    pub sea_level_pa: f64,
    /// Filter noise parameters
    pub filter: FilterConfig,
    /// Beep scheduling
    pub beep: BeepConfig,
    /// Ideal output format; the device may negotiate a different one
    pub audio: AudioFormatSpec,
}

impl Default for VarioConfig {
    fn default() -> Self {
        Self {
            base_tone_hz: DEFAULT_BASE_TONE_HZ,
            sea_level_pa: SEA_LEVEL_PRESSURE_PA,
            filter: FilterConfig::default(),
            beep: BeepConfig::default(),
            audio: AudioFormatSpec::default(),
        }
    }
}

impl VarioConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        debug!("Loaded vario config from {}", path.display());
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json_string(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every option against its accepted range
    pub fn validate(&self) -> ConfigResult<()> {
        check_range("base_tone_hz", f64::from(self.base_tone_hz), 20.0, 20_000.0)?;
        check_range("sea_level_pa", self.sea_level_pa, 80_000.0, 110_000.0)?;

        check_range("filter.process_variance", self.filter.process_variance, 0.0, 1.0e3)?;
        check_range("filter.measurement_variance", self.filter.measurement_variance, 0.0, 1.0e3)?;
        check_range("filter.initial_variance", self.filter.initial_variance, 0.0, 1.0e9)?;

        check_range("beep.dead_band", self.beep.dead_band, 0.0, 5.0)?;
        check_range("beep.vario_epsilon", self.beep.vario_epsilon, 0.0, 1.0)?;
        check_range("beep.silence_ratio", self.beep.silence_ratio, 0.0, 10.0)?;
        check_range("beep.idle_poll_ms", self.beep.idle_poll_ms as f64, 1.0, 1_000.0)?;
        check_range("beep.volume_percent", f64::from(self.beep.volume_percent), 0.0, 100.0)?;

        self.beep.duration_curve()?;
        self.beep.frequency_curve()?;
        self.audio.validate()?;
        Ok(())
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> ConfigResult<()> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value, min, max })
    }
}

fn check_curve_range(field: &'static str, curve: &ResponseCurve, min: f64, max: f64) -> ConfigResult<()> {
    if let Some((lo, hi)) = curve.y_bounds() {
        check_range(field, lo, min, max)?;
        check_range(field, hi, min, max)?;
    }
    Ok(())
}
