//! Variometer Session
//!
//! Owns everything between the pressure sensor and the speaker:
//!
//! ```text
//! raw pressure ─→ pressure filter ─→ h(P) ─→ altitude filter ─→ vario
//!                                                                  │
//!                                                    BeepController::set_vario
//! ```
//!
//! The session lives on the thread delivering sensor readings. Only the
//! vario scalar crosses into the playback worker.
//!
//! ```rust
//! use xcvario_core::VarioConfig;
//! use xcvario_engine::audio::MemoryDevice;
//! use xcvario_engine::session::VarioSession;
//!
//! let device = MemoryDevice::new();
//! let mut session = VarioSession::open(&device, VarioConfig::default()).unwrap();
//!
//! let reading = session.feed_measurement(Some(101_325.0), 0.1).unwrap().unwrap();
//! assert_eq!(reading.pressure_pa, 101_325.0);
//! assert!(session.feed_measurement(None, 0.1).unwrap().is_none());
//! ```

use log::{debug, info, warn};
use serde::Serialize;

use xcvario_core::barometric::{is_plausible_pressure, pressure_to_altitude};
use xcvario_core::{AudioFormatSpec, Estimator, KalmanFilter, VarioConfig};

use crate::audio::device::{open_sink, AudioDevice};
use crate::beep::{BeepController, BeepSession};
use crate::errors::{EngineError, EngineResult};

/// Filter output for one accepted reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VarioReading {
    /// Smoothed pressure
    pub pressure_pa: f64,
    /// Smoothed altitude above the reference pressure
    pub altitude_m: f64,
    /// Smoothed vertical speed, positive climbing
    pub vario_m_s: f64,
    /// Interval this reading covered
    pub dt_s: f64,
}

/// Sensor filters plus beeper with an explicit start/stop lifecycle
pub struct VarioSession {
    config: VarioConfig,
    format: AudioFormatSpec,
    pressure: KalmanFilter,
    altitude: KalmanFilter,
    active: bool,
    last: Option<VarioReading>,
    beeper: BeepController,
}

impl VarioSession {
    /// Validate `config`, negotiate a format on `device` and open it
    ///
    /// Fails when no usable format exists; there is no playback without one.
    pub fn open(device: &dyn AudioDevice, config: VarioConfig) -> EngineResult<Self> {
        config.validate()?;
        let (format, sink) = open_sink(device, &config.audio)?;
        info!("Opened audio device '{}' at {} Hz", device.name(), format.sample_rate_hz);

        let beeper = BeepController::new(sink, format, &config)?;
        let filter = config.filter;

        Ok(Self {
            pressure: KalmanFilter::with_initial_variance(filter.process_variance, filter.initial_variance),
            altitude: KalmanFilter::with_initial_variance(filter.process_variance, filter.initial_variance),
            config,
            format,
            active: false,
            last: None,
            beeper,
        })
    }

    /// Reset both filters to a known pressure
    pub fn activate(&mut self, initial_pressure_pa: f64) -> EngineResult<()> {
        let altitude = pressure_to_altitude(initial_pressure_pa, self.config.sea_level_pa)?;
        self.pressure.reset(initial_pressure_pa);
        self.altitude.reset(altitude);
        self.active = true;
        self.last = Some(VarioReading {
            pressure_pa: initial_pressure_pa,
            altitude_m: altitude,
            vario_m_s: 0.0,
            dt_s: 0.0,
        });
        self.beeper.set_vario(0.0, 0.0);
        debug!("Session activated at {:.1} Pa ({:.1} m)", initial_pressure_pa, altitude);
        Ok(())
    }

    /// Incorporate one sensor reading taken `dt` seconds after the previous
    ///
    /// `None` means the sensor had nothing this cycle: estimates are held
    /// and `Ok(None)` is returned. An unusable value is rejected before any
    /// filter state changes. The first accepted reading activates the
    /// session.
    pub fn feed_measurement(&mut self, measurement: Option<f64>, dt: f64) -> EngineResult<Option<VarioReading>> {
        let Some(pressure_pa) = measurement else {
            warn!("Pressure reading unavailable, holding last estimate");
            return Ok(None);
        };

        // Validates the reading before anything is mutated
        pressure_to_altitude(pressure_pa, self.config.sea_level_pa)?;
        if !is_plausible_pressure(pressure_pa) {
            warn!("Implausible pressure {:.1} Pa", pressure_pa);
        }

        if !self.active {
            self.activate(pressure_pa)?;
            return Ok(self.last);
        }

        let variance = self.config.filter.measurement_variance;
        self.pressure.update(pressure_pa, variance, dt);

        let altitude_m = pressure_to_altitude(self.pressure.estimate(), self.config.sea_level_pa)?;
        self.altitude.update(altitude_m, variance, dt);

        let reading = VarioReading {
            pressure_pa: self.pressure.estimate(),
            altitude_m: self.altitude.estimate(),
            vario_m_s: self.altitude.rate(),
            dt_s: dt,
        };
        self.beeper.set_vario(reading.vario_m_s, dt);
        self.last = Some(reading);
        Ok(Some(reading))
    }

    /// Start beeping
    pub fn start(&mut self) -> EngineResult<()> {
        self.beeper.start()
    }

    /// Stop beeping; safe when not started
    pub fn stop(&mut self) -> EngineResult<()> {
        self.beeper.stop()
    }

    /// Volume in percent, clamped to 100
    pub fn set_volume(&mut self, percent: u8) {
        self.beeper.set_volume(percent);
    }

    /// Smoothed pressure, `None` before the first reading
    pub fn pressure(&self) -> Option<f64> {
        self.last.map(|r| r.pressure_pa)
    }

    /// Smoothed altitude, `None` before the first reading
    pub fn altitude(&self) -> Option<f64> {
        self.last.map(|r| r.altitude_m)
    }

    /// Smoothed vertical speed; zero before the first reading
    pub fn vario(&self) -> f64 {
        self.last.map_or(0.0, |r| r.vario_m_s)
    }

    /// Most recent reading
    pub fn last_reading(&self) -> Option<VarioReading> {
        self.last
    }

    /// True once a pressure reference has been set
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// True while the beeper plays
    pub fn is_running(&self) -> bool {
        self.beeper.is_running()
    }

    /// Beeper playback state
    pub fn snapshot(&self) -> BeepSession {
        self.beeper.snapshot()
    }

    /// Failure that halted the beeper, if any
    pub fn last_error(&self) -> Option<EngineError> {
        self.beeper.last_error()
    }

    /// Format negotiated with the device
    pub fn format(&self) -> AudioFormatSpec {
        self.format
    }

    /// Configuration the session was opened with
    pub fn config(&self) -> &VarioConfig {
        &self.config
    }
}
