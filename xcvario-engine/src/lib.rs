//! Audio engine for XcVario
//!
//! Synthesizes beep tones and schedules them on an audio output from a
//! continuously updated vertical speed. The platform audio backend plugs in
//! through [`audio::AudioDevice`]; [`audio::MemoryDevice`] records calls
//! instead of playing sound.
//!
//! ```no_run
//! use xcvario_core::VarioConfig;
//! use xcvario_engine::{audio::MemoryDevice, VarioSession};
//!
//! let device = MemoryDevice::new();
//! let mut session = VarioSession::open(&device, VarioConfig::default()).unwrap();
//! session.start().unwrap();
//!
//! // On every sensor callback
//! session.feed_measurement(Some(101_300.0), 0.1).unwrap();
//!
//! session.stop().unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod audio;
pub mod beep;
pub mod errors;
pub mod session;

// Public API
pub use beep::{BeepController, BeepPlan, BeepSession, TonePlanner};
pub use errors::{DeviceError, DeviceResult, EngineError, EngineResult, ToneError, ToneResult};
pub use session::{VarioReading, VarioSession};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
