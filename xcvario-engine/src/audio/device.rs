//! Audio Output Seam
//!
//! The engine never talks to a platform audio API directly. A backend
//! implements two traits:
//!
//! - [`AudioDevice`]: answers format questions and opens a sink. Lives on
//!   the caller's thread.
//! - [`AudioSink`]: an opened output that plays [`ToneStream`]s. Moved into
//!   the playback worker and touched by nobody else while playing.
//!
//! ## Format Negotiation
//!
//! ```text
//! ideal format ──supported?──yes──→ use it
//!      │
//!      no
//!      ↓
//! device.nearest_format ──supported and 8/16-bit?──yes──→ use it (warn)
//!      │
//!      no
//!      ↓
//! DeviceError::FormatUnavailable
//! ```

use log::{debug, warn};

use xcvario_core::AudioFormatSpec;

use crate::audio::tone::ToneStream;
use crate::errors::{DeviceError, DeviceResult};

/// An opened audio output
pub trait AudioSink: Send {
    /// Begin playing `stream` from its cursor, replacing whatever played before
    fn start(&mut self, stream: ToneStream) -> DeviceResult<()>;

    /// Pause output, keeping the current stream
    fn suspend(&mut self) -> DeviceResult<()>;

    /// Stop output and release the current stream
    fn stop(&mut self) -> DeviceResult<()>;

    /// Set linear gain in `0.0..=1.0`
    fn set_volume(&mut self, gain: f32) -> DeviceResult<()>;
}

/// A platform output device
pub trait AudioDevice {
    /// Human readable device name
    fn name(&self) -> &str;

    /// True when the device plays `format` natively
    fn is_format_supported(&self, format: &AudioFormatSpec) -> bool;

    /// Closest format the device offers, if any
    fn nearest_format(&self, format: &AudioFormatSpec) -> Option<AudioFormatSpec>;

    /// Open an output sink in `format`
    fn open(&self, format: AudioFormatSpec) -> DeviceResult<Box<dyn AudioSink>>;
}

/// Pick the format to open `device` with
pub fn negotiate_format(device: &dyn AudioDevice, ideal: &AudioFormatSpec) -> DeviceResult<AudioFormatSpec> {
    if ideal.is_supported() && device.is_format_supported(ideal) {
        debug!("Device '{}' accepts {:?}", device.name(), ideal);
        return Ok(*ideal);
    }

    warn!("Default format not supported by '{}' - trying nearest", device.name());

    match device.nearest_format(ideal) {
        Some(nearest) if nearest.is_supported() && device.is_format_supported(&nearest) => {
            warn!("Falling back to {:?}", nearest);
            Ok(nearest)
        }
        _ => Err(DeviceError::FormatUnavailable { device: device.name().to_string() }),
    }
}

/// Negotiate a format and open a sink in it
pub fn open_sink(
    device: &dyn AudioDevice,
    ideal: &AudioFormatSpec,
) -> DeviceResult<(AudioFormatSpec, Box<dyn AudioSink>)> {
    let format = negotiate_format(device, ideal)?;
    let sink = device.open(format)?;
    Ok((format, sink))
}
