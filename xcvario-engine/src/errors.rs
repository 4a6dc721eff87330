//! Error Types for Tone Synthesis and Playback
//!
//! Three layers, from the bottom up:
//!
//! - [`ToneError`]: a duration/format/frequency combination that cannot be
//!   synthesized. This is a configuration mistake and is caught when the
//!   controller is built or started, never silently truncated.
//! - [`DeviceError`]: the audio output refused a format or failed a write.
//!   There is no retry; the playback loop halts and the caller's next
//!   `start` is the retry.
//! - [`EngineError`]: everything the session surface can return, wrapping
//!   the two above plus core config and filter errors.

use thiserror::Error;

use xcvario_core::{ConfigError, FilterError};

/// Result type for tone generation
pub type ToneResult<T> = Result<T, ToneError>;

/// Result type for audio device operations
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Tone buffer cannot be generated
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneError {
    /// Duration does not cover a whole number of frames
    #[error("{duration_us} µs is not a whole number of {frame_bytes}-byte frames at {sample_rate_hz} Hz")]
    UnalignedDuration {
        /// Requested duration
        duration_us: u64,
        /// Frame size of the format
        frame_bytes: usize,
        /// Sample rate of the format
        sample_rate_hz: u32,
    },

    /// Duration maps to zero bytes
    #[error("Tone duration of {duration_us} µs produces an empty buffer")]
    EmptyBuffer {
        /// Requested duration
        duration_us: u64,
    },

    /// Frequency is zero or at or above the Nyquist limit
    #[error("Tone frequency {frequency_hz} Hz outside (0, {nyquist_hz}) Hz")]
    InvalidFrequency {
        /// Requested frequency
        frequency_hz: u32,
        /// Half the sample rate
        nyquist_hz: u32,
    },

    /// Bit depth or layout the generator does not encode
    #[error("Unsupported sample format: {reason}")]
    UnsupportedFormat {
        /// What is unsupported
        reason: &'static str,
    },
}

/// Audio output failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// Neither the ideal nor the nearest format is usable
    #[error("No usable output format on device '{device}'")]
    FormatUnavailable {
        /// Device name
        device: String,
    },

    /// Device could not be opened
    #[error("Audio device unavailable: {0}")]
    Unavailable(String),

    /// Writing or starting playback failed
    #[error("Audio device write failed: {0}")]
    WriteFailed(String),
}

/// Top-level engine errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Tone synthesis misconfigured
    #[error(transparent)]
    Tone(#[from] ToneError),

    /// Audio output failure
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Rejected sensor reading
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// Controller has no sink left to play on
    #[error("No audio sink attached to the controller")]
    NoSink,

    /// Playback worker could not be spawned or panicked
    #[error("Playback worker failed: {0}")]
    Worker(String),
}
