//! PCM Output Format Descriptor
//!
//! Describes the sample layout the tone generator writes and the output
//! device consumes. Only integer PCM in 8 or 16 bits is supported; those are
//! the layouts every phone and desktop audio stack offers.

use serde::{Deserialize, Serialize};

use crate::constants::audio::{DEFAULT_BITS_PER_SAMPLE, DEFAULT_CHANNEL_COUNT, DEFAULT_SAMPLE_RATE_HZ};
use crate::errors::{ConfigError, ConfigResult};

const MICROS_PER_SECOND: u64 = 1_000_000;

/// Integer sample encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signedness {
    /// Two's complement, silence at 0
    Signed,
    /// Offset binary, silence at mid-scale
    Unsigned,
}

/// Byte order of multi-byte samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    /// Least significant byte first
    Little,
    /// Most significant byte first
    Big,
}

/// Negotiated PCM format, fixed for the lifetime of an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioFormatSpec {
    /// Frames per second
    pub sample_rate_hz: u32,
    /// Interleaved channels per frame
    pub channel_count: u16,
    /// 8 or 16
    pub bits_per_sample: u16,
    /// Sample encoding
    pub signedness: Signedness,
    /// Byte order for 16-bit samples
    pub byte_order: ByteOrder,
}

impl Default for AudioFormatSpec {
    /// 44.1 kHz, mono, 16-bit signed little-endian
    fn default() -> Self {
        Self {
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            channel_count: DEFAULT_CHANNEL_COUNT,
            bits_per_sample: DEFAULT_BITS_PER_SAMPLE,
            signedness: Signedness::Signed,
            byte_order: ByteOrder::Little,
        }
    }
}

impl AudioFormatSpec {
    /// Bytes in one sample of one channel
    pub fn bytes_per_sample(&self) -> usize {
        usize::from(self.bits_per_sample / 8)
    }

    /// Bytes in one frame (one sample for every channel)
    pub fn bytes_per_frame(&self) -> usize {
        self.bytes_per_sample() * usize::from(self.channel_count)
    }

    /// Bytes of audio per second
    pub fn bytes_per_second(&self) -> u64 {
        u64::from(self.sample_rate_hz) * self.bytes_per_frame() as u64
    }

    /// Smallest duration in µs that covers a whole number of frames
    ///
    /// Any multiple of this duration passes the tone generator's
    /// divisibility check. 10 ms at 44.1 kHz, 125 µs at 8 kHz.
    pub fn duration_quantum_us(&self) -> u64 {
        let rate = u64::from(self.sample_rate_hz.max(1));
        MICROS_PER_SECOND / gcd(rate, MICROS_PER_SECOND)
    }

    /// Round `duration_us` to the nearest non-zero whole-frame duration
    pub fn align_duration_us(&self, duration_us: u64) -> u64 {
        let quantum = self.duration_quantum_us();
        let units = (duration_us + quantum / 2) / quantum;
        units.max(1) * quantum
    }

    /// True for the layouts the tone generator can encode
    pub fn is_supported(&self) -> bool {
        self.validate().is_ok()
    }

    /// Check the format can be synthesized
    pub fn validate(&self) -> ConfigResult<()> {
        if self.sample_rate_hz == 0 {
            return Err(ConfigError::UnsupportedFormat { reason: "sample rate is zero" });
        }
        if self.channel_count == 0 {
            return Err(ConfigError::UnsupportedFormat { reason: "channel count is zero" });
        }
        if self.bits_per_sample != 8 && self.bits_per_sample != 16 {
            return Err(ConfigError::UnsupportedFormat { reason: "only 8 or 16 bits per sample" });
        }
        Ok(())
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}
