//! Precomputed Sine Tone Buffers
//!
//! ## Overview
//!
//! A beep is a short sine burst at a fixed pitch. Instead of computing
//! samples in the audio callback, the whole burst is synthesized once into a
//! [`ToneBuffer`] and handed to the output device as a [`ToneStream`], which
//! loops over the buffer until it is replaced. Synthesis costs a few hundred
//! microseconds per beep; the device side is a `memcpy`.
//!
//! ## Buffer Size
//!
//! ```text
//! bytes = sample_rate × channels × bytes_per_sample × duration_us / 1_000_000
//! ```
//!
//! The product must divide evenly and land on a frame boundary, otherwise
//! generation fails with [`ToneError::UnalignedDuration`].
//! [`AudioFormatSpec::align_duration_us`] rounds any duration to a valid one.
//!
//! ## Sample Encoding
//!
//! For frame `i` the amplitude is
//!
//! ```text
//! x = sin(2π · f · (i mod sample_rate) / sample_rate)
//! ```
//!
//! quantized per format:
//!
//! ```text
//! Format       Value              Silence
//! ------------------------------------------
//! u8           (1 + x) / 2 × 255   127
//! i8           x × 127             0
//! u16          (1 + x) / 2 × 65535 32767
//! i16          x × 32767           0
//! ```
//!
//! Every channel of a frame carries the same sample.

use std::io;

use xcvario_core::{AudioFormatSpec, ByteOrder, Signedness};

use crate::errors::{ToneError, ToneResult};

const MICROS_PER_SECOND: u64 = 1_000_000;

/// One synthesized beep, owned by whoever plays it
#[derive(Debug, Clone, PartialEq)]
pub struct ToneBuffer {
    format: AudioFormatSpec,
    duration_us: u64,
    frequency_hz: u32,
    data: Vec<u8>,
}

impl ToneBuffer {
    /// Synthesize `duration_us` of a sine at `frequency_hz` in `format`
    pub fn generate(format: AudioFormatSpec, duration_us: u64, frequency_hz: u32) -> ToneResult<Self> {
        let len = buffer_len(&format, duration_us)?;

        let nyquist_hz = format.sample_rate_hz / 2;
        if frequency_hz == 0 || frequency_hz >= nyquist_hz {
            return Err(ToneError::InvalidFrequency { frequency_hz, nyquist_hz });
        }

        let sample_bytes = format.bytes_per_sample();
        let frame_bytes = format.bytes_per_frame();
        let sample_rate = u64::from(format.sample_rate_hz);
        let step = 2.0 * core::f64::consts::PI * f64::from(frequency_hz) / sample_rate as f64;

        let mut data = vec![0u8; len];
        for (index, frame) in data.chunks_exact_mut(frame_bytes).enumerate() {
            let phase = (index as u64 % sample_rate) as f64;
            let x = libm::sin(step * phase);
            for sample in frame.chunks_exact_mut(sample_bytes) {
                encode_sample(&format, x, sample);
            }
        }

        Ok(Self { format, duration_us, frequency_hz, data })
    }

    /// Format the samples are encoded in
    pub fn format(&self) -> AudioFormatSpec {
        self.format
    }

    /// Tone length in microseconds
    pub fn duration_us(&self) -> u64 {
        self.duration_us
    }

    /// Tone pitch
    pub fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }

    /// Raw PCM bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Buffer length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false for a generated buffer
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Wrap in a looping read cursor starting at byte 0
    pub fn into_stream(self) -> ToneStream {
        ToneStream { buffer: self, pos: 0 }
    }
}

/// Byte length for `duration_us` of audio in `format`
pub fn buffer_len(format: &AudioFormatSpec, duration_us: u64) -> ToneResult<usize> {
    if !format.is_supported() {
        return Err(ToneError::UnsupportedFormat { reason: "only 8 or 16-bit PCM with at least one channel" });
    }

    let frame_bytes = format.bytes_per_frame();
    let unaligned = ToneError::UnalignedDuration {
        duration_us,
        frame_bytes,
        sample_rate_hz: format.sample_rate_hz,
    };

    let total = u128::from(format.bytes_per_second()) * u128::from(duration_us);
    if total % u128::from(MICROS_PER_SECOND) != 0 {
        return Err(unaligned);
    }

    let len = usize::try_from(total / u128::from(MICROS_PER_SECOND)).map_err(|_| unaligned)?;
    if len % frame_bytes != 0 {
        return Err(unaligned);
    }
    if len == 0 {
        return Err(ToneError::EmptyBuffer { duration_us });
    }
    Ok(len)
}

fn encode_sample(format: &AudioFormatSpec, x: f64, out: &mut [u8]) {
    match (format.bits_per_sample, format.signedness) {
        (8, Signedness::Unsigned) => out[0] = ((1.0 + x) / 2.0 * 255.0) as u8,
        (8, Signedness::Signed) => out[0] = ((x * 127.0) as i8) as u8,
        (16, Signedness::Unsigned) => {
            let value = ((1.0 + x) / 2.0 * 65535.0) as u16;
            write_u16(format.byte_order, value, out);
        }
        (16, Signedness::Signed) => {
            let value = (x * 32767.0) as i16;
            write_u16(format.byte_order, value as u16, out);
        }
        // Rejected by buffer_len
        _ => {}
    }
}

fn write_u16(order: ByteOrder, value: u16, out: &mut [u8]) {
    let bytes = match order {
        ByteOrder::Little => value.to_le_bytes(),
        ByteOrder::Big => value.to_be_bytes(),
    };
    out.copy_from_slice(&bytes);
}

/// Read-only cursor that loops over a [`ToneBuffer`] forever
#[derive(Debug, Clone)]
pub struct ToneStream {
    buffer: ToneBuffer,
    pos: usize,
}

impl ToneStream {
    /// Copy up to `dest.len()` bytes, wrapping at the buffer end
    ///
    /// Fills `dest` completely unless the buffer is empty. The cursor
    /// advances modulo the buffer length.
    pub fn read_circular(&mut self, dest: &mut [u8]) -> usize {
        let data = self.buffer.as_bytes();
        if data.is_empty() {
            return 0;
        }

        let mut total = 0;
        while total < dest.len() {
            let chunk = (data.len() - self.pos).min(dest.len() - total);
            dest[total..total + chunk].copy_from_slice(&data[self.pos..self.pos + chunk]);
            self.pos = (self.pos + chunk) % data.len();
            total += chunk;
        }
        total
    }

    /// Bytes that can be read without blocking
    ///
    /// Always the full buffer length: the stream never runs dry.
    pub fn bytes_available(&self) -> usize {
        self.buffer.len()
    }

    /// Current cursor offset
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The tone being looped
    pub fn buffer(&self) -> &ToneBuffer {
        &self.buffer
    }

    /// Release the underlying buffer
    pub fn into_buffer(self) -> ToneBuffer {
        self.buffer
    }
}

impl io::Read for ToneStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_circular(buf))
    }
}

impl io::Write for ToneStream {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "tone stream is read-only"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
