//! In-Memory Audio Device
//!
//! Records every call made on the sink instead of producing sound. Used for
//! headless runs and to observe the playback loop in tests:
//!
//! ```rust
//! use xcvario_engine::audio::{AudioDevice, AudioSink, MemoryDevice, SinkEvent};
//! use xcvario_core::AudioFormatSpec;
//!
//! let device = MemoryDevice::new();
//! let mut sink = device.open(AudioFormatSpec::default()).unwrap();
//! sink.set_volume(0.5).unwrap();
//! assert_eq!(device.events(), vec![SinkEvent::Volume(0.5)]);
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use xcvario_core::AudioFormatSpec;

use crate::audio::device::{AudioDevice, AudioSink};
use crate::audio::tone::ToneStream;
use crate::errors::{DeviceError, DeviceResult};

/// Bytes pulled from a started stream to characterize it
const PROBE_BYTES: usize = 256;

/// One recorded sink call
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    /// Playback of a new tone started
    Started {
        /// Tone pitch
        frequency_hz: u32,
        /// Tone length
        duration_us: u64,
        /// Buffer length in bytes
        bytes: usize,
        /// Probe read found more than one distinct byte value
        audible: bool,
    },
    /// Output paused
    Suspended,
    /// Output stopped
    Stopped,
    /// Gain changed
    Volume(f32),
}

#[derive(Debug, Default)]
struct Recorder {
    events: Vec<SinkEvent>,
    starts: usize,
}

type SharedRecorder = Arc<Mutex<Recorder>>;

fn lock(recorder: &SharedRecorder) -> MutexGuard<'_, Recorder> {
    // A panicking test thread must not hide the events from the others
    recorder.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Device whose sinks write to a shared event log
#[derive(Debug, Clone)]
pub struct MemoryDevice {
    name: String,
    supported: Vec<AudioFormatSpec>,
    fail_after_starts: Option<usize>,
    recorder: SharedRecorder,
}

impl Default for MemoryDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDevice {
    /// Device that supports only the default format
    pub fn new() -> Self {
        Self::with_formats(vec![AudioFormatSpec::default()])
    }

    /// Device that supports exactly `supported`; the first entry is the nearest
    pub fn with_formats(supported: Vec<AudioFormatSpec>) -> Self {
        Self {
            name: "memory".to_string(),
            supported,
            fail_after_starts: None,
            recorder: Arc::default(),
        }
    }

    /// Make sink `start` fail once `starts` tones have played
    pub fn failing_after(mut self, starts: usize) -> Self {
        self.fail_after_starts = Some(starts);
        self
    }

    /// Everything recorded so far, in call order
    pub fn events(&self) -> Vec<SinkEvent> {
        lock(&self.recorder).events.clone()
    }

    /// Only the `Started` events
    pub fn started(&self) -> Vec<SinkEvent> {
        self.events()
            .into_iter()
            .filter(|event| matches!(event, SinkEvent::Started { .. }))
            .collect()
    }

    /// Forget recorded events
    pub fn clear(&self) {
        let mut recorder = lock(&self.recorder);
        recorder.events.clear();
        recorder.starts = 0;
    }
}

impl AudioDevice for MemoryDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_format_supported(&self, format: &AudioFormatSpec) -> bool {
        self.supported.contains(format)
    }

    fn nearest_format(&self, _format: &AudioFormatSpec) -> Option<AudioFormatSpec> {
        self.supported.first().copied()
    }

    fn open(&self, format: AudioFormatSpec) -> DeviceResult<Box<dyn AudioSink>> {
        if !self.is_format_supported(&format) {
            return Err(DeviceError::Unavailable(format!("{format:?} not supported")));
        }
        Ok(Box::new(MemorySink {
            recorder: Arc::clone(&self.recorder),
            fail_after_starts: self.fail_after_starts,
            current: None,
        }))
    }
}

/// Sink opened from a [`MemoryDevice`]
#[derive(Debug)]
pub struct MemorySink {
    recorder: SharedRecorder,
    fail_after_starts: Option<usize>,
    current: Option<ToneStream>,
}

impl AudioSink for MemorySink {
    fn start(&mut self, mut stream: ToneStream) -> DeviceResult<()> {
        let mut recorder = lock(&self.recorder);
        if let Some(limit) = self.fail_after_starts {
            if recorder.starts >= limit {
                return Err(DeviceError::WriteFailed("simulated device failure".to_string()));
            }
        }

        let mut probe = [0u8; PROBE_BYTES];
        let read = stream.read_circular(&mut probe);
        let audible = probe[..read].iter().any(|&b| b != probe[0]);

        let tone = stream.buffer();
        recorder.starts += 1;
        recorder.events.push(SinkEvent::Started {
            frequency_hz: tone.frequency_hz(),
            duration_us: tone.duration_us(),
            bytes: tone.len(),
            audible,
        });
        self.current = Some(stream);
        Ok(())
    }

    fn suspend(&mut self) -> DeviceResult<()> {
        lock(&self.recorder).events.push(SinkEvent::Suspended);
        Ok(())
    }

    fn stop(&mut self) -> DeviceResult<()> {
        self.current = None;
        lock(&self.recorder).events.push(SinkEvent::Stopped);
        Ok(())
    }

    fn set_volume(&mut self, gain: f32) -> DeviceResult<()> {
        lock(&self.recorder).events.push(SinkEvent::Volume(gain));
        Ok(())
    }
}
