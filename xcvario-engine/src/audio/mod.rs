//! Audio subsystem
//!
//! Architecture:
//! - Tone synthesis: whole beep precomputed into a looping PCM buffer
//! - Output seam: `AudioDevice` negotiates and opens, `AudioSink` plays
//! - In-memory device for headless runs and tests

pub mod device;
pub mod memory;
pub mod tone;

pub use device::{negotiate_format, open_sink, AudioDevice, AudioSink};
pub use memory::{MemoryDevice, MemorySink, SinkEvent};
pub use tone::{ToneBuffer, ToneStream};
