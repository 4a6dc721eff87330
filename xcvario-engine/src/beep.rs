//! Beep Controller
//!
//! ## Overview
//!
//! Turns the latest vertical speed into the classic "geiger counter"
//! variometer sound: short, high beeps in strong lift, slow low beeps in
//! weak lift or sink, silence in the dead-band around zero.
//!
//! ## Threading Model
//!
//! ```text
//! sensor thread                         playback worker
//!      │                                      │
//!      │ set_vario ──→ AtomicCell<f64> ──→ read at iteration start
//!      │                                      │
//!      │ set_volume ─┐                        │ generate tone
//!      │ stop ───────┴→ command channel ──→ sink.start
//!      │                                  wait on-duration  ← commands
//!      │                                  sink.suspend
//!      │                                  wait silence      ← commands
//! ```
//!
//! The sink is moved into the worker on `start` and handed back when the
//! worker exits, so exactly one thread touches it at any time. Waits are
//! `recv_timeout` calls on the command channel: a `Stop` interrupts them
//! instead of waiting out the current beep.
//!
//! ## Iteration
//!
//! 1. Read the vario. Inside the dead-band: poll again after `idle_poll_ms`.
//! 2. Pitch: `base + frequency_curve(vario)` when climbing, policy-dependent
//!    when sinking (see [`SinkTone`]).
//! 3. On-duration: `duration_curve(|vario|)` seconds, aligned to whole
//!    frames; silence: `silence_ratio` of that.
//! 4. Generate a fresh tone buffer and start it on the sink.
//! 5. Wait, suspend, wait, repeat.
//!
//! A failed sink call halts the loop. The error is logged, kept for
//! [`BeepController::last_error`], and the controller goes back to idle.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use crossbeam_utils::atomic::AtomicCell;
use log::{debug, error, trace, warn};
use serde::Serialize;

use xcvario_core::{AudioFormatSpec, ResponseCurve, SinkTone, VarioConfig};

use crate::audio::device::AudioSink;
use crate::audio::tone::ToneBuffer;
use crate::errors::{EngineError, EngineResult, ToneError};

const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Externally visible playback state
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BeepSession {
    /// Vario the worker will use for its next beep (m/s)
    pub current_vario: f64,
    /// Pitch of the most recent beep, or the base pitch before the first one
    pub current_tone_hz: u32,
    /// Worker is alive and playing
    pub running: bool,
}

/// One beep as decided from a vario value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeepPlan {
    /// Tone pitch
    pub frequency_hz: u32,
    /// Tone length, aligned to whole frames
    pub on_us: u64,
    /// Silence after the tone
    pub off_us: u64,
}

impl BeepPlan {
    /// Tone length as a `Duration`
    pub fn on(&self) -> Duration {
        Duration::from_micros(self.on_us)
    }

    /// Silence length as a `Duration`
    pub fn off(&self) -> Duration {
        Duration::from_micros(self.off_us)
    }
}

/// Maps vertical speed to beep pitch and cadence
///
/// Pure and immutable: shared read-only between controller and worker.
#[derive(Debug, Clone)]
pub struct TonePlanner {
    format: AudioFormatSpec,
    base_tone_hz: u32,
    dead_band: f64,
    silence_ratio: f64,
    sink_tone: SinkTone,
    duration_curve: ResponseCurve,
    frequency_curve: ResponseCurve,
}

impl TonePlanner {
    /// Build from config for a negotiated output `format`
    pub fn new(format: AudioFormatSpec, config: &VarioConfig) -> EngineResult<Self> {
        Ok(Self {
            format,
            base_tone_hz: config.base_tone_hz,
            dead_band: config.beep.dead_band,
            silence_ratio: config.beep.silence_ratio,
            sink_tone: config.beep.sink_tone,
            duration_curve: config.beep.duration_curve()?,
            frequency_curve: config.beep.frequency_curve()?,
        })
    }

    /// Output format tones are generated in
    pub fn format(&self) -> AudioFormatSpec {
        self.format
    }

    /// Pitch at zero climb
    pub fn base_tone_hz(&self) -> u32 {
        self.base_tone_hz
    }

    /// True when `vario` is too small to beep for
    pub fn in_dead_band(&self, vario: f64) -> bool {
        vario.is_nan() || vario.abs() < self.dead_band
    }

    /// Pitch for `vario`, or `None` when the sink policy mutes it
    pub fn frequency_hz(&self, vario: f64) -> Option<u32> {
        let offset = if vario > 0.0 {
            self.frequency_curve.evaluate(vario)
        } else {
            match self.sink_tone {
                SinkTone::BaseFrequency => 0.0,
                SinkTone::Scaled => self.frequency_curve.evaluate(vario.abs()),
                SinkTone::Silent => return None,
            }
        };

        let hz = (f64::from(self.base_tone_hz) + offset).round().max(1.0);
        Some(hz.min(f64::from(self.max_tone_hz())) as u32)
    }

    /// Highest pitch the output format carries
    ///
    /// One below half the sample rate: at exactly half, every sample is
    /// `sin(kπ)` and the tone is silent.
    pub fn max_tone_hz(&self) -> u32 {
        (self.format.sample_rate_hz / 2).saturating_sub(1).max(1)
    }

    /// Highest pitch any vario can ask for
    pub fn peak_tone_hz(&self) -> f64 {
        let offset = self.frequency_curve.y_bounds().map_or(0.0, |(_, hi)| hi.max(0.0));
        (f64::from(self.base_tone_hz) + offset).round()
    }

    /// Fail when the base tone plus the largest curve offset cannot be
    /// played in the output format
    pub fn check_pitch_range(&self) -> EngineResult<()> {
        let peak = self.peak_tone_hz();
        if peak > f64::from(self.max_tone_hz()) {
            return Err(ToneError::InvalidFrequency {
                frequency_hz: peak as u32,
                nyquist_hz: self.format.sample_rate_hz / 2,
            }
            .into());
        }
        Ok(())
    }

    /// Beep length for `vario`, aligned to whole frames (µs)
    pub fn on_duration_us(&self, vario: f64) -> u64 {
        let seconds = self.duration_curve.evaluate(vario.abs()).max(0.0);
        self.format.align_duration_us((seconds * MICROS_PER_SECOND) as u64)
    }

    /// Everything needed to play one beep, or `None` for silence
    pub fn plan(&self, vario: f64) -> Option<BeepPlan> {
        if self.in_dead_band(vario) {
            return None;
        }

        let frequency_hz = self.frequency_hz(vario)?;
        let on_us = self.on_duration_us(vario);
        let off_us = (on_us as f64 * self.silence_ratio) as u64;
        Some(BeepPlan { frequency_hz, on_us, off_us })
    }

    /// Tone at the base pitch with the zero-climb duration
    pub fn base_tone(&self) -> EngineResult<ToneBuffer> {
        let tone = ToneBuffer::generate(self.format, self.on_duration_us(0.0), self.base_tone_hz)?;
        Ok(tone)
    }
}

/// State shared between controller and worker
#[derive(Debug)]
struct Shared {
    vario: AtomicCell<f64>,
    tone_hz: AtomicU32,
    running: AtomicBool,
    last_error: Mutex<Option<EngineError>>,
}

impl Shared {
    fn record_error(&self, err: EngineError) {
        if let Ok(mut slot) = self.last_error.lock() {
            *slot = Some(err);
        }
    }
}

/// Messages from controller to worker
#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    Volume(f32),
    Stop,
}

/// How a wait ended
#[derive(Debug, PartialEq)]
enum Wake {
    Elapsed,
    Stop,
}

struct Worker {
    commands: Sender<Command>,
    handle: JoinHandle<Box<dyn AudioSink>>,
}

/// Drives an [`AudioSink`] from a continuously updated vario
pub struct BeepController {
    planner: Arc<TonePlanner>,
    shared: Arc<Shared>,
    vario_epsilon: f64,
    idle_poll: Duration,
    volume_percent: u8,
    sink: Option<Box<dyn AudioSink>>,
    worker: Option<Worker>,
}

impl BeepController {
    /// Build a controller that will play on `sink` in `format`
    ///
    /// Validates the config, checks every reachable pitch fits `format` and
    /// synthesizes the base tone once, so a format, pitch or duration that
    /// cannot be generated fails here rather than mid-flight.
    pub fn new(sink: Box<dyn AudioSink>, format: AudioFormatSpec, config: &VarioConfig) -> EngineResult<Self> {
        config.validate()?;
        let planner = TonePlanner::new(format, config)?;
        planner.check_pitch_range()?;
        planner.base_tone()?;

        Ok(Self {
            shared: Arc::new(Shared {
                vario: AtomicCell::new(0.0),
                tone_hz: AtomicU32::new(planner.base_tone_hz()),
                running: AtomicBool::new(false),
                last_error: Mutex::new(None),
            }),
            planner: Arc::new(planner),
            vario_epsilon: config.beep.vario_epsilon,
            idle_poll: Duration::from_millis(config.beep.idle_poll_ms),
            volume_percent: config.beep.volume_percent.min(100),
            sink: Some(sink),
            worker: None,
        })
    }

    /// Beep planner in use
    pub fn planner(&self) -> &TonePlanner {
        &self.planner
    }

    /// Start the playback worker
    ///
    /// No-op while already running. After the worker halted on a device
    /// error, this reclaims the sink and tries again.
    pub fn start(&mut self) -> EngineResult<()> {
        if self.is_running() {
            return Ok(());
        }
        // Worker may have exited on its own after a failure
        self.join_worker()?;

        let mut sink = self.sink.take().ok_or(EngineError::NoSink)?;

        let primed = match self.planner.base_tone() {
            Ok(tone) => tone,
            Err(err) => {
                self.sink = Some(sink);
                return Err(err);
            }
        };

        if let Err(err) = sink.set_volume(gain(self.volume_percent)) {
            self.sink = Some(sink);
            return Err(err.into());
        }

        if let Ok(mut slot) = self.shared.last_error.lock() {
            *slot = None;
        }
        self.shared.tone_hz.store(primed.frequency_hz(), Ordering::Relaxed);
        self.shared.running.store(true, Ordering::Release);

        let (commands, inbox) = unbounded();
        let context = WorkerContext {
            planner: Arc::clone(&self.planner),
            shared: Arc::clone(&self.shared),
            inbox,
            idle_poll: self.idle_poll,
        };

        // The closure owns the sink; if spawning fails it is dropped with it
        let spawned = thread::Builder::new()
            .name("xcvario-beep".to_string())
            .spawn(move || context.run(sink, Some(primed)));

        match spawned {
            Ok(handle) => {
                debug!("Beep worker started");
                self.worker = Some(Worker { commands, handle });
                Ok(())
            }
            Err(err) => {
                self.shared.running.store(false, Ordering::Release);
                Err(EngineError::Worker(err.to_string()))
            }
        }
    }

    /// Stop the worker and silence the sink
    ///
    /// Safe to call when never started. Returns once the worker has exited;
    /// pending waits are interrupted.
    pub fn stop(&mut self) -> EngineResult<()> {
        if let Some(worker) = &self.worker {
            // Disconnected means the worker already exited
            let _ = worker.commands.send(Command::Stop);
        }
        let result = self.join_worker();
        self.shared.running.store(false, Ordering::Release);
        result
    }

    /// Publish a new vertical speed
    ///
    /// Changes smaller than the configured epsilon are dropped. Returns
    /// whether the stored value changed. The worker picks it up at the start
    /// of its next beep.
    pub fn set_vario(&self, vario: f64, dt: f64) -> bool {
        if !vario.is_finite() {
            warn!("Ignoring non-finite vario {}", vario);
            return false;
        }

        let current = self.shared.vario.load();
        if (vario - current).abs() < self.vario_epsilon {
            return false;
        }

        trace!("vario {:.3} m/s (dt {:.3} s)", vario, dt);
        self.shared.vario.store(vario);
        true
    }

    /// Set output volume in percent (clamped to 100)
    ///
    /// Applied immediately while playing, otherwise on the next start.
    pub fn set_volume(&mut self, percent: u8) {
        self.volume_percent = percent.min(100);
        if let Some(worker) = &self.worker {
            let _ = worker.commands.send(Command::Volume(gain(self.volume_percent)));
        }
    }

    /// Current volume in percent
    pub fn volume(&self) -> u8 {
        self.volume_percent
    }

    /// True while the worker is playing
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Latest vario handed to the worker
    pub fn vario(&self) -> f64 {
        self.shared.vario.load()
    }

    /// Snapshot of the playback state
    pub fn snapshot(&self) -> BeepSession {
        BeepSession {
            current_vario: self.shared.vario.load(),
            current_tone_hz: self.shared.tone_hz.load(Ordering::Relaxed),
            running: self.is_running(),
        }
    }

    /// Error that halted the most recent run, if any
    pub fn last_error(&self) -> Option<EngineError> {
        self.shared.last_error.lock().ok().and_then(|slot| slot.clone())
    }

    /// Wait for the worker and take the sink back
    fn join_worker(&mut self) -> EngineResult<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        drop(worker.commands);

        match worker.handle.join() {
            Ok(sink) => {
                self.sink = Some(sink);
                debug!("Beep worker stopped");
                Ok(())
            }
            Err(_) => {
                error!("Beep worker panicked; audio sink lost");
                Err(EngineError::Worker("playback worker panicked".to_string()))
            }
        }
    }
}

impl Drop for BeepController {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            error!("Failed to stop beep worker: {}", err);
        }
    }
}

fn gain(percent: u8) -> f32 {
    f32::from(percent.min(100)) / 100.0
}

/// Everything the worker thread owns besides the sink
struct WorkerContext {
    planner: Arc<TonePlanner>,
    shared: Arc<Shared>,
    inbox: Receiver<Command>,
    idle_poll: Duration,
}

impl WorkerContext {
    /// Playback loop; returns the sink to the controller
    fn run(self, mut sink: Box<dyn AudioSink>, mut primed: Option<ToneBuffer>) -> Box<dyn AudioSink> {
        if let Err(err) = self.play(sink.as_mut(), &mut primed) {
            error!("Beep playback halted: {}", err);
            self.shared.record_error(err);
        }

        if let Err(err) = sink.stop() {
            warn!("Audio sink stop failed: {}", err);
        }
        self.shared.running.store(false, Ordering::Release);
        sink
    }

    /// Beep until told to stop; `Err` on the first device failure
    fn play(&self, sink: &mut dyn AudioSink, primed: &mut Option<ToneBuffer>) -> EngineResult<()> {
        loop {
            let vario = self.shared.vario.load();

            let Some(plan) = self.planner.plan(vario) else {
                if self.wait(sink, self.idle_poll)? == Wake::Stop {
                    return Ok(());
                }
                continue;
            };

            let tone = match primed.take() {
                Some(tone) if tone.frequency_hz() == plan.frequency_hz && tone.duration_us() == plan.on_us => tone,
                _ => ToneBuffer::generate(self.planner.format(), plan.on_us, plan.frequency_hz)?,
            };

            trace!("beep {} Hz for {} µs, vario {:.2}", plan.frequency_hz, plan.on_us, vario);
            self.shared.tone_hz.store(plan.frequency_hz, Ordering::Relaxed);
            sink.start(tone.into_stream())?;

            if self.wait(sink, plan.on())? == Wake::Stop {
                return Ok(());
            }
            sink.suspend()?;
            if self.wait(sink, plan.off())? == Wake::Stop {
                return Ok(());
            }
        }
    }

    /// Sleep for `duration` while serving commands
    fn wait(&self, sink: &mut dyn AudioSink, duration: Duration) -> EngineResult<Wake> {
        let deadline = Instant::now() + duration;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.inbox.recv_timeout(remaining) {
                Ok(Command::Volume(gain)) => sink.set_volume(gain)?,
                Ok(Command::Stop) | Err(RecvTimeoutError::Disconnected) => return Ok(Wake::Stop),
                Err(RecvTimeoutError::Timeout) => return Ok(Wake::Elapsed),
            }
        }
    }
}
