//! Shared fixtures for engine integration tests
//!
//! - Fast-polling configs so idle waits stay short
//! - A polling helper for observing the playback worker
//! - Deterministic pressure series

#![allow(dead_code)]

use std::thread;
use std::time::{Duration, Instant};

use xcvario_core::VarioConfig;

/// Upper bound for anything the worker is expected to do
pub const WORKER_TIMEOUT: Duration = Duration::from_secs(5);

/// Default config with a short idle poll
pub fn fast_config() -> VarioConfig {
    let mut config = VarioConfig::default();
    config.beep.idle_poll_ms = 5;
    config
}

/// Poll `condition` until it holds or `timeout` passes
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}

/// Small deterministic noise source (LCG)
pub struct TestRng {
    state: u32,
}

impl TestRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Uniform in `[-amplitude, amplitude]`
    pub fn noise(&mut self, amplitude: f64) -> f64 {
        self.state = self.state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let uniform = f64::from(self.state) / f64::from(u32::MAX);
        (uniform * 2.0 - 1.0) * amplitude
    }
}

/// Pressure falling linearly at `rate_pa_s`, sampled every `dt` seconds
pub fn pressure_ramp(start_pa: f64, rate_pa_s: f64, dt: f64, samples: usize) -> Vec<f64> {
    (0..samples).map(|i| start_pa - rate_pa_s * dt * i as f64).collect()
}
