//! Audio Feedback Defaults
//!
//! Tone pitch, dead-band, output format and the two hand-tuned response
//! curves. Curve points are `(vario m/s, value)` pairs in increasing x.

/// Pitch of a zero-climb tone and of every sink tone (Hz).
pub const DEFAULT_BASE_TONE_HZ: u32 = 750;

/// |vario| below which no tone is produced (m/s).
pub const DEFAULT_DEAD_BAND_M_S: f64 = 0.25;

/// Smallest vario change that is forwarded to the playback worker (m/s).
pub const DEFAULT_VARIO_EPSILON: f64 = 0.0001;

/// Silence after a beep as a fraction of the beep length.
pub const DEFAULT_SILENCE_RATIO: f64 = 0.5;

/// Poll interval while the vario sits inside the dead-band (ms).
pub const DEFAULT_IDLE_POLL_MS: u64 = 50;

/// Output volume on startup (percent).
pub const DEFAULT_VOLUME_PERCENT: u8 = 100;

/// Ideal output sample rate (Hz).
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 44_100;

/// Ideal output channel count.
pub const DEFAULT_CHANNEL_COUNT: u16 = 1;

/// Ideal output sample size (bits).
pub const DEFAULT_BITS_PER_SAMPLE: u16 = 16;

/// Maximum number of control points in a response curve.
pub const MAX_CURVE_POINTS: usize = 16;

/// Beep length in seconds as a function of |vario|.
///
/// Steep near zero so weak lift is already clearly faster than still air.
pub const DURATION_CURVE_POINTS: [(f64, f64); 7] = [
    (0.0, 0.4763),
    (0.441, 0.3619),
    (1.029, 0.2238),
    (1.559, 0.1565),
    (2.471, 0.0985),
    (3.571, 0.0741),
    (5.0, 0.05),
];

/// Pitch offset above the base tone in Hz as a function of climb rate.
pub const FREQUENCY_CURVE_POINTS: [(f64, f64); 9] = [
    (0.0, 0.0),
    (0.25, 100.0),
    (1.0, 200.0),
    (1.5, 300.0),
    (2.0, 400.0),
    (3.5, 500.0),
    (4.0, 600.0),
    (4.5, 700.0),
    (6.0, 800.0),
];

/// Shortest beep a duration curve override may request (s).
pub const MIN_BEEP_DURATION_S: f64 = 0.001;

/// Longest beep a duration curve override may request (s).
pub const MAX_BEEP_DURATION_S: f64 = 10.0;

/// Largest pitch offset a frequency curve override may request (Hz).
pub const MAX_TONE_OFFSET_HZ: f64 = 20_000.0;
