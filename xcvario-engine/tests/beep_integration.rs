//! Integration tests for the beep controller playback loop
//!
//! Drives a real worker thread against the recording device and inspects
//! the sink calls it made.

mod common;

use std::time::{Duration, Instant};

use xcvario_core::{AudioFormatSpec, SinkTone, VarioConfig};
use xcvario_engine::audio::{AudioDevice, MemoryDevice, SinkEvent};
use xcvario_engine::{BeepController, DeviceError, EngineError, ToneError};

use common::{fast_config, wait_until, WORKER_TIMEOUT};

fn controller(device: &MemoryDevice, config: &VarioConfig) -> BeepController {
    let format = AudioFormatSpec::default();
    let sink = device.open(format).unwrap();
    BeepController::new(sink, format, config).unwrap()
}

fn started_frequencies(device: &MemoryDevice) -> Vec<u32> {
    device
        .started()
        .into_iter()
        .filter_map(|event| match event {
            SinkEvent::Started { frequency_hz, .. } => Some(frequency_hz),
            _ => None,
        })
        .collect()
}

#[test]
fn stop_without_start_is_safe() {
    let device = MemoryDevice::new();
    let mut beeper = controller(&device, &fast_config());

    assert!(beeper.stop().is_ok());
    assert!(beeper.stop().is_ok());
    assert!(!beeper.is_running());
    assert!(device.events().is_empty());
}

#[test]
fn dead_band_stays_silent() {
    let device = MemoryDevice::new();
    let mut beeper = controller(&device, &fast_config());

    beeper.set_vario(0.1, 0.1);
    beeper.start().unwrap();
    assert!(beeper.is_running());
    std::thread::sleep(Duration::from_millis(150));
    beeper.stop().unwrap();

    assert!(device.started().is_empty());
    assert_eq!(device.events().last(), Some(&SinkEvent::Stopped));
    assert!(!beeper.is_running());
}

#[test]
fn climb_beeps_above_base_pitch() {
    let device = MemoryDevice::new();
    let mut beeper = controller(&device, &fast_config());

    beeper.set_vario(3.0, 0.1);
    beeper.start().unwrap();
    assert!(wait_until(WORKER_TIMEOUT, || device.started().len() >= 2));

    let snapshot = beeper.snapshot();
    assert!(snapshot.running);
    assert_eq!(snapshot.current_vario, 3.0);
    assert_eq!(snapshot.current_tone_hz, 1_217);
    beeper.stop().unwrap();

    let expected_on = beeper.planner().plan(3.0).unwrap().on_us;
    for event in device.started() {
        match event {
            SinkEvent::Started { frequency_hz, duration_us, audible, .. } => {
                assert_eq!(frequency_hz, 1_217);
                assert_eq!(duration_us, expected_on);
                assert!(audible);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    // Every tone is followed by a suspend or the final stop
    let events = device.events();
    for pair in events.windows(2) {
        if matches!(pair[0], SinkEvent::Started { .. }) {
            assert!(matches!(pair[1], SinkEvent::Suspended | SinkEvent::Stopped | SinkEvent::Volume(_)));
        }
    }
}

#[test]
fn sink_pitch_follows_policy() {
    let device = MemoryDevice::new();
    let mut beeper = controller(&device, &fast_config());
    beeper.set_vario(-3.0, 0.1);
    beeper.start().unwrap();
    assert!(wait_until(WORKER_TIMEOUT, || !device.started().is_empty()));
    beeper.stop().unwrap();
    assert!(started_frequencies(&device).iter().all(|&hz| hz == 750));

    let mut config = fast_config();
    config.beep.sink_tone = SinkTone::Silent;
    let device = MemoryDevice::new();
    let mut beeper = controller(&device, &config);
    beeper.set_vario(-3.0, 0.1);
    beeper.start().unwrap();
    std::thread::sleep(Duration::from_millis(150));
    beeper.stop().unwrap();
    assert!(device.started().is_empty());
}

#[test]
fn vario_change_reaches_next_beep() {
    let device = MemoryDevice::new();
    let mut beeper = controller(&device, &fast_config());

    beeper.set_vario(1.0, 0.1);
    beeper.start().unwrap();
    assert!(wait_until(WORKER_TIMEOUT, || started_frequencies(&device).contains(&950)));

    beeper.set_vario(6.0, 0.1);
    assert!(wait_until(WORKER_TIMEOUT, || started_frequencies(&device).contains(&1_550)));
    beeper.stop().unwrap();
}

#[test]
fn tiny_vario_changes_are_ignored() {
    let device = MemoryDevice::new();
    let beeper = controller(&device, &fast_config());

    assert!(beeper.set_vario(1.0, 0.1));
    assert!(!beeper.set_vario(1.000_01, 0.1));
    assert!(!beeper.set_vario(f64::NAN, 0.1));
    assert!(!beeper.set_vario(f64::INFINITY, 0.1));
    assert_eq!(beeper.vario(), 1.0);
}

#[test]
fn device_failure_halts_playback() {
    let device = MemoryDevice::new().failing_after(1);
    let mut beeper = controller(&device, &fast_config());

    beeper.set_vario(2.0, 0.1);
    beeper.start().unwrap();
    assert!(wait_until(WORKER_TIMEOUT, || !beeper.is_running()));

    assert!(matches!(
        beeper.last_error(),
        Some(EngineError::Device(DeviceError::WriteFailed(_)))
    ));
    assert_eq!(device.started().len(), 1);
    assert_eq!(device.events().last(), Some(&SinkEvent::Stopped));

    // Start is the retry; the broken device fails again
    beeper.start().unwrap();
    assert!(wait_until(WORKER_TIMEOUT, || !beeper.is_running()));
    assert!(beeper.last_error().is_some());
    assert!(beeper.stop().is_ok());
}

#[test]
fn volume_applies_while_playing_and_on_start() {
    let device = MemoryDevice::new();
    let mut beeper = controller(&device, &fast_config());

    beeper.set_volume(150);
    assert_eq!(beeper.volume(), 100);
    beeper.set_volume(40);
    assert!(device.events().is_empty());

    beeper.start().unwrap();
    assert_eq!(device.events().first(), Some(&SinkEvent::Volume(0.4)));

    beeper.set_volume(75);
    assert!(wait_until(WORKER_TIMEOUT, || device.events().contains(&SinkEvent::Volume(0.75))));
    beeper.stop().unwrap();
}

#[test]
fn stop_interrupts_long_waits() {
    let mut config = fast_config();
    config.beep.idle_poll_ms = 1_000;
    let device = MemoryDevice::new();
    let mut beeper = controller(&device, &config);

    beeper.start().unwrap();
    std::thread::sleep(Duration::from_millis(20));

    let begin = Instant::now();
    beeper.stop().unwrap();
    assert!(begin.elapsed() < Duration::from_millis(500));
}

#[test]
fn restart_after_stop_plays_again() {
    let device = MemoryDevice::new();
    let mut beeper = controller(&device, &fast_config());
    beeper.set_vario(2.0, 0.1);

    beeper.start().unwrap();
    assert!(wait_until(WORKER_TIMEOUT, || !device.started().is_empty()));
    beeper.stop().unwrap();

    device.clear();
    beeper.start().unwrap();
    assert!(wait_until(WORKER_TIMEOUT, || !device.started().is_empty()));
    beeper.stop().unwrap();
    assert!(beeper.last_error().is_none());
}

#[test]
fn drop_stops_the_worker() {
    let device = MemoryDevice::new();
    {
        let mut beeper = controller(&device, &fast_config());
        beeper.start().unwrap();
    }
    assert_eq!(device.events().last(), Some(&SinkEvent::Stopped));
}

#[test]
fn narrow_band_climb_is_audible() {
    let format = AudioFormatSpec { sample_rate_hz: 8_000, ..AudioFormatSpec::default() };
    let device = MemoryDevice::with_formats(vec![format]);

    let mut config = fast_config();
    config.base_tone_hz = 3_500;
    let sink = device.open(format).unwrap();
    assert!(matches!(
        BeepController::new(sink, format, &config),
        Err(EngineError::Tone(ToneError::InvalidFrequency { .. }))
    ));

    config.base_tone_hz = 3_100;
    let sink = device.open(format).unwrap();
    let mut beeper = BeepController::new(sink, format, &config).unwrap();
    beeper.set_vario(6.0, 0.1);
    beeper.start().unwrap();
    assert!(wait_until(WORKER_TIMEOUT, || !device.started().is_empty()));
    beeper.stop().unwrap();

    for event in device.started() {
        assert!(matches!(event, SinkEvent::Started { frequency_hz: 3_900, audible: true, .. }), "{event:?}");
    }
}
