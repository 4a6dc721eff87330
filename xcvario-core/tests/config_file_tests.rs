//! Config file loading

use std::io::Write;

use xcvario_core::{ConfigError, SinkTone, VarioConfig};

#[test]
fn loads_config_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "base_tone_hz": 700,
            "sea_level_pa": 101000.0,
            "beep": {{ "sink_tone": "scaled", "volume_percent": 60 }}
        }}"#
    )
    .unwrap();

    let config = VarioConfig::from_file(file.path()).unwrap();
    assert_eq!(config.base_tone_hz, 700);
    assert_eq!(config.sea_level_pa, 101_000.0);
    assert_eq!(config.beep.sink_tone, SinkTone::Scaled);
    assert_eq!(config.beep.volume_percent, 60);
}

#[test]
fn saved_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vario.json");

    let mut config = VarioConfig::default();
    config.beep.silence_ratio = 0.8;
    std::fs::write(&path, config.to_json_string().unwrap()).unwrap();

    assert_eq!(VarioConfig::from_file(&path).unwrap(), config);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = VarioConfig::from_file(dir.path().join("absent.json"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn invalid_values_are_rejected_on_load() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "audio": {{ "sample_rate_hz": 44100, "channel_count": 1, "bits_per_sample": 12, "signedness": "signed", "byte_order": "little" }} }}"#).unwrap();

    assert!(matches!(
        VarioConfig::from_file(file.path()),
        Err(ConfigError::UnsupportedFormat { .. })
    ));
}
