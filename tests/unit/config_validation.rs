//! Unit tests for configuration validation.

use leadscrew::config::{validate_config, ControllerConfig};
use leadscrew::error::{ConfigError, Error};

/// Test validation of the default configuration.
#[test]
fn test_default_config_passes_validation() {
    assert!(validate_config(&ControllerConfig::default()).is_ok());
}

/// Test validation fails for a zero calibration field.
#[test]
fn test_zero_max_step_rate() {
    let mut config = ControllerConfig::default();
    config.calibration.max_step_rate = 0;

    let result = validate_config(&config);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::ZeroCalibrationField("max_step_rate")))
    ));
}

/// Test validation fails for a zero RPM interval.
#[test]
fn test_zero_rpm_interval() {
    let mut config = ControllerConfig::default();
    config.timing.rpm_interval_ms = 0;

    let result = validate_config(&config);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::ZeroInterval("rpm_interval_ms")))
    ));
}

/// Test validation fails for a zero jog chunk.
#[test]
fn test_zero_jog_chunk() {
    let mut config = ControllerConfig::default();
    config.jog.chunk_steps = 0;

    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::ZeroJogChunk))
    ));
}

/// Test validation fails for a non-positive or non-finite jog speed.
#[test]
fn test_invalid_jog_speed() {
    for speed in [0.0, -1.0, f32::NAN, f32::INFINITY] {
        let mut config = ControllerConfig::default();
        config.jog.speed = speed;
        assert!(
            matches!(
                validate_config(&config),
                Err(Error::Config(ConfigError::InvalidJogSpeed(_)))
            ),
            "speed {} accepted",
            speed
        );
    }
}

/// Test validation fails for an unsupported multiplier.
#[test]
fn test_invalid_multiplier() {
    let mut config = ControllerConfig::default();
    config.jog.multiplier = 0.5;

    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidJogMultiplier(_)))
    ));
}

/// Test error messages name the offending field.
#[test]
fn test_error_display() {
    let err = Error::Config(ConfigError::ZeroCalibrationField("steps_per_unit"));
    let text = format!("{}", err);
    assert!(text.contains("steps_per_unit"));
}
