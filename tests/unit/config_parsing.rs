//! Unit tests for TOML configuration parsing.

use leadscrew::config::{parse_config, ControllerConfig, UnitSystem};

/// Test parsing a complete controller configuration from TOML.
#[test]
fn test_parse_full_config() {
    let toml_str = r#"
units = "imperial"

[calibration]
pulses_per_revolution = 4096
steps_per_unit = 800
acceleration = 40000
max_step_rate = 80000
invert_encoder = false

[timing]
display_interval_ms = 100
rpm_interval_ms = 250

[jog]
chunk_steps = 2000
speed = 0.05
multiplier = 0.01
"#;

    let config: ControllerConfig = parse_config(toml_str).expect("Failed to parse TOML");

    assert_eq!(config.units, UnitSystem::Imperial);
    assert_eq!(config.calibration.pulses_per_revolution, 4096);
    assert_eq!(config.calibration.steps_per_unit, 800);
    assert_eq!(config.calibration.acceleration, 40000);
    assert_eq!(config.calibration.max_step_rate, 80000);
    assert!(!config.calibration.invert_encoder);
    assert_eq!(config.timing.display_interval_ms, 100);
    assert_eq!(config.timing.rpm_interval_ms, 250);
    assert_eq!(config.jog.chunk_steps, 2000);
    assert_eq!(config.jog.speed, 0.05);
    assert_eq!(config.jog.multiplier, 0.01);
}

/// Test that omitted tables and fields take their defaults.
#[test]
fn test_parse_partial_config_uses_defaults() {
    let toml_str = r#"
[calibration]
steps_per_unit = 1600
"#;

    let config = parse_config(toml_str).expect("Failed to parse TOML");

    assert_eq!(config.units, UnitSystem::Metric);
    assert_eq!(config.calibration.steps_per_unit, 1600);
    assert_eq!(config.calibration.pulses_per_revolution, 2880);
    assert_eq!(config.calibration.max_step_rate, 100000);
    assert!(config.calibration.invert_encoder);
    assert_eq!(config.timing.display_interval_ms, 50);
    assert_eq!(config.jog.chunk_steps, 1000);
}

/// Test that an unknown unit system is a parse error.
#[test]
fn test_parse_unknown_units_fails() {
    let result = parse_config(r#"units = "furlongs""#);
    assert!(result.is_err());
}

/// Test that a wrongly typed field is a parse error.
#[test]
fn test_parse_wrong_type_fails() {
    let toml_str = r#"
[calibration]
steps_per_unit = "many"
"#;
    assert!(parse_config(toml_str).is_err());
}
