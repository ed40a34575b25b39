//! Configuration validation.

use crate::error::{ConfigError, Error, Result};
use crate::motion::JogMultiplier;

use super::ControllerConfig;

/// Validate a controller configuration.
///
/// Checks:
/// - Calibration fields are all positive
/// - Timing intervals are non-zero
/// - Jog chunk is at least one step
/// - Jog speed is positive and the multiplier is a supported value
pub fn validate_config(config: &ControllerConfig) -> Result<()> {
    config.calibration.validate()?;

    if config.timing.display_interval_ms == 0 {
        return Err(Error::Config(ConfigError::ZeroInterval("display_interval_ms")));
    }
    if config.timing.rpm_interval_ms == 0 {
        return Err(Error::Config(ConfigError::ZeroInterval("rpm_interval_ms")));
    }

    if config.jog.chunk_steps == 0 {
        return Err(Error::Config(ConfigError::ZeroJogChunk));
    }

    if !config.jog.speed.is_finite() || config.jog.speed <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidJogSpeed(config.jog.speed)));
    }

    if JogMultiplier::from_value(config.jog.multiplier).is_none() {
        return Err(Error::Config(ConfigError::InvalidJogMultiplier(
            config.jog.multiplier,
        )));
    }

    Ok(())
}
