//! Controller configuration - root configuration structure.

use serde::Deserialize;

use super::calibration::Calibration;
use super::units::UnitSystem;

/// Root configuration structure from TOML.
///
/// Every table is optional; missing values fall back to the defaults below.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Calibration written to the store when no intact record exists.
    pub calibration: Calibration,

    /// Unit system at power-up.
    pub units: UnitSystem,

    /// Loop timing.
    pub timing: TimingConfig,

    /// Jog feed settings.
    pub jog: JogConfig,
}

/// Rate limits for work kept off the hot path.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Minimum interval between display status pushes.
    pub display_interval_ms: u32,
    /// Spindle speed sampling interval.
    pub rpm_interval_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            display_interval_ms: 50,
            rpm_interval_ms: 500,
        }
    }
}

/// Jog feed settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct JogConfig {
    /// Distance re-issued each tick while a jog button is held.
    pub chunk_steps: u32,
    /// Initial jog speed in user units per second.
    pub speed: f32,
    /// Initial knob multiplier (0.01, 0.1 or 1).
    pub multiplier: f32,
}

impl Default for JogConfig {
    fn default() -> Self {
        Self {
            chunk_steps: 1000,
            speed: 1.0,
            multiplier: 0.1,
        }
    }
}
