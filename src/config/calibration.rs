//! Machine calibration and its persisted record.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Marker stored alongside the calibration ("ELS1"). A record without it is
/// treated as absent.
pub const CALIBRATION_MARKER: u32 = 0x454C_5331;

/// Machine calibration.
///
/// Owned by the control loop. Mutated only through validated Setup edits and
/// persisted after each one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    /// Encoder pulses per spindle revolution (after quadrature).
    pub pulses_per_revolution: u32,
    /// Stepper steps per millimetre of carriage travel.
    pub steps_per_unit: u32,
    /// Axis acceleration in steps/s².
    pub acceleration: u32,
    /// Axis speed cap in steps/s, used while threading.
    pub max_step_rate: u32,
    /// Negate the encoder count so forward spindle rotation counts up.
    pub invert_encoder: bool,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            pulses_per_revolution: 2880,
            steps_per_unit: 400,
            acceleration: 50_000,
            max_step_rate: 100_000,
            invert_encoder: true,
        }
    }
}

impl Calibration {
    /// Check that every numeric field is positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for field in CalibrationField::ALL {
            if self.get(field) == 0 {
                return Err(ConfigError::ZeroCalibrationField(field.name()));
            }
        }
        Ok(())
    }

    /// Whether the calibration passes [`Calibration::validate`].
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Read a numeric field.
    pub fn get(&self, field: CalibrationField) -> u32 {
        match field {
            CalibrationField::PulsesPerRevolution => self.pulses_per_revolution,
            CalibrationField::StepsPerUnit => self.steps_per_unit,
            CalibrationField::Acceleration => self.acceleration,
            CalibrationField::MaxStepRate => self.max_step_rate,
        }
    }

    /// Write a numeric field, clamped into its valid range.
    ///
    /// Returns the value actually stored.
    pub fn set_clamped(&mut self, field: CalibrationField, value: u32) -> u32 {
        let (min, max) = field.bounds();
        let value = value.clamp(min, max);
        match field {
            CalibrationField::PulsesPerRevolution => self.pulses_per_revolution = value,
            CalibrationField::StepsPerUnit => self.steps_per_unit = value,
            CalibrationField::Acceleration => self.acceleration = value,
            CalibrationField::MaxStepRate => self.max_step_rate = value,
        }
        value
    }

    /// Pull every numeric field into its valid range. Returns whether any
    /// field changed.
    pub fn clamp_to_bounds(&mut self) -> bool {
        let mut changed = false;
        for field in CalibrationField::ALL {
            let value = self.get(field);
            changed |= self.set_clamped(field, value) != value;
        }
        changed
    }
}

/// Editable numeric calibration fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationField {
    /// Encoder pulses per revolution.
    PulsesPerRevolution,
    /// Steps per millimetre.
    StepsPerUnit,
    /// Acceleration in steps/s².
    Acceleration,
    /// Maximum step rate in steps/s.
    MaxStepRate,
}

impl CalibrationField {
    /// All fields in Setup page order.
    pub const ALL: [CalibrationField; 4] = [
        CalibrationField::PulsesPerRevolution,
        CalibrationField::StepsPerUnit,
        CalibrationField::Acceleration,
        CalibrationField::MaxStepRate,
    ];

    /// Field name used in errors and logs.
    pub fn name(self) -> &'static str {
        match self {
            CalibrationField::PulsesPerRevolution => "pulses_per_revolution",
            CalibrationField::StepsPerUnit => "steps_per_unit",
            CalibrationField::Acceleration => "acceleration",
            CalibrationField::MaxStepRate => "max_step_rate",
        }
    }

    /// Prompt shown on the input form.
    pub fn prompt(self) -> &'static str {
        match self {
            CalibrationField::PulsesPerRevolution => "Encoder pulses per rev",
            CalibrationField::StepsPerUnit => "Steps per mm",
            CalibrationField::Acceleration => "Acceleration (steps/s2)",
            CalibrationField::MaxStepRate => "Max step rate (steps/s)",
        }
    }

    /// Inclusive valid range.
    pub fn bounds(self) -> (u32, u32) {
        match self {
            CalibrationField::PulsesPerRevolution => (1, 100_000),
            CalibrationField::StepsPerUnit => (1, 100_000),
            CalibrationField::Acceleration => (1, 1_000_000),
            CalibrationField::MaxStepRate => (1, 500_000),
        }
    }
}

/// Single persisted calibration blob guarded by [`CALIBRATION_MARKER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationRecord {
    /// Presence marker; must equal [`CALIBRATION_MARKER`].
    pub marker: u32,
    /// Stored calibration.
    pub calibration: Calibration,
}

impl CalibrationRecord {
    /// Wrap a calibration with the current marker.
    pub fn new(calibration: Calibration) -> Self {
        Self {
            marker: CALIBRATION_MARKER,
            calibration,
        }
    }

    /// Marker present and calibration valid.
    pub fn is_intact(&self) -> bool {
        self.marker == CALIBRATION_MARKER && self.calibration.is_valid()
    }
}
