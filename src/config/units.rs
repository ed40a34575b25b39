//! Unit systems and step conversions.
//!
//! Positions are stored in steps; millimetres and inches only exist at the
//! edges (display, numeric entry, jog speed). Thread pitch is the exception:
//! it is stored in the active system's own convention, mm/rev in metric and
//! threads per inch in imperial.

use libm::floorf;
use serde::{Deserialize, Serialize};

use super::calibration::Calibration;

/// Millimetres per inch.
pub const MM_PER_INCH: f32 = 25.4;

/// Metric pitch granularity in mm/rev.
pub const METRIC_PITCH_STEP: f32 = 0.05;
/// Smallest metric pitch in mm/rev.
pub const METRIC_PITCH_MIN: f32 = 0.05;
/// Largest metric pitch in mm/rev.
pub const METRIC_PITCH_MAX: f32 = 4.0;
/// Imperial pitch granularity in threads per inch.
pub const IMPERIAL_PITCH_STEP: f32 = 1.0;
/// Coarsest imperial pitch in threads per inch.
pub const IMPERIAL_PITCH_MIN: f32 = 4.0;
/// Finest imperial pitch in threads per inch.
pub const IMPERIAL_PITCH_MAX: f32 = 100.0;

// Absorbs float error when snapping onto the pitch grid (1.27 / 0.05 = 25.399..).
const GRID_EPSILON: f32 = 1e-3;

/// Unit system used for display, entry and pitch interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    /// Millimetres, pitch in mm/rev.
    #[default]
    Metric,
    /// Inches, pitch in threads per inch.
    Imperial,
}

impl UnitSystem {
    /// The other unit system.
    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            UnitSystem::Metric => UnitSystem::Imperial,
            UnitSystem::Imperial => UnitSystem::Metric,
        }
    }

    /// Millimetres per user unit.
    #[inline]
    pub fn scale(self) -> f32 {
        match self {
            UnitSystem::Metric => 1.0,
            UnitSystem::Imperial => MM_PER_INCH,
        }
    }

    /// Convert a length (or speed) expressed in `self` into `target`.
    #[inline]
    pub fn convert_length(self, value: f32, target: UnitSystem) -> f32 {
        value * self.scale() / target.scale()
    }

    /// Valid pitch range in this system's convention.
    pub fn pitch_range(self) -> (f32, f32) {
        match self {
            UnitSystem::Metric => (METRIC_PITCH_MIN, METRIC_PITCH_MAX),
            UnitSystem::Imperial => (IMPERIAL_PITCH_MIN, IMPERIAL_PITCH_MAX),
        }
    }

    /// Pitch increment for one knob detent.
    pub fn pitch_step(self) -> f32 {
        match self {
            UnitSystem::Metric => METRIC_PITCH_STEP,
            UnitSystem::Imperial => IMPERIAL_PITCH_STEP,
        }
    }

    /// Clamp a pitch into this system's valid range.
    pub fn clamp_pitch(self, pitch: f32) -> f32 {
        let (min, max) = self.pitch_range();
        if pitch.is_nan() {
            return min;
        }
        pitch.clamp(min, max)
    }

    /// Remap a pitch given in `self` into `target` (mm/rev <-> TPI).
    ///
    /// TPI and mm/rev are reciprocal, so the result is snapped down onto the
    /// target grid (0.05 mm or whole TPI) and clamped. This is an
    /// approximation: flipping twice does not in general restore the input.
    pub fn remap_pitch(self, pitch: f32, target: UnitSystem) -> f32 {
        if self == target {
            return target.clamp_pitch(pitch);
        }
        let reciprocal = MM_PER_INCH / pitch;
        let snapped = match target {
            UnitSystem::Metric => {
                floorf(reciprocal / METRIC_PITCH_STEP + GRID_EPSILON) * METRIC_PITCH_STEP
            }
            UnitSystem::Imperial => floorf(reciprocal + GRID_EPSILON),
        };
        target.clamp_pitch(snapped)
    }

    /// Short unit label ("mm" / "in") or spelled name ("Metric" / "Inch").
    pub fn label(self, spelled: bool) -> &'static str {
        match (self, spelled) {
            (UnitSystem::Metric, true) => "Metric",
            (UnitSystem::Metric, false) => "mm",
            (UnitSystem::Imperial, true) => "Inch",
            (UnitSystem::Imperial, false) => "in",
        }
    }
}

/// Stateless conversions between steps and user units.
///
/// Parameterized by the calibration's steps per millimetre and the active
/// unit system. Cheap to construct; build one whenever either changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConverter {
    steps_per_mm: f32,
    units: UnitSystem,
}

impl UnitConverter {
    /// Create a converter for a calibration and unit system.
    #[inline]
    pub fn new(calibration: &Calibration, units: UnitSystem) -> Self {
        Self {
            steps_per_mm: calibration.steps_per_unit as f32,
            units,
        }
    }

    /// Active unit system.
    #[inline]
    pub fn units(&self) -> UnitSystem {
        self.units
    }

    /// Steps per user unit.
    #[inline]
    pub fn steps_per_unit(&self) -> f32 {
        self.steps_per_mm * self.units.scale()
    }

    /// Convert a length in user units to steps (truncating toward zero).
    #[inline]
    pub fn to_steps(&self, units: f32) -> i64 {
        (units * self.steps_per_unit()) as i64
    }

    /// Convert a speed in user units per second to steps per second.
    #[inline]
    pub fn speed_to_steps(&self, units_per_sec: f32) -> f32 {
        units_per_sec * self.steps_per_unit()
    }

    /// Convert steps to user units.
    #[inline]
    pub fn to_units(&self, steps: i64) -> f32 {
        steps as f32 / self.steps_per_unit()
    }

    /// Carriage travel in steps for `revs` spindle revolutions at `pitch`.
    ///
    /// Metric pitch is length per revolution and multiplies; imperial pitch
    /// is threads per inch and divides.
    pub fn thread_steps(&self, pitch: f32, revs: f64) -> i64 {
        let mm_per_rev = match self.units {
            UnitSystem::Metric => pitch as f64,
            UnitSystem::Imperial => 25.4_f64 / pitch as f64,
        };
        (revs * self.steps_per_mm as f64 * mm_per_rev) as i64
    }
}
