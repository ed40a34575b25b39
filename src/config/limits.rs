//! Soft endstops.

use crate::motion::Direction;

use super::units::{UnitConverter, UnitSystem};

/// Largest endstop distance from zero, in millimetres. Entries beyond it
/// are clamped.
pub const MAX_TRAVEL_MM: f32 = 2000.0;

/// One soft endstop, stored in steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Endstop {
    /// Absolute axis position of the stop.
    pub position_steps: i64,
    /// Whether automatic motion honours this stop.
    pub enabled: bool,
}

impl Endstop {
    /// An enabled stop at `position_steps`.
    pub fn at(position_steps: i64) -> Self {
        Self {
            position_steps,
            enabled: true,
        }
    }

    /// Disable and zero the stop.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Position in steps when enabled.
    #[inline]
    pub fn steps(&self) -> Option<i64> {
        self.enabled.then_some(self.position_steps)
    }
}

/// Left and right soft endstops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Endstops {
    /// Stop bounding travel toward negative steps.
    pub left: Endstop,
    /// Stop bounding travel toward positive steps.
    pub right: Endstop,
}

impl Endstops {
    /// Stop on the given side.
    #[inline]
    pub fn side(&self, side: Direction) -> &Endstop {
        match side {
            Direction::Left => &self.left,
            Direction::Right => &self.right,
        }
    }

    /// Mutable stop on the given side.
    #[inline]
    pub fn side_mut(&mut self, side: Direction) -> &mut Endstop {
        match side {
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        }
    }

    /// Set a stop from a user-unit position, clamping to the travel range.
    ///
    /// Returns the position actually stored, in user units.
    pub fn set_units(&mut self, side: Direction, units: f32, converter: &UnitConverter) -> f32 {
        let limit = UnitSystem::Metric.convert_length(MAX_TRAVEL_MM, converter.units());
        let units = if units.is_nan() { 0.0 } else { units.clamp(-limit, limit) };
        *self.side_mut(side) = Endstop::at(converter.to_steps(units));
        units
    }

    /// Whether `position` still lies strictly inside the stop on `side`.
    ///
    /// Always false when that stop is disabled.
    pub fn has_room(&self, side: Direction, position: i64) -> bool {
        match (side, self.side(side).steps()) {
            (Direction::Left, Some(stop)) => position > stop,
            (Direction::Right, Some(stop)) => position < stop,
            (_, None) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Calibration;

    #[test]
    fn test_set_units_clamps() {
        let converter = UnitConverter::new(&Calibration::default(), UnitSystem::Metric);
        let mut stops = Endstops::default();

        let stored = stops.set_units(Direction::Left, -5000.0, &converter);
        assert_eq!(stored, -MAX_TRAVEL_MM);
        assert_eq!(stops.left.steps(), Some(-800_000));

        let stored = stops.set_units(Direction::Right, 12.5, &converter);
        assert_eq!(stored, 12.5);
        assert_eq!(stops.right.steps(), Some(5000));
    }

    #[test]
    fn test_has_room() {
        let mut stops = Endstops::default();
        assert!(!stops.has_room(Direction::Left, 0));

        stops.left = Endstop::at(-100);
        stops.right = Endstop::at(100);
        assert!(stops.has_room(Direction::Left, 0));
        assert!(!stops.has_room(Direction::Left, -100));
        assert!(stops.has_room(Direction::Right, 99));
        assert!(!stops.has_room(Direction::Right, 150));
    }

    #[test]
    fn test_clear() {
        let mut stop = Endstop::at(42);
        stop.clear();
        assert_eq!(stop.steps(), None);
        assert_eq!(stop.position_steps, 0);
    }
}
