//! Jog and endstop-seek control law.

use libm::fabsf;

use crate::axis::InputSnapshot;
use crate::config::UnitSystem;
use crate::context::ControlContext;

use super::Direction;

/// Fastest jog speed, mm/s.
const MAX_JOG_MM_PER_SEC: f32 = 10.0;

/// Knob step size for jog speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JogMultiplier {
    /// 0.01 per detent.
    Fine,
    /// 0.1 per detent.
    #[default]
    Medium,
    /// 1 per detent.
    Coarse,
}

impl JogMultiplier {
    /// Detent size in display units (mm/s or in/min).
    pub fn value(self) -> f32 {
        match self {
            JogMultiplier::Fine => 0.01,
            JogMultiplier::Medium => 0.1,
            JogMultiplier::Coarse => 1.0,
        }
    }

    /// Match a configured value.
    pub fn from_value(value: f32) -> Option<Self> {
        [JogMultiplier::Fine, JogMultiplier::Medium, JogMultiplier::Coarse]
            .into_iter()
            .find(|m| fabsf(m.value() - value) < 1e-6)
    }
}

/// Jog speed and knob multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedSession {
    /// Jog speed in user units per second.
    pub speed: f32,
    /// Knob step size.
    pub multiplier: JogMultiplier,
}

impl Default for FeedSession {
    fn default() -> Self {
        Self {
            speed: 1.0,
            multiplier: JogMultiplier::Medium,
        }
    }
}

impl FeedSession {
    /// Speed change per knob detent in units/s. Imperial speed is shown
    /// per minute, so its detent is a sixtieth.
    pub fn detent(&self, units: UnitSystem) -> f32 {
        match units {
            UnitSystem::Metric => self.multiplier.value(),
            UnitSystem::Imperial => self.multiplier.value() / 60.0,
        }
    }

    /// Adjust the speed by `detents` knob steps, clamped to one detent
    /// at the bottom and 10 mm/s at the top.
    pub fn nudge_speed(&mut self, detents: i32, units: UnitSystem) -> f32 {
        let step = self.detent(units);
        let max = MAX_JOG_MM_PER_SEC / units.scale();
        self.speed = (self.speed + detents as f32 * step).clamp(step, max.max(step));
        self.speed
    }

    /// Re-express the speed after a unit flip. Exact up to float rounding.
    pub fn rescale(&mut self, from: UnitSystem, to: UnitSystem) {
        self.speed = from.convert_length(self.speed, to);
    }
}

/// Axis command from the feed law.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedCommand {
    /// Move to an absolute position.
    MoveTo(i64),
    /// Decelerate to a stop.
    Stop,
    /// Issue nothing this tick.
    Hold,
}

/// Result of one feed tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedOutput {
    /// Command for the axis.
    pub command: FeedCommand,
    /// Speed cap in steps/s from the jog speed.
    pub max_speed: f32,
}

/// Jog/endstop control law for the non-threading pages.
///
/// Switch on: a held button re-targets `chunk` steps past the current
/// position every tick, so the axis runs until the button is released.
/// Switch off: a held button seeks that side's endstop if it is enabled.
/// Left wins when both buttons are held.
#[derive(Debug, Clone)]
pub struct FeedEngine {
    chunk_steps: i64,
}

impl FeedEngine {
    /// Create an engine with the given jog chunk.
    pub fn new(chunk_steps: u32) -> Self {
        Self {
            chunk_steps: chunk_steps.max(1) as i64,
        }
    }

    /// Jog chunk in steps.
    #[inline]
    pub fn chunk_steps(&self) -> i64 {
        self.chunk_steps
    }

    /// Run one tick of the control law.
    pub fn update(
        &self,
        ctx: &ControlContext,
        inputs: &InputSnapshot,
        axis_running: bool,
    ) -> FeedOutput {
        let max_speed = ctx.converter().speed_to_steps(ctx.feed.speed);
        let position = ctx.position_steps;
        let held = [Direction::Left, Direction::Right]
            .into_iter()
            .find(|&dir| inputs.held.direction(dir));

        let command = if inputs.held.enable {
            match held {
                Some(dir) => FeedCommand::MoveTo(position + dir.sign() * self.chunk_steps),
                None if axis_running => FeedCommand::Stop,
                None => FeedCommand::Hold,
            }
        } else {
            [Direction::Left, Direction::Right]
                .into_iter()
                .filter(|&dir| inputs.held.direction(dir))
                .find_map(|dir| ctx.endstops.side(dir).steps())
                .map_or(FeedCommand::Hold, FeedCommand::MoveTo)
        };

        FeedOutput { command, max_speed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MM_PER_INCH;

    #[test]
    fn test_multiplier_from_value() {
        assert_eq!(JogMultiplier::from_value(0.01), Some(JogMultiplier::Fine));
        assert_eq!(JogMultiplier::from_value(1.0), Some(JogMultiplier::Coarse));
        assert_eq!(JogMultiplier::from_value(0.5), None);
        assert_eq!(JogMultiplier::from_value(0.100_000_5), Some(JogMultiplier::Medium));
        assert_eq!(JogMultiplier::from_value(-0.1), None);
    }

    #[test]
    fn test_nudge_speed_metric() {
        let mut feed = FeedSession::default();
        assert!((feed.nudge_speed(3, UnitSystem::Metric) - 1.3).abs() < 1e-5);
        assert!((feed.nudge_speed(-100, UnitSystem::Metric) - 0.1).abs() < 1e-6);
        feed.multiplier = JogMultiplier::Coarse;
        assert_eq!(feed.nudge_speed(50, UnitSystem::Metric), 10.0);
    }

    #[test]
    fn test_nudge_speed_imperial() {
        let mut feed = FeedSession {
            speed: 0.1,
            multiplier: JogMultiplier::Coarse,
        };
        let after = feed.nudge_speed(60, UnitSystem::Imperial);
        assert!((after - 10.0 / MM_PER_INCH).abs() < 1e-5);
    }

    #[test]
    fn test_rescale_roundtrip() {
        let mut feed = FeedSession {
            speed: 2.5,
            multiplier: JogMultiplier::Medium,
        };
        feed.rescale(UnitSystem::Metric, UnitSystem::Imperial);
        assert!((feed.speed - 2.5 / MM_PER_INCH).abs() < 1e-6);
        feed.rescale(UnitSystem::Imperial, UnitSystem::Metric);
        assert!((feed.speed - 2.5).abs() < 1e-5);
    }
}
