//! Hardware capabilities injected into the control loop.
//!
//! The controller only talks to these traits, so the same loop runs against
//! real pins ([`PulseAxis`], [`PinInputs`]) or the deterministic fakes in
//! `mocks`.

mod pins;
mod pulse;

pub use pins::PinInputs;
pub use pulse::PulseAxis;

use crate::error::Result;
use crate::motion::Direction;
use crate::ui::{KeyEvent, NamedColor, PageId};

/// Stepper-driven carriage axis running asynchronously toward a target.
///
/// Implementations honour the speed and acceleration caps with a
/// trapezoidal profile and approach the target monotonically.
pub trait StepperAxis {
    /// Set an absolute target in steps.
    fn move_to(&mut self, target: i64);

    /// Decelerate to a stop as quickly as the acceleration cap allows.
    fn stop(&mut self);

    /// Advance motion; called once per loop iteration. Returns whether a
    /// step was taken.
    fn run(&mut self) -> Result<bool>;

    /// Current absolute position in steps.
    fn current_position(&self) -> i64;

    /// Redefine the current position (zeroing). Stops motion.
    fn set_current_position(&mut self, position: i64);

    /// Speed cap in steps/s.
    fn set_max_speed(&mut self, steps_per_sec: f32);

    /// Acceleration in steps/s².
    fn set_acceleration(&mut self, steps_per_sec2: f32);

    /// Whether the axis is moving or has distance left to go.
    fn is_running(&self) -> bool;
}

/// Spindle quadrature encoder, already decoded.
pub trait Encoder {
    /// Signed count; wraps only at the i32 bounds.
    fn read(&mut self) -> i32;
}

/// Monotonic microsecond time source.
pub trait Clock {
    /// Microseconds since an arbitrary epoch.
    fn now_us(&self) -> u64;
}

/// Touchscreen display.
///
/// Writes are fire-and-forget; the core never waits for acknowledgement.
pub trait Display {
    /// Write a text field, e.g. `powerfeed.position.txt`.
    fn write_text(&mut self, field: &str, value: &str);

    /// Write a numeric field.
    fn write_number(&mut self, field: &str, value: i32);

    /// Write a named color to a color attribute.
    fn write_color(&mut self, field: &str, color: NamedColor) {
        self.write_number(field, color.rgb565() as i32);
    }

    /// Show or hide a widget on the current page.
    fn set_visible(&mut self, widget: &str, visible: bool);

    /// Switch the visible page.
    fn goto_page(&mut self, page: PageId);

    /// Next pending key event, if any.
    fn poll_key(&mut self) -> Option<KeyEvent>;
}

/// Debounced digital inputs sampled once per tick.
pub trait DigitalInputs {
    /// Read all inputs and derive edges against the previous sample.
    fn sample(&mut self) -> Result<InputSnapshot>;
}

/// Asserted state of every input. Asserted means pressed, or switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputLevels {
    /// Knob quadrature channel A.
    pub knob_a: bool,
    /// Knob quadrature channel B.
    pub knob_b: bool,
    /// Knob push button.
    pub knob_button: bool,
    /// Left direction button.
    pub left: bool,
    /// Right direction button.
    pub right: bool,
    /// Enable (jog) switch.
    pub enable: bool,
}

impl InputLevels {
    /// Direction button state.
    #[inline]
    pub fn direction(&self, dir: Direction) -> bool {
        match dir {
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    /// Inputs asserted in `self` but not in `previous`.
    pub fn rising_from(&self, previous: &InputLevels) -> InputLevels {
        InputLevels {
            knob_a: self.knob_a && !previous.knob_a,
            knob_b: self.knob_b && !previous.knob_b,
            knob_button: self.knob_button && !previous.knob_button,
            left: self.left && !previous.left,
            right: self.right && !previous.right,
            enable: self.enable && !previous.enable,
        }
    }
}

/// Levels and newly-asserted edges for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputSnapshot {
    /// Current levels.
    pub held: InputLevels,
    /// Inputs that became asserted this tick (the active-low fall edge).
    pub pressed: InputLevels,
}

impl InputSnapshot {
    /// Build a snapshot from the previous and current levels.
    pub fn from_levels(previous: &InputLevels, held: InputLevels) -> Self {
        Self {
            pressed: held.rising_from(previous),
            held,
        }
    }

    /// Knob detent this tick: +1, -1 or 0.
    ///
    /// A detent is a knob-A edge; knob B released means clockwise.
    pub fn knob_detent(&self) -> i32 {
        match (self.pressed.knob_a, self.held.knob_b) {
            (false, _) => 0,
            (true, false) => 1,
            (true, true) => -1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges() {
        let prev = InputLevels {
            left: true,
            ..InputLevels::default()
        };
        let now = InputLevels {
            left: true,
            right: true,
            enable: true,
            ..InputLevels::default()
        };
        let snap = InputSnapshot::from_levels(&prev, now);
        assert!(!snap.pressed.left);
        assert!(snap.pressed.right);
        assert!(snap.pressed.enable);
        assert!(snap.held.direction(Direction::Left));
    }

    #[test]
    fn test_knob_detent() {
        let mut snap = InputSnapshot::default();
        assert_eq!(snap.knob_detent(), 0);
        snap.pressed.knob_a = true;
        assert_eq!(snap.knob_detent(), 1);
        snap.held.knob_b = true;
        assert_eq!(snap.knob_detent(), -1);
    }
}
