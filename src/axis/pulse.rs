//! Non-blocking STEP/DIR stepper axis.
//!
//! Generic over embedded-hal 1.0 pin types. Each call to `run` emits at
//! most one step, when the current step interval has elapsed, then derives
//! the next interval from a constant-acceleration ramp:
//!
//! ```text
//! c0 = 0.676 * sqrt(2 / accel) * 1e6        first interval (us)
//! cn = c(n-1) - 2 * c(n-1) / (4n + 1)      accelerating
//! cn >= cmin = 1e6 / max_speed
//! ```
//!
//! A negative `n` means decelerating toward the stopping point.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use libm::{fabsf, sqrtf};

use crate::error::{MotorError, Result};
use crate::motion::Direction;

use super::{Clock, StepperAxis};

/// STEP pulse width in microseconds.
const PULSE_WIDTH_US: u32 = 2;

/// Pin-driven stepper axis.
///
/// Generic over:
/// - `STEP`: STEP pin type (must implement `OutputPin`)
/// - `DIR`: DIR pin type (must implement `OutputPin`)
/// - `DELAY`: Delay provider for the pulse width (must implement `DelayNs`)
/// - `CLK`: Microsecond clock for step scheduling
pub struct PulseAxis<STEP, DIR, DELAY, CLK>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
    CLK: Clock,
{
    step_pin: STEP,
    dir_pin: DIR,
    delay: DELAY,
    clock: CLK,

    /// Whether direction pin logic is inverted.
    invert_direction: bool,
    /// Direction last written to the DIR pin.
    pin_direction: Option<Direction>,

    position: i64,
    target: i64,
    /// Signed speed in steps/s.
    speed: f32,
    max_speed: f32,
    acceleration: f32,
    direction: Direction,

    /// Ramp step counter.
    n: i64,
    /// First step interval, us.
    c0: f32,
    /// Current step interval, us.
    cn: f32,
    /// Shortest interval at max speed, us.
    cmin: f32,
    /// Interval to wait before the next step, 0 when stopped.
    step_interval_us: u64,
    last_step_us: u64,
}

impl<STEP, DIR, DELAY, CLK> PulseAxis<STEP, DIR, DELAY, CLK>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
    CLK: Clock,
{
    /// Create a stopped axis at position zero with 1 step/s caps.
    pub fn new(step_pin: STEP, dir_pin: DIR, delay: DELAY, clock: CLK) -> Self {
        let mut axis = Self {
            step_pin,
            dir_pin,
            delay,
            clock,
            invert_direction: false,
            pin_direction: None,
            position: 0,
            target: 0,
            speed: 0.0,
            max_speed: 1.0,
            acceleration: 0.0,
            direction: Direction::Right,
            n: 0,
            c0: 0.0,
            cn: 0.0,
            cmin: 1_000_000.0,
            step_interval_us: 0,
            last_step_us: 0,
        };
        axis.set_acceleration(1.0);
        axis
    }

    /// Invert the DIR pin logic.
    pub fn with_inverted_direction(mut self, invert: bool) -> Self {
        self.invert_direction = invert;
        self
    }

    /// Signed speed in steps/s.
    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Current target in steps.
    #[inline]
    pub fn target(&self) -> i64 {
        self.target
    }

    /// Steps remaining to the target.
    #[inline]
    pub fn distance_to_go(&self) -> i64 {
        self.target - self.position
    }

    fn compute_new_speed(&mut self) {
        let distance_to = self.distance_to_go();
        let steps_to_stop = ((self.speed * self.speed) / (2.0 * self.acceleration)) as i64;

        if distance_to == 0 && steps_to_stop <= 1 {
            // At the target and slow enough to stop.
            self.step_interval_us = 0;
            self.speed = 0.0;
            self.n = 0;
            return;
        }

        if distance_to > 0 {
            if self.n > 0 {
                // Accelerating: start decelerating if we would overshoot or are reversing.
                if steps_to_stop >= distance_to || self.direction == Direction::Left {
                    self.n = -steps_to_stop;
                }
            } else if self.n < 0 && steps_to_stop < distance_to && self.direction == Direction::Right {
                self.n = -self.n;
            }
        } else if distance_to < 0 {
            if self.n > 0 {
                if steps_to_stop >= -distance_to || self.direction == Direction::Right {
                    self.n = -steps_to_stop;
                }
            } else if self.n < 0 && steps_to_stop < -distance_to && self.direction == Direction::Left {
                self.n = -self.n;
            }
        }

        if self.n == 0 {
            // First step from rest.
            self.cn = self.c0;
            self.direction = if distance_to > 0 {
                Direction::Right
            } else {
                Direction::Left
            };
        } else {
            self.cn -= (2.0 * self.cn) / ((4 * self.n + 1) as f32);
            self.cn = self.cn.max(self.cmin);
        }
        self.n += 1;
        self.step_interval_us = self.cn as u64;
        self.speed = 1_000_000.0 / self.cn;
        if self.direction == Direction::Left {
            self.speed = -self.speed;
        }
    }

    fn set_direction(&mut self, direction: Direction) -> core::result::Result<(), MotorError> {
        if self.pin_direction == Some(direction) {
            return Ok(());
        }

        let pin_high = match direction {
            Direction::Right => !self.invert_direction,
            Direction::Left => self.invert_direction,
        };

        if pin_high {
            self.dir_pin.set_high().map_err(|_| MotorError::PinError)?;
        } else {
            self.dir_pin.set_low().map_err(|_| MotorError::PinError)?;
        }

        self.pin_direction = Some(direction);
        Ok(())
    }

    fn pulse(&mut self) -> core::result::Result<(), MotorError> {
        self.set_direction(self.direction)?;
        self.step_pin.set_high().map_err(|_| MotorError::PinError)?;
        self.delay.delay_us(PULSE_WIDTH_US);
        self.step_pin.set_low().map_err(|_| MotorError::PinError)
    }

    /// Step once if the interval has elapsed.
    fn run_speed(&mut self) -> Result<bool> {
        if self.step_interval_us == 0 {
            return Ok(false);
        }

        let now = self.clock.now_us();
        if now.saturating_sub(self.last_step_us) < self.step_interval_us {
            return Ok(false);
        }

        self.position += self.direction.sign();
        self.pulse()?;
        self.last_step_us = now;
        Ok(true)
    }
}

impl<STEP, DIR, DELAY, CLK> StepperAxis for PulseAxis<STEP, DIR, DELAY, CLK>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
    CLK: Clock,
{
    fn move_to(&mut self, target: i64) {
        if self.target != target {
            self.target = target;
            self.compute_new_speed();
        }
    }

    fn stop(&mut self) {
        if self.speed != 0.0 {
            let steps_to_stop = ((self.speed * self.speed) / (2.0 * self.acceleration)) as i64 + 1;
            let target = if self.speed > 0.0 {
                self.position + steps_to_stop
            } else {
                self.position - steps_to_stop
            };
            self.move_to(target);
        }
    }

    fn run(&mut self) -> Result<bool> {
        let stepped = self.run_speed()?;
        if stepped {
            self.compute_new_speed();
        }
        Ok(stepped)
    }

    fn current_position(&self) -> i64 {
        self.position
    }

    fn set_current_position(&mut self, position: i64) {
        self.position = position;
        self.target = position;
        self.n = 0;
        self.step_interval_us = 0;
        self.speed = 0.0;
    }

    fn set_max_speed(&mut self, steps_per_sec: f32) {
        let steps_per_sec = fabsf(steps_per_sec).max(1.0);
        if self.max_speed != steps_per_sec {
            self.max_speed = steps_per_sec;
            self.cmin = 1_000_000.0 / steps_per_sec;
            if self.n > 0 {
                // Recompute the ramp position for the new cap.
                self.n = ((self.speed * self.speed) / (2.0 * self.acceleration)) as i64;
                self.compute_new_speed();
            }
        }
    }

    fn set_acceleration(&mut self, steps_per_sec2: f32) {
        let steps_per_sec2 = fabsf(steps_per_sec2);
        if steps_per_sec2 == 0.0 || self.acceleration == steps_per_sec2 {
            return;
        }
        if self.acceleration > 0.0 {
            self.n = (self.n as f32 * (self.acceleration / steps_per_sec2)) as i64;
        }
        // Equation 15 of the constant-acceleration stepper timing derivation.
        self.c0 = 0.676 * sqrtf(2.0 / steps_per_sec2) * 1_000_000.0;
        self.acceleration = steps_per_sec2;
        self.compute_new_speed();
    }

    fn is_running(&self) -> bool {
        !(self.speed == 0.0 && self.target == self.position)
    }
}
