//! Digital inputs read from embedded-hal pins.

use embedded_hal::digital::InputPin;

use crate::error::{MotorError, Result};

use super::{DigitalInputs, InputLevels, InputSnapshot};

/// Six active-low, externally debounced input pins.
///
/// A pin reading low is asserted. The first sample reports no edges so a
/// button held at power-up cannot start motion.
pub struct PinInputs<P: InputPin> {
    knob_a: P,
    knob_b: P,
    knob_button: P,
    left: P,
    right: P,
    enable: P,
    previous: Option<InputLevels>,
}

impl<P: InputPin> PinInputs<P> {
    /// Wrap the input pins.
    pub fn new(knob_a: P, knob_b: P, knob_button: P, left: P, right: P, enable: P) -> Self {
        Self {
            knob_a,
            knob_b,
            knob_button,
            left,
            right,
            enable,
            previous: None,
        }
    }

    fn read_levels(&mut self) -> core::result::Result<InputLevels, P::Error> {
        Ok(InputLevels {
            knob_a: self.knob_a.is_low()?,
            knob_b: self.knob_b.is_low()?,
            knob_button: self.knob_button.is_low()?,
            left: self.left.is_low()?,
            right: self.right.is_low()?,
            enable: self.enable.is_low()?,
        })
    }
}

impl<P: InputPin> DigitalInputs for PinInputs<P> {
    fn sample(&mut self) -> Result<InputSnapshot> {
        let held = self.read_levels().map_err(|_| MotorError::PinError)?;
        let previous = self.previous.unwrap_or(held);
        self.previous = Some(held);
        Ok(InputSnapshot::from_levels(&previous, held))
    }
}
