//! State shared by the control laws and the page state machine.

use crate::config::{Calibration, Endstop, Endstops, UnitConverter, UnitSystem};
use crate::motion::{Direction, FeedSession, SpindleState, ThreadSpec};

/// Default pitch when starting in metric, mm/rev.
const DEFAULT_METRIC_PITCH: f32 = 1.0;
/// Default pitch when starting in imperial, TPI.
const DEFAULT_IMPERIAL_PITCH: f32 = 20.0;

/// Everything the laws read each tick.
///
/// The controller owns one and lends it out; nothing here touches
/// hardware. Lengths are stored in steps, so a unit flip leaves positions
/// and endstops untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlContext {
    /// Active calibration.
    pub calibration: Calibration,
    /// Display and entry unit system.
    pub units: UnitSystem,
    /// Latest spindle sample.
    pub spindle: SpindleState,
    /// Thread geometry.
    pub thread: ThreadSpec,
    /// Travel stops.
    pub endstops: Endstops,
    /// Jog speed and knob multiplier.
    pub feed: FeedSession,
    /// Carriage position in steps.
    pub position_steps: i64,
    /// Last sampled spindle speed.
    pub rpm: f32,
}

impl ControlContext {
    /// Fresh context at position zero with no stops.
    pub fn new(calibration: Calibration, units: UnitSystem) -> Self {
        let pitch = match units {
            UnitSystem::Metric => DEFAULT_METRIC_PITCH,
            UnitSystem::Imperial => DEFAULT_IMPERIAL_PITCH,
        };
        Self {
            calibration,
            units,
            spindle: SpindleState::default(),
            thread: ThreadSpec::new(pitch, units),
            endstops: Endstops::default(),
            feed: FeedSession::default(),
            position_steps: 0,
            rpm: 0.0,
        }
    }

    /// Converter for the current calibration and units.
    #[inline]
    pub fn converter(&self) -> UnitConverter {
        UnitConverter::new(&self.calibration, self.units)
    }

    /// Carriage position in the current units.
    pub fn position_units(&self) -> f32 {
        self.converter().to_units(self.position_steps)
    }

    /// Endstop position in the current units, `None` when disabled.
    pub fn endstop_units(&self, side: Direction) -> Option<f32> {
        let converter = self.converter();
        self.endstops
            .side(side)
            .steps()
            .map(|steps| converter.to_units(steps))
    }

    /// Set an endstop at the current carriage position.
    pub fn capture_endstop(&mut self, side: Direction) {
        *self.endstops.side_mut(side) = Endstop::at(self.position_steps);
    }

    /// Flip metric/imperial. Jog speed is rescaled and pitch remapped;
    /// step-denominated state is unchanged.
    pub fn invert_units(&mut self) {
        let from = self.units;
        let to = from.flipped();
        self.feed.rescale(from, to);
        self.thread.remap_pitch(from, to);
        self.units = to;
        debug!("units flipped");
    }
}
