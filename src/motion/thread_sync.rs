//! Thread synchronization control law.
//!
//! While engaged, the carriage target is a pure function of spindle
//! position since engagement:
//!
//! ```text
//! revs   = (rotation_count - thread_offset_rev) + phase + start_offset
//! Right: target = max(offset - thread_steps(pitch, revs), offset)
//! Left:  target = min(offset + thread_steps(pitch, revs), offset)
//! ```
//!
//! `thread_offset_rev` is taken one revolution behind the engagement
//! revolution, so every pass locks onto the same spindle angle.

use crate::axis::InputSnapshot;
use crate::config::UnitSystem;
use crate::context::ControlContext;

use super::Direction;

/// Largest number of thread starts.
pub const MAX_STARTS: u8 = 5;

/// Thread geometry: pitch and multi-start selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreadSpec {
    pitch: f32,
    num_starts: u8,
    active_start: u8,
    start_offset: f32,
}

impl ThreadSpec {
    /// Single-start thread at `pitch`, clamped into the range of `units`.
    pub fn new(pitch: f32, units: UnitSystem) -> Self {
        Self {
            pitch: units.clamp_pitch(pitch),
            num_starts: 1,
            active_start: 1,
            start_offset: 0.0,
        }
    }

    /// Pitch in mm/rev (metric) or threads per inch (imperial).
    #[inline]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Total number of starts, 1..=5.
    #[inline]
    pub fn num_starts(&self) -> u8 {
        self.num_starts
    }

    /// Start currently being cut, 1..=num_starts.
    #[inline]
    pub fn active_start(&self) -> u8 {
        self.active_start
    }

    /// Revolution fraction added for the active start.
    #[inline]
    pub fn start_offset(&self) -> f32 {
        self.start_offset
    }

    /// Set the pitch, clamped into the range of `units`. Returns the stored value.
    pub fn set_pitch(&mut self, pitch: f32, units: UnitSystem) -> f32 {
        self.pitch = units.clamp_pitch(pitch);
        self.pitch
    }

    /// Move the pitch by `detents` knob steps of the active system.
    pub fn nudge_pitch(&mut self, detents: i32, units: UnitSystem) -> f32 {
        self.set_pitch(self.pitch + detents as f32 * units.pitch_step(), units)
    }

    /// Re-express the pitch after a unit flip (lossy, see [`UnitSystem::remap_pitch`]).
    pub fn remap_pitch(&mut self, from: UnitSystem, to: UnitSystem) {
        self.pitch = from.remap_pitch(self.pitch, to);
    }

    /// Set the number of starts (clamped to 1..=5); the active start is
    /// pulled down if it no longer exists.
    pub fn set_num_starts(&mut self, num_starts: u8) {
        self.num_starts = num_starts.clamp(1, MAX_STARTS);
        self.active_start = self.active_start.min(self.num_starts);
        self.update_start_offset();
    }

    /// Select the start to cut, clamped to 1..=num_starts.
    pub fn set_active_start(&mut self, start: u8) {
        self.active_start = start.clamp(1, self.num_starts);
        self.update_start_offset();
    }

    fn update_start_offset(&mut self) {
        self.start_offset = (self.active_start - 1) as f32 / self.num_starts as f32;
    }
}

/// An engaged threading pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadingSession {
    /// Carriage travel direction.
    pub direction: Direction,
    /// Revolution the geometry is measured from.
    pub thread_offset_rev: i64,
    /// Axis position at engagement.
    pub position_offset_steps: i64,
    /// Last target issued.
    pub last_target: i64,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisengageReason {
    /// Jogging under the switch and the direction button was let go.
    Released,
    /// Jogging under the switch and the opposite button was pressed.
    Conflict,
    /// Switch off and the target reached the endstop.
    EndstopReached,
    /// Ended by the controller (page change).
    Cancelled,
}

/// Session transition reported by [`ThreadSyncEngine::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncEvent {
    /// A session started.
    Engaged(Direction),
    /// A session ended.
    Disengaged(DisengageReason),
}

/// Result of one engine tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncOutput {
    /// Target to command, if any.
    pub target: Option<i64>,
    /// Geometric target before the offset and endstop clamps.
    pub raw_target: Option<i64>,
    /// Axis speed cap, always the calibration's max step rate.
    pub max_speed: f32,
    /// Session transition this tick.
    pub event: Option<SyncEvent>,
}

/// Thread-cutting control law: Disengaged or Engaged(direction).
#[derive(Debug, Clone, Default)]
pub struct ThreadSyncEngine {
    session: Option<ThreadingSession>,
}

impl ThreadSyncEngine {
    /// Create a disengaged engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a session is active.
    #[inline]
    pub fn is_engaged(&self) -> bool {
        self.session.is_some()
    }

    /// Active session, if any.
    #[inline]
    pub fn session(&self) -> Option<&ThreadingSession> {
        self.session.as_ref()
    }

    /// End the session without issuing a target. Returns whether one was active.
    pub fn disengage(&mut self) -> bool {
        let was_engaged = self.session.take().is_some();
        if was_engaged {
            info!("threading cancelled");
        }
        was_engaged
    }

    /// Run one tick of the control law.
    pub fn update(&mut self, ctx: &ControlContext, inputs: &InputSnapshot) -> SyncOutput {
        let mut out = SyncOutput {
            target: None,
            raw_target: None,
            max_speed: ctx.calibration.max_step_rate as f32,
            event: None,
        };

        let switch_on = inputs.held.enable;

        let mut session = match self.session {
            Some(session) => session,
            None => match Self::engage(ctx, inputs) {
                Some(session) => {
                    info!(
                        "threading engaged: rev {=i64} offset {=i64}",
                        session.thread_offset_rev,
                        session.position_offset_steps
                    );
                    out.event = Some(SyncEvent::Engaged(session.direction));
                    session
                }
                None => return out,
            },
        };

        // Jogging under the switch: the pass lives only while its button is held.
        if switch_on {
            let reason = if inputs.held.direction(session.direction.opposite()) {
                Some(DisengageReason::Conflict)
            } else if !inputs.held.direction(session.direction) {
                Some(DisengageReason::Released)
            } else {
                None
            };
            if let Some(reason) = reason {
                self.session = None;
                debug!("threading released");
                out.event = Some(SyncEvent::Disengaged(reason));
                return out;
            }
        }

        let revs = (ctx.spindle.rotation_count - session.thread_offset_rev) as f64
            + ctx.spindle.phase as f64
            + ctx.thread.start_offset() as f64;
        let travel = ctx.converter().thread_steps(ctx.thread.pitch(), revs);
        let offset = session.position_offset_steps;

        let raw = match session.direction {
            Direction::Right => offset - travel,
            Direction::Left => offset + travel,
        };
        let mut target = match session.direction {
            Direction::Right => raw.max(offset),
            Direction::Left => raw.min(offset),
        };
        out.raw_target = Some(raw);

        // A stop behind the engage point ends the pass where it started
        // instead of reversing the carriage.
        let mut finished = false;
        if !switch_on {
            if let Some(stop) = ctx.endstops.side(session.direction).steps() {
                let (reached, limit) = match session.direction {
                    Direction::Right => (target >= stop, stop.max(offset)),
                    Direction::Left => (target <= stop, stop.min(offset)),
                };
                if reached {
                    target = limit;
                    finished = true;
                }
            }
        }

        out.target = Some(target);
        session.last_target = target;

        if finished {
            info!("threading reached endstop at {=i64}", target);
            self.session = None;
            out.event = Some(SyncEvent::Disengaged(DisengageReason::EndstopReached));
        } else {
            self.session = Some(session);
        }

        out
    }

    fn engage(ctx: &ControlContext, inputs: &InputSnapshot) -> Option<ThreadingSession> {
        let switch_on = inputs.held.enable;
        let position = ctx.position_steps;

        let direction = [Direction::Left, Direction::Right].into_iter().find(|&dir| {
            inputs.pressed.direction(dir)
                && !inputs.held.direction(dir.opposite())
                && (switch_on || ctx.endstops.has_room(dir, position))
        })?;

        Some(ThreadingSession {
            direction,
            thread_offset_rev: ctx.spindle.rotation_count - 1,
            position_offset_steps: position,
            last_target: position,
        })
    }
}
