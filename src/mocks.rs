//! Deterministic fakes for the hardware traits.
//!
//! Used by the integration tests and the simulated lathe demo. Everything
//! here is synchronous and driven by the caller.

use std::collections::{HashMap, VecDeque};
use std::string::{String, ToString};
use std::vec::Vec;

use crate::axis::{DigitalInputs, Display, Encoder, InputLevels, InputSnapshot, StepperAxis};
use crate::config::{CalibrationRecord, ConfigStore};
use crate::error::{Result, StoreError};
use crate::motion::Direction;
use crate::ui::{KeyEvent, PageId};

/// Axis that moves up to `steps_per_run` steps toward its target per `run()`.
#[derive(Debug, Clone)]
pub struct MockAxis {
    position: i64,
    target: i64,
    steps_per_run: i64,
    /// Last speed cap set.
    pub max_speed: f32,
    /// Last acceleration set.
    pub acceleration: f32,
    /// Number of `stop()` calls.
    pub stops: usize,
    /// Every target passed to `move_to`.
    pub targets: Vec<i64>,
}

impl MockAxis {
    /// Axis at zero moving `steps_per_run` steps per call.
    pub fn new(steps_per_run: i64) -> Self {
        Self {
            position: 0,
            target: 0,
            steps_per_run: steps_per_run.max(1),
            max_speed: 0.0,
            acceleration: 0.0,
            stops: 0,
            targets: Vec::new(),
        }
    }

    /// Current target.
    pub fn target(&self) -> i64 {
        self.target
    }
}

impl StepperAxis for MockAxis {
    fn move_to(&mut self, target: i64) {
        self.target = target;
        self.targets.push(target);
    }

    fn stop(&mut self) {
        self.target = self.position;
        self.stops += 1;
    }

    fn run(&mut self) -> Result<bool> {
        let remaining = self.target - self.position;
        if remaining == 0 {
            return Ok(false);
        }
        self.position += remaining.clamp(-self.steps_per_run, self.steps_per_run);
        Ok(true)
    }

    fn current_position(&self) -> i64 {
        self.position
    }

    fn set_current_position(&mut self, position: i64) {
        self.position = position;
        self.target = position;
    }

    fn set_max_speed(&mut self, steps_per_sec: f32) {
        self.max_speed = steps_per_sec;
    }

    fn set_acceleration(&mut self, steps_per_sec2: f32) {
        self.acceleration = steps_per_sec2;
    }

    fn is_running(&self) -> bool {
        self.position != self.target
    }
}

/// Encoder returning whatever count was last set.
#[derive(Debug, Clone, Default)]
pub struct MockEncoder {
    /// Count returned by `read()`.
    pub ticks: i32,
}

impl Encoder for MockEncoder {
    fn read(&mut self) -> i32 {
        self.ticks
    }
}

/// Inputs set directly by the test; edges are derived between samples.
#[derive(Debug, Clone, Default)]
pub struct MockInputs {
    /// Levels returned by the next sample.
    pub levels: InputLevels,
    previous: InputLevels,
}

impl MockInputs {
    /// Hold or release a direction button.
    pub fn set_button(&mut self, dir: Direction, held: bool) {
        match dir {
            Direction::Left => self.levels.left = held,
            Direction::Right => self.levels.right = held,
        }
    }

    /// Turn the enable switch on or off.
    pub fn set_switch(&mut self, on: bool) {
        self.levels.enable = on;
    }
}

impl DigitalInputs for MockInputs {
    fn sample(&mut self) -> Result<InputSnapshot> {
        let snapshot = InputSnapshot::from_levels(&self.previous, self.levels);
        self.previous = self.levels;
        Ok(snapshot)
    }
}

/// Display that records writes and serves queued key events.
#[derive(Debug, Clone, Default)]
pub struct MockDisplay {
    texts: HashMap<String, String>,
    numbers: HashMap<String, i32>,
    visible: HashMap<String, bool>,
    keys: VecDeque<KeyEvent>,
    /// Pages passed to `goto_page`, in order.
    pub pages: Vec<PageId>,
    /// Total field writes.
    pub writes: usize,
}

impl MockDisplay {
    /// Queue a key event for the controller to poll.
    pub fn push_key(&mut self, page: PageId, value: i32) {
        self.keys.push_back(KeyEvent::new(page, value));
    }

    /// Last text written to `field`.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.texts.get(field).map(String::as_str)
    }

    /// Last number written to `field`.
    pub fn number(&self, field: &str) -> Option<i32> {
        self.numbers.get(field).copied()
    }

    /// Last visibility set for `widget`.
    pub fn is_visible(&self, widget: &str) -> Option<bool> {
        self.visible.get(widget).copied()
    }

    /// Last page switched to.
    pub fn current_page(&self) -> Option<PageId> {
        self.pages.last().copied()
    }
}

impl Display for MockDisplay {
    fn write_text(&mut self, field: &str, value: &str) {
        self.texts.insert(field.to_string(), value.to_string());
        self.writes += 1;
    }

    fn write_number(&mut self, field: &str, value: i32) {
        self.numbers.insert(field.to_string(), value);
        self.writes += 1;
    }

    fn set_visible(&mut self, widget: &str, visible: bool) {
        self.visible.insert(widget.to_string(), visible);
        self.writes += 1;
    }

    fn goto_page(&mut self, page: PageId) {
        self.pages.push(page);
    }

    fn poll_key(&mut self) -> Option<KeyEvent> {
        self.keys.pop_front()
    }
}

/// Store whose writes always fail, optionally pre-seeded with a record.
#[derive(Debug, Clone, Default)]
pub struct FailingStore {
    record: Option<CalibrationRecord>,
    /// Number of attempted writes.
    pub attempts: usize,
}

impl FailingStore {
    /// Store that reports `record` on read.
    pub fn with_record(record: CalibrationRecord) -> Self {
        Self {
            record: Some(record),
            attempts: 0,
        }
    }
}

impl ConfigStore for FailingStore {
    fn get(&mut self, _key: &str) -> Option<CalibrationRecord> {
        self.record
    }

    fn put(&mut self, _key: &str, _record: &CalibrationRecord) -> core::result::Result<(), StoreError> {
        self.attempts += 1;
        Err(StoreError::WriteFailed(heapless::String::try_from("flash busy").unwrap_or_default()))
    }
}
