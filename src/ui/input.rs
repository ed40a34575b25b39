//! Numeric entry form.

use core::fmt::Write;

use heapless::String;

use crate::config::CalibrationField;
use crate::error::InputError;
use crate::motion::Direction;

use super::format::trim_float;
use super::{InputKey, PageId};

/// Maximum characters in the entry buffer.
pub const INPUT_CAPACITY: usize = 16;

/// Which value the form is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTarget {
    /// A travel stop, in the current units.
    Stop(Direction),
    /// Thread pitch (mm/rev or TPI).
    Pitch,
    /// A calibration integer.
    Calibration(CalibrationField),
}

/// What the keypad accepts for a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Signed decimal; "use current" allowed.
    Position,
    /// Unsigned decimal.
    Decimal,
    /// Unsigned integer.
    Integer,
}

impl EntryKind {
    /// Whether the sign key is shown and honoured.
    pub fn allows_sign(self) -> bool {
        matches!(self, EntryKind::Position)
    }

    /// Whether the dot key is shown and honoured.
    pub fn allows_dot(self) -> bool {
        !matches!(self, EntryKind::Integer)
    }

    /// Whether "use current position" is shown and honoured.
    pub fn allows_current(self) -> bool {
        matches!(self, EntryKind::Position)
    }
}

impl InputTarget {
    /// Keypad mode for this target.
    pub fn kind(&self) -> EntryKind {
        match self {
            InputTarget::Stop(_) => EntryKind::Position,
            InputTarget::Pitch => EntryKind::Decimal,
            InputTarget::Calibration(_) => EntryKind::Integer,
        }
    }

    /// Question shown above the entry.
    pub fn prompt(&self) -> &'static str {
        match self {
            InputTarget::Stop(Direction::Left) => "Left stop position?",
            InputTarget::Stop(Direction::Right) => "Right stop position?",
            InputTarget::Pitch => "Thread pitch?",
            InputTarget::Calibration(field) => field.prompt(),
        }
    }
}

/// Parsed entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryValue {
    /// Nothing was typed.
    Empty,
    /// A decimal value.
    Decimal(f32),
    /// An integer value.
    Integer(u32),
}

/// Result of one keypad key.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// Still editing; the buffer may have changed.
    Editing,
    /// Buffer cleared while editing a stop; the stop is disabled.
    StopCleared(Direction),
    /// Value accepted; leave the form.
    Commit(EntryValue),
    /// Entry could not be parsed; the form stays open.
    Rejected(InputError),
    /// Leave the form without committing.
    Cancel,
}

/// Numeric entry in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputForm {
    target: InputTarget,
    buffer: String<INPUT_CAPACITY>,
    return_page: PageId,
}

impl InputForm {
    /// Open a form seeded with `initial`.
    pub fn new(target: InputTarget, initial: &str, return_page: PageId) -> Self {
        let mut buffer = String::new();
        for c in initial.chars() {
            if buffer.push(c).is_err() {
                break;
            }
        }
        Self {
            target,
            buffer,
            return_page,
        }
    }

    /// Target being edited.
    pub fn target(&self) -> InputTarget {
        self.target
    }

    /// Current buffer.
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Page to return to on OK/Cancel.
    pub fn return_page(&self) -> PageId {
        self.return_page
    }

    /// Apply one keypad key. `current` is the carriage position in the
    /// current units, used by "use current".
    pub fn apply(&mut self, key: InputKey, current: f32) -> EditOutcome {
        let kind = self.target.kind();
        match key {
            InputKey::Digit(d) => {
                let c = char::from(b'0' + d.min(9));
                match self.buffer.as_str() {
                    "0" => self.replace("", c),
                    "-0" => self.replace("-", c),
                    _ => {
                        let _ = self.buffer.push(c);
                    }
                }
            }
            InputKey::Dot if kind.allows_dot() => {
                if !self.buffer.contains('.') {
                    if self.buffer.is_empty() || self.buffer == "-" {
                        let _ = self.buffer.push_str("0.");
                    } else {
                        let _ = self.buffer.push('.');
                    }
                }
            }
            InputKey::Sign if kind.allows_sign() => self.toggle_sign(),
            InputKey::UseCurrent if kind.allows_current() => {
                self.buffer = trim_float(current);
            }
            InputKey::Dot | InputKey::Sign | InputKey::UseCurrent => {}
            InputKey::Backspace => {
                self.buffer.pop();
            }
            InputKey::Clear => {
                self.buffer.clear();
                if let InputTarget::Stop(side) = self.target {
                    return EditOutcome::StopCleared(side);
                }
            }
            InputKey::Ok => {
                return match self.parse() {
                    Ok(value) => EditOutcome::Commit(value),
                    Err(e) => EditOutcome::Rejected(e),
                };
            }
            InputKey::Cancel => return EditOutcome::Cancel,
        }
        EditOutcome::Editing
    }

    /// Parse the buffer according to the target's kind.
    pub fn parse(&self) -> Result<EntryValue, InputError> {
        let text = self.buffer.as_str();
        if text.is_empty() {
            return Ok(EntryValue::Empty);
        }

        match self.target.kind() {
            EntryKind::Position | EntryKind::Decimal => text
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .map(EntryValue::Decimal)
                .ok_or_else(|| malformed(text)),
            EntryKind::Integer => text
                .parse::<u64>()
                .map(|v| EntryValue::Integer(v.min(u32::MAX as u64) as u32))
                .map_err(|_| malformed(text)),
        }
    }

    fn replace(&mut self, prefix: &str, c: char) {
        self.buffer.clear();
        let _ = self.buffer.push_str(prefix);
        let _ = self.buffer.push(c);
    }

    fn toggle_sign(&mut self) {
        let mut next: String<INPUT_CAPACITY> = String::new();
        if let Some(rest) = self.buffer.strip_prefix('-') {
            let _ = next.push_str(rest);
        } else if self.buffer.is_empty() || self.buffer == "0" {
            let _ = next.push('-');
        } else {
            let _ = write!(next, "-{}", self.buffer);
            if next.len() == 1 {
                // Full buffer; leave it as is.
                return;
            }
        }
        self.buffer = next;
    }
}

fn malformed(text: &str) -> InputError {
    let mut s = String::new();
    for c in text.chars() {
        if s.push(c).is_err() {
            break;
        }
    }
    InputError::Malformed(s)
}
