//! Typed key events, one enum per page.
//!
//! Raw `(page, value)` pairs are decoded once at the edge; everything past
//! [`UiEvent::decode`] matches exhaustively on these variants.

use crate::config::CalibrationField;
use crate::motion::{Direction, JogMultiplier};

use super::{KeyEvent, PageId};

/// Main menu keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKey {
    /// Open the jog/feed page.
    JogFeed,
    /// Open the threading page.
    Threading,
    /// Open the calibration page.
    Setup,
}

/// Jog/feed page keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKey {
    /// Set a stop at the current position.
    CaptureStop(Direction),
    /// Make the current position zero.
    ZeroPosition,
    /// Flip metric/imperial.
    ToggleUnits,
    /// Select the knob multiplier.
    Multiplier(JogMultiplier),
    /// Type a stop position.
    EnterStop(Direction),
    /// Back to the menu.
    Back,
}

/// Threading page keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadingKey {
    /// Flip metric/imperial (mm/rev <-> TPI).
    ToggleUnits,
    /// Open the starts page.
    Starts,
    /// Back to the menu.
    Back,
    /// Type a stop position.
    EnterStop(Direction),
    /// Make the current position zero.
    ZeroPosition,
    /// Type a pitch.
    EnterPitch,
}

/// Starts page keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartsKey {
    /// Accept and return to threading.
    Confirm,
    /// Select the start to cut (1..=5).
    SelectStart(u8),
    /// Set the number of starts (1..=5).
    SetStarts(u8),
}

/// Setup page keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupKey {
    /// Type a new calibration value.
    Edit(CalibrationField),
    /// Flip the encoder count direction.
    ToggleEncoderInvert,
    /// Back to the menu.
    Back,
}

/// Keypad keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKey {
    /// Digit 0..=9.
    Digit(u8),
    /// Commit and return.
    Ok,
    /// Discard and return.
    Cancel,
    /// Empty the buffer (and disable a stop being edited).
    Clear,
    /// Toggle a leading minus.
    Sign,
    /// Decimal point.
    Dot,
    /// Delete the last character.
    Backspace,
    /// Use the current carriage position.
    UseCurrent,
}

impl InputKey {
    /// Keypad codes.
    pub const OK: i32 = -5;
    /// Cancel key code.
    pub const CANCEL: i32 = -6;
    /// Clear key code.
    pub const CLEAR: i32 = -1;
    /// Sign key code.
    pub const SIGN: i32 = -3;
    /// Dot key code.
    pub const DOT: i32 = -4;
    /// Backspace key code.
    pub const BACKSPACE: i32 = -7;
    /// Use-current key code.
    pub const USE_CURRENT: i32 = -8;

    fn decode(value: i32) -> Option<Self> {
        Some(match value {
            Self::OK => InputKey::Ok,
            Self::CANCEL => InputKey::Cancel,
            Self::CLEAR => InputKey::Clear,
            Self::SIGN => InputKey::Sign,
            Self::DOT => InputKey::Dot,
            Self::BACKSPACE => InputKey::Backspace,
            Self::USE_CURRENT => InputKey::UseCurrent,
            0..=9 => InputKey::Digit(value as u8),
            _ => return None,
        })
    }

    /// Raw keypad code.
    pub fn code(self) -> i32 {
        match self {
            InputKey::Digit(d) => d as i32,
            InputKey::Ok => Self::OK,
            InputKey::Cancel => Self::CANCEL,
            InputKey::Clear => Self::CLEAR,
            InputKey::Sign => Self::SIGN,
            InputKey::Dot => Self::DOT,
            InputKey::Backspace => Self::BACKSPACE,
            InputKey::UseCurrent => Self::USE_CURRENT,
        }
    }
}

/// Error page keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKey {
    /// Acknowledge and return.
    Dismiss,
}

/// A decoded key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    /// Main menu.
    Menu(MenuKey),
    /// Jog/feed page.
    Feed(FeedKey),
    /// Threading page.
    Threading(ThreadingKey),
    /// Starts page.
    Starts(StartsKey),
    /// Setup page.
    Setup(SetupKey),
    /// Keypad.
    Input(InputKey),
    /// Error page.
    Error(ErrorKey),
}

impl UiEvent {
    /// Decode a raw key event. Unknown pages and keys yield `None`.
    pub fn decode(event: KeyEvent) -> Option<Self> {
        let page = PageId::from_u8(event.page)?;
        let value = event.value;

        match page {
            PageId::Menu => Some(UiEvent::Menu(match value {
                0 => MenuKey::JogFeed,
                1 => MenuKey::Threading,
                2 => MenuKey::Setup,
                _ => return None,
            })),
            PageId::JogFeed => Some(UiEvent::Feed(match value {
                0 => FeedKey::CaptureStop(Direction::Left),
                1 => FeedKey::ZeroPosition,
                2 => FeedKey::CaptureStop(Direction::Right),
                3 => FeedKey::ToggleUnits,
                4 => FeedKey::Multiplier(JogMultiplier::Fine),
                5 => FeedKey::Multiplier(JogMultiplier::Medium),
                6 => FeedKey::Multiplier(JogMultiplier::Coarse),
                7 => FeedKey::EnterStop(Direction::Left),
                8 => FeedKey::EnterStop(Direction::Right),
                9 => FeedKey::Back,
                _ => return None,
            })),
            PageId::Threading => Some(UiEvent::Threading(match value {
                0 => ThreadingKey::ToggleUnits,
                1 => ThreadingKey::Starts,
                2 => ThreadingKey::Back,
                3 => ThreadingKey::EnterStop(Direction::Left),
                4 => ThreadingKey::EnterStop(Direction::Right),
                5 => ThreadingKey::ZeroPosition,
                6 => ThreadingKey::EnterPitch,
                _ => return None,
            })),
            PageId::InputForm => InputKey::decode(value).map(UiEvent::Input),
            PageId::Error => Some(UiEvent::Error(ErrorKey::Dismiss)),
            PageId::Starts => Some(UiEvent::Starts(match value {
                0 => StartsKey::Confirm,
                1..=5 => StartsKey::SelectStart(value as u8),
                6..=10 => StartsKey::SetStarts((value - 5) as u8),
                _ => return None,
            })),
            PageId::Setup => Some(UiEvent::Setup(match value {
                0 => SetupKey::Edit(CalibrationField::PulsesPerRevolution),
                1 => SetupKey::Edit(CalibrationField::StepsPerUnit),
                2 => SetupKey::Edit(CalibrationField::Acceleration),
                3 => SetupKey::Edit(CalibrationField::MaxStepRate),
                4 => SetupKey::ToggleEncoderInvert,
                5 => SetupKey::Back,
                _ => return None,
            })),
        }
    }

    /// Page this event belongs to.
    pub fn page(&self) -> PageId {
        match self {
            UiEvent::Menu(_) => PageId::Menu,
            UiEvent::Feed(_) => PageId::JogFeed,
            UiEvent::Threading(_) => PageId::Threading,
            UiEvent::Starts(_) => PageId::Starts,
            UiEvent::Setup(_) => PageId::Setup,
            UiEvent::Input(_) => PageId::InputForm,
            UiEvent::Error(_) => PageId::Error,
        }
    }
}
