//! Touchscreen pages, typed key events and the page state machine.

mod event;
pub mod format;
mod input;
mod mode;
mod render;

pub use event::{ErrorKey, FeedKey, InputKey, MenuKey, SetupKey, StartsKey, ThreadingKey, UiEvent};
pub use input::{EditOutcome, EntryKind, EntryValue, InputForm, InputTarget};
pub use mode::{ErrorInfo, ModeOutcome, ModeStateMachine};
pub use render::{refresh_status, render_page};

/// Display page identifiers. Values match the panel's page numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PageId {
    /// Main menu.
    Menu = 4,
    /// Jog and power feed.
    JogFeed = 5,
    /// Thread cutting.
    Threading = 6,
    /// Numeric entry keypad.
    InputForm = 7,
    /// Error message.
    Error = 8,
    /// Multi-start selection.
    Starts = 9,
    /// Calibration setup.
    Setup = 10,
}

impl PageId {
    /// Convert from the raw page number. Returns `None` for unknown pages.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            4 => Some(Self::Menu),
            5 => Some(Self::JogFeed),
            6 => Some(Self::Threading),
            7 => Some(Self::InputForm),
            8 => Some(Self::Error),
            9 => Some(Self::Starts),
            10 => Some(Self::Setup),
            _ => None,
        }
    }

    /// Raw page number.
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Raw page-scoped key event as reported by the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Page number the key belongs to.
    pub page: u8,
    /// Key value within that page.
    pub value: i32,
}

impl KeyEvent {
    /// Create a key event.
    pub const fn new(page: PageId, value: i32) -> Self {
        Self {
            page: page.as_u8(),
            value,
        }
    }
}

/// Colors the core writes to button backgrounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedColor {
    /// Highlight for the selected option.
    Selected,
    /// Default button background.
    Normal,
}

impl NamedColor {
    /// RGB565 value understood by the panel.
    pub const fn rgb565(self) -> u16 {
        match self {
            NamedColor::Selected => 26051,
            NamedColor::Normal => 65535,
        }
    }
}
