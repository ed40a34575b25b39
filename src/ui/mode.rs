//! Page state machine.
//!
//! One page is active at a time. Each page interprets only its own typed
//! keys; events for any other page are dropped. The transition table is
//! the set of `on_*` handlers below, each an exhaustive match.

use heapless::String;

use crate::context::ControlContext;
use crate::motion::Direction;

use super::event::{ErrorKey, FeedKey, InputKey, MenuKey, SetupKey, StartsKey, ThreadingKey};
use super::format::{self, trim_float};
use super::input::{EditOutcome, EntryValue, InputForm, InputTarget};
use super::{KeyEvent, PageId, UiEvent};

/// Error page contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    title: String<32>,
    message: String<64>,
    return_page: PageId,
}

impl ErrorInfo {
    /// Title line.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Message body.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Page restored on dismissal.
    pub fn return_page(&self) -> PageId {
        self.return_page
    }
}

fn truncated<const N: usize>(text: &str) -> String<N> {
    let mut s = String::new();
    for c in text.chars() {
        if s.push(c).is_err() {
            break;
        }
    }
    s
}

/// Side effects the controller must carry out after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeOutcome {
    /// A different page is now active; render it and switch the display.
    pub page_changed: bool,
    /// Fields on the current page changed; render it again.
    pub redraw: bool,
    /// The carriage position was redefined as zero.
    pub zero_axis: bool,
    /// Calibration was edited and must be persisted and applied.
    pub calibration_changed: bool,
}

impl ModeOutcome {
    fn redraw() -> Self {
        Self {
            redraw: true,
            ..Self::default()
        }
    }

    fn merge(self, other: Self) -> Self {
        Self {
            page_changed: self.page_changed || other.page_changed,
            redraw: self.redraw || other.redraw,
            zero_axis: self.zero_axis || other.zero_axis,
            calibration_changed: self.calibration_changed || other.calibration_changed,
        }
    }
}

/// Current page plus the input form and error sub-states.
#[derive(Debug, Clone)]
pub struct ModeStateMachine {
    page: PageId,
    form: Option<InputForm>,
    error: Option<ErrorInfo>,
}

impl Default for ModeStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeStateMachine {
    /// Start on the main menu.
    pub fn new() -> Self {
        Self {
            page: PageId::Menu,
            form: None,
            error: None,
        }
    }

    /// Active page.
    #[inline]
    pub fn page(&self) -> PageId {
        self.page
    }

    /// Open input form, if any.
    #[inline]
    pub fn form(&self) -> Option<&InputForm> {
        self.form.as_ref()
    }

    /// Error being shown, if any.
    #[inline]
    pub fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    /// Decode and handle a raw key event.
    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        ctx: &mut ControlContext,
        engaged: bool,
    ) -> ModeOutcome {
        match UiEvent::decode(key) {
            Some(event) => self.handle(event, ctx, engaged),
            None => {
                trace!("unknown key {=u8}/{=i32}", key.page, key.value);
                ModeOutcome::default()
            }
        }
    }

    /// Handle a typed event. Events for another page are ignored, as is
    /// everything while a threading pass is engaged.
    pub fn handle(
        &mut self,
        event: UiEvent,
        ctx: &mut ControlContext,
        engaged: bool,
    ) -> ModeOutcome {
        if event.page() != self.page {
            trace!("key for inactive page ignored");
            return ModeOutcome::default();
        }
        if engaged {
            debug!("key ignored while threading");
            return ModeOutcome::default();
        }

        match event {
            UiEvent::Menu(key) => self.on_menu(key),
            UiEvent::Feed(key) => self.on_feed(key, ctx),
            UiEvent::Threading(key) => self.on_threading(key, ctx),
            UiEvent::Starts(key) => self.on_starts(key, ctx),
            UiEvent::Setup(key) => self.on_setup(key, ctx),
            UiEvent::Input(key) => self.on_input(key, ctx),
            UiEvent::Error(key) => self.on_error(key),
        }
    }

    /// Apply knob detents. Returns whether anything changed.
    ///
    /// Menu and jog/feed adjust the jog speed; threading adjusts the pitch
    /// while disengaged.
    pub fn handle_knob(&mut self, detents: i32, ctx: &mut ControlContext, engaged: bool) -> bool {
        if detents == 0 {
            return false;
        }
        match self.page {
            PageId::Menu | PageId::JogFeed => {
                ctx.feed.nudge_speed(detents, ctx.units);
                true
            }
            PageId::Threading if !engaged => {
                ctx.thread.nudge_pitch(detents, ctx.units);
                true
            }
            _ => false,
        }
    }

    /// Open the error page. It returns to the page active now; a second
    /// error while one is shown keeps the original return page.
    pub fn show_error(&mut self, title: &str, message: &str) -> ModeOutcome {
        let return_page = match &self.error {
            Some(existing) if self.page == PageId::Error => existing.return_page,
            _ => self.page,
        };
        warn!("error page shown");
        self.error = Some(ErrorInfo {
            title: truncated(title),
            message: truncated(message),
            return_page,
        });
        if self.page == PageId::Error {
            ModeOutcome::redraw()
        } else {
            self.goto(PageId::Error)
        }
    }

    fn goto(&mut self, page: PageId) -> ModeOutcome {
        debug!("page {=u8} -> {=u8}", self.page.as_u8(), page.as_u8());
        self.page = page;
        ModeOutcome {
            page_changed: true,
            ..ModeOutcome::default()
        }
    }

    fn open_form(&mut self, target: InputTarget, initial: &str) -> ModeOutcome {
        self.form = Some(InputForm::new(target, initial, self.page));
        self.goto(PageId::InputForm)
    }

    fn open_stop_form(&mut self, side: Direction, ctx: &ControlContext) -> ModeOutcome {
        let initial: String<16> = trim_float(ctx.endstop_units(side).unwrap_or(0.0));
        self.open_form(InputTarget::Stop(side), &initial)
    }

    fn on_menu(&mut self, key: MenuKey) -> ModeOutcome {
        match key {
            MenuKey::JogFeed => self.goto(PageId::JogFeed),
            MenuKey::Threading => self.goto(PageId::Threading),
            MenuKey::Setup => self.goto(PageId::Setup),
        }
    }

    fn on_feed(&mut self, key: FeedKey, ctx: &mut ControlContext) -> ModeOutcome {
        match key {
            FeedKey::CaptureStop(side) => {
                ctx.capture_endstop(side);
                info!("stop captured at {=i64}", ctx.position_steps);
                ModeOutcome::redraw()
            }
            FeedKey::ZeroPosition => zero_position(ctx),
            FeedKey::ToggleUnits => {
                ctx.invert_units();
                ModeOutcome::redraw()
            }
            FeedKey::Multiplier(multiplier) => {
                ctx.feed.multiplier = multiplier;
                ModeOutcome::default()
            }
            FeedKey::EnterStop(side) => self.open_stop_form(side, ctx),
            FeedKey::Back => self.goto(PageId::Menu),
        }
    }

    fn on_threading(&mut self, key: ThreadingKey, ctx: &mut ControlContext) -> ModeOutcome {
        match key {
            ThreadingKey::ToggleUnits => {
                ctx.invert_units();
                ModeOutcome::redraw()
            }
            ThreadingKey::Starts => self.goto(PageId::Starts),
            ThreadingKey::Back => self.goto(PageId::Menu),
            ThreadingKey::EnterStop(side) => self.open_stop_form(side, ctx),
            ThreadingKey::ZeroPosition => zero_position(ctx),
            ThreadingKey::EnterPitch => {
                let initial: String<16> = trim_float(ctx.thread.pitch());
                self.open_form(InputTarget::Pitch, &initial)
            }
        }
    }

    fn on_starts(&mut self, key: StartsKey, ctx: &mut ControlContext) -> ModeOutcome {
        match key {
            StartsKey::Confirm => self.goto(PageId::Threading),
            StartsKey::SelectStart(start) => {
                ctx.thread.set_active_start(start);
                ModeOutcome::redraw()
            }
            StartsKey::SetStarts(count) => {
                ctx.thread.set_num_starts(count);
                ModeOutcome::redraw()
            }
        }
    }

    fn on_setup(&mut self, key: SetupKey, ctx: &mut ControlContext) -> ModeOutcome {
        match key {
            SetupKey::Edit(field) => {
                let initial = format::integer(ctx.calibration.get(field));
                self.open_form(InputTarget::Calibration(field), &initial)
            }
            SetupKey::ToggleEncoderInvert => {
                ctx.calibration.invert_encoder = !ctx.calibration.invert_encoder;
                ModeOutcome {
                    redraw: true,
                    calibration_changed: true,
                    ..ModeOutcome::default()
                }
            }
            SetupKey::Back => self.goto(PageId::Menu),
        }
    }

    fn on_input(&mut self, key: InputKey, ctx: &mut ControlContext) -> ModeOutcome {
        let current = ctx.position_units();
        let edit = match self.form.as_mut() {
            Some(form) => form.apply(key, current),
            None => return self.goto(PageId::Menu),
        };

        match edit {
            EditOutcome::Editing => ModeOutcome::redraw(),
            EditOutcome::StopCleared(side) => {
                ctx.endstops.side_mut(side).clear();
                info!("stop cleared");
                ModeOutcome::redraw()
            }
            EditOutcome::Rejected(_) => {
                debug!("entry rejected");
                ModeOutcome::redraw()
            }
            EditOutcome::Cancel => self.close_form(),
            EditOutcome::Commit(value) => {
                let committed = match &self.form {
                    Some(form) => commit(form.target(), value, ctx),
                    None => ModeOutcome::default(),
                };
                committed.merge(self.close_form())
            }
        }
    }

    fn close_form(&mut self) -> ModeOutcome {
        let page = self
            .form
            .take()
            .map_or(PageId::Menu, |form| form.return_page());
        self.goto(page)
    }

    fn on_error(&mut self, key: ErrorKey) -> ModeOutcome {
        match key {
            ErrorKey::Dismiss => {
                let page = self
                    .error
                    .take()
                    .map_or(PageId::Menu, |error| error.return_page);
                self.goto(page)
            }
        }
    }
}

fn zero_position(ctx: &mut ControlContext) -> ModeOutcome {
    ctx.position_steps = 0;
    info!("position zeroed");
    ModeOutcome {
        redraw: true,
        zero_axis: true,
        ..ModeOutcome::default()
    }
}

/// Write an accepted entry into its target. Empty entries disable a stop
/// and leave pitch and calibration unchanged.
fn commit(target: InputTarget, value: EntryValue, ctx: &mut ControlContext) -> ModeOutcome {
    let decimal = match value {
        EntryValue::Empty => None,
        EntryValue::Decimal(v) => Some(v),
        EntryValue::Integer(v) => Some(v as f32),
    };

    match target {
        InputTarget::Stop(side) => {
            match decimal {
                Some(v) => {
                    let converter = ctx.converter();
                    ctx.endstops.set_units(side, v, &converter);
                    info!("stop set to {=i64}", ctx.endstops.side(side).position_steps);
                }
                None => ctx.endstops.side_mut(side).clear(),
            }
            ModeOutcome::default()
        }
        InputTarget::Pitch => {
            if let Some(v) = decimal {
                ctx.thread.set_pitch(v, ctx.units);
            }
            ModeOutcome::default()
        }
        InputTarget::Calibration(field) => match value {
            EntryValue::Integer(v) => {
                ctx.calibration.set_clamped(field, v);
                ModeOutcome {
                    calibration_changed: true,
                    ..ModeOutcome::default()
                }
            }
            EntryValue::Decimal(v) => {
                ctx.calibration.set_clamped(field, v.max(0.0) as u32);
                ModeOutcome {
                    calibration_changed: true,
                    ..ModeOutcome::default()
                }
            }
            EntryValue::Empty => ModeOutcome::default(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Calibration, CalibrationField, UnitSystem};

    fn ctx() -> ControlContext {
        ControlContext::new(Calibration::default(), UnitSystem::Metric)
    }

    fn press(mode: &mut ModeStateMachine, ctx: &mut ControlContext, page: PageId, value: i32) -> ModeOutcome {
        mode.handle_key(KeyEvent::new(page, value), ctx, false)
    }

    #[test]
    fn test_menu_navigation() {
        let mut ctx = ctx();
        let mut mode = ModeStateMachine::new();
        let out = press(&mut mode, &mut ctx, PageId::Menu, 1);
        assert!(out.page_changed);
        assert_eq!(mode.page(), PageId::Threading);

        press(&mut mode, &mut ctx, PageId::Threading, 1);
        assert_eq!(mode.page(), PageId::Starts);
        press(&mut mode, &mut ctx, PageId::Starts, 0);
        assert_eq!(mode.page(), PageId::Threading);
        press(&mut mode, &mut ctx, PageId::Threading, 2);
        assert_eq!(mode.page(), PageId::Menu);
    }

    #[test]
    fn test_event_for_other_page_ignored() {
        let mut ctx = ctx();
        let mut mode = ModeStateMachine::new();
        let out = press(&mut mode, &mut ctx, PageId::Setup, 5);
        assert_eq!(out, ModeOutcome::default());
        assert_eq!(mode.page(), PageId::Menu);
    }

    #[test]
    fn test_engaged_blocks_keys() {
        let mut ctx = ctx();
        let mut mode = ModeStateMachine::new();
        press(&mut mode, &mut ctx, PageId::Menu, 1);
        let out = mode.handle_key(KeyEvent::new(PageId::Threading, 0), &mut ctx, true);
        assert_eq!(out, ModeOutcome::default());
        assert_eq!(ctx.units, UnitSystem::Metric);
        assert!(!mode.handle_knob(1, &mut ctx, true));
    }

    #[test]
    fn test_stop_entry_and_cancel() {
        let mut ctx = ctx();
        let mut mode = ModeStateMachine::new();
        press(&mut mode, &mut ctx, PageId::Menu, 0);
        press(&mut mode, &mut ctx, PageId::JogFeed, 8);
        assert_eq!(mode.page(), PageId::InputForm);
        assert_eq!(mode.form().map(|f| f.text()), Some("0"));

        press(&mut mode, &mut ctx, PageId::InputForm, InputKey::SIGN);
        press(&mut mode, &mut ctx, PageId::InputForm, 2);
        press(&mut mode, &mut ctx, PageId::InputForm, InputKey::OK);
        assert_eq!(mode.page(), PageId::JogFeed);
        assert_eq!(ctx.endstops.right.steps(), Some(-800));

        press(&mut mode, &mut ctx, PageId::JogFeed, 7);
        press(&mut mode, &mut ctx, PageId::InputForm, 9);
        press(&mut mode, &mut ctx, PageId::InputForm, InputKey::CANCEL);
        assert_eq!(mode.page(), PageId::JogFeed);
        assert!(mode.form().is_none());
        assert_eq!(ctx.endstops.left.steps(), None);
    }

    #[test]
    fn test_clear_disables_stop_immediately() {
        let mut ctx = ctx();
        ctx.position_steps = 400;
        ctx.capture_endstop(Direction::Left);
        let mut mode = ModeStateMachine::new();
        press(&mut mode, &mut ctx, PageId::Menu, 0);
        press(&mut mode, &mut ctx, PageId::JogFeed, 7);
        assert_eq!(mode.form().map(|f| f.text()), Some("1"));

        press(&mut mode, &mut ctx, PageId::InputForm, InputKey::CLEAR);
        assert_eq!(ctx.endstops.left.steps(), None);
        assert_eq!(mode.page(), PageId::InputForm);
        assert_eq!(mode.form().map(|f| f.text()), Some(""));
    }

    #[test]
    fn test_pitch_entry_clamped() {
        let mut ctx = ctx();
        let mut mode = ModeStateMachine::new();
        press(&mut mode, &mut ctx, PageId::Menu, 1);
        press(&mut mode, &mut ctx, PageId::Threading, 6);
        press(&mut mode, &mut ctx, PageId::InputForm, InputKey::BACKSPACE);
        press(&mut mode, &mut ctx, PageId::InputForm, 9);
        press(&mut mode, &mut ctx, PageId::InputForm, InputKey::OK);
        assert_eq!(mode.page(), PageId::Threading);
        assert_eq!(ctx.thread.pitch(), 4.0);
    }

    #[test]
    fn test_calibration_edit() {
        let mut ctx = ctx();
        let mut mode = ModeStateMachine::new();
        press(&mut mode, &mut ctx, PageId::Menu, 2);
        press(&mut mode, &mut ctx, PageId::Setup, 1);
        assert_eq!(mode.form().map(|f| f.text()), Some("400"));
        press(&mut mode, &mut ctx, PageId::InputForm, InputKey::CLEAR);
        press(&mut mode, &mut ctx, PageId::InputForm, 8);
        press(&mut mode, &mut ctx, PageId::InputForm, 0);
        press(&mut mode, &mut ctx, PageId::InputForm, 0);
        let out = press(&mut mode, &mut ctx, PageId::InputForm, InputKey::OK);
        assert!(out.calibration_changed);
        assert!(out.page_changed);
        assert_eq!(mode.page(), PageId::Setup);
        assert_eq!(ctx.calibration.get(CalibrationField::StepsPerUnit), 800);
    }

    #[test]
    fn test_empty_calibration_entry_keeps_value() {
        let mut ctx = ctx();
        let mut mode = ModeStateMachine::new();
        press(&mut mode, &mut ctx, PageId::Menu, 2);
        press(&mut mode, &mut ctx, PageId::Setup, 0);
        press(&mut mode, &mut ctx, PageId::InputForm, InputKey::CLEAR);
        let out = press(&mut mode, &mut ctx, PageId::InputForm, InputKey::OK);
        assert!(!out.calibration_changed);
        assert_eq!(ctx.calibration.pulses_per_revolution, 2880);
    }

    #[test]
    fn test_starts_selection() {
        let mut ctx = ctx();
        let mut mode = ModeStateMachine::new();
        press(&mut mode, &mut ctx, PageId::Menu, 1);
        press(&mut mode, &mut ctx, PageId::Threading, 1);
        press(&mut mode, &mut ctx, PageId::Starts, 8);
        press(&mut mode, &mut ctx, PageId::Starts, 2);
        assert_eq!(ctx.thread.num_starts(), 3);
        assert_eq!(ctx.thread.active_start(), 2);
        press(&mut mode, &mut ctx, PageId::Starts, 5);
        assert_eq!(ctx.thread.active_start(), 3);
    }

    #[test]
    fn test_error_returns_to_caller() {
        let mut ctx = ctx();
        let mut mode = ModeStateMachine::new();
        press(&mut mode, &mut ctx, PageId::Menu, 2);
        let out = mode.show_error("Storage", "Calibration not saved");
        assert!(out.page_changed);
        assert_eq!(mode.page(), PageId::Error);
        mode.show_error("Second", "again");
        assert_eq!(mode.error().map(|e| e.return_page()), Some(PageId::Setup));
        assert_eq!(mode.error().map(|e| e.title()), Some("Second"));

        press(&mut mode, &mut ctx, PageId::Error, 0);
        assert_eq!(mode.page(), PageId::Setup);
        assert!(mode.error().is_none());
    }

    #[test]
    fn test_zero_and_units() {
        let mut ctx = ctx();
        ctx.position_steps = 1234;
        let mut mode = ModeStateMachine::new();
        press(&mut mode, &mut ctx, PageId::Menu, 0);
        let out = press(&mut mode, &mut ctx, PageId::JogFeed, 1);
        assert!(out.zero_axis);
        assert_eq!(ctx.position_steps, 0);

        press(&mut mode, &mut ctx, PageId::JogFeed, 3);
        assert_eq!(ctx.units, UnitSystem::Imperial);
        press(&mut mode, &mut ctx, PageId::JogFeed, 4);
        assert_eq!(ctx.feed.multiplier, crate::motion::JogMultiplier::Fine);
    }

    #[test]
    fn test_knob_by_page() {
        let mut ctx = ctx();
        let mut mode = ModeStateMachine::new();
        assert!(mode.handle_knob(2, &mut ctx, false));
        assert!((ctx.feed.speed - 1.2).abs() < 1e-5);

        press(&mut mode, &mut ctx, PageId::Menu, 1);
        assert!(mode.handle_knob(-1, &mut ctx, false));
        assert!((ctx.thread.pitch() - 0.95).abs() < 1e-5);

        press(&mut mode, &mut ctx, PageId::Threading, 1);
        assert!(!mode.handle_knob(1, &mut ctx, false));
    }
}
