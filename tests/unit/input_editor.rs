//! Unit tests for the input form and start selection.

use leadscrew::config::{Calibration, UnitSystem};
use leadscrew::context::ControlContext;
use leadscrew::motion::{Direction, ThreadSpec};
use leadscrew::ui::{
    EditOutcome, EntryValue, InputForm, InputKey, InputTarget, KeyEvent, ModeStateMachine, PageId,
};

/// Three starts, second selected: a third of a revolution. Selecting a
/// start that does not exist clamps to the last one.
#[test]
fn test_start_offset_and_clamp() {
    let mut spec = ThreadSpec::new(1.5, UnitSystem::Metric);
    spec.set_num_starts(3);
    spec.set_active_start(2);
    assert!((spec.start_offset() - 1.0 / 3.0).abs() < 1e-6);

    spec.set_active_start(4);
    assert_eq!(spec.active_start(), 3);
    assert!(spec.active_start() <= spec.num_starts());
}

/// A leading zero is replaced, not extended.
#[test]
fn test_leading_zero_replaced() {
    let mut form = InputForm::new(InputTarget::Stop(Direction::Left), "0", PageId::JogFeed);
    assert_eq!(form.apply(InputKey::Digit(5), 0.0), EditOutcome::Editing);
    assert_eq!(form.text(), "5");
}

/// A second dot is ignored.
#[test]
fn test_single_decimal_point() {
    let mut form = InputForm::new(InputTarget::Pitch, "1", PageId::Threading);
    form.apply(InputKey::Dot, 0.0);
    form.apply(InputKey::Dot, 0.0);
    assert_eq!(form.text(), "1.");
    form.apply(InputKey::Digit(5), 0.0);
    assert_eq!(form.apply(InputKey::Ok, 0.0), EditOutcome::Commit(EntryValue::Decimal(1.5)));
}

/// Clear on a stop entry empties the buffer and disables that stop at once.
#[test]
fn test_clear_disables_stop_through_mode_machine() {
    let mut ctx = ControlContext::new(Calibration::default(), UnitSystem::Metric);
    ctx.position_steps = 2000;
    ctx.capture_endstop(Direction::Right);

    let mut mode = ModeStateMachine::new();
    mode.handle_key(KeyEvent::new(PageId::Menu, 0), &mut ctx, false);
    mode.handle_key(KeyEvent::new(PageId::JogFeed, 8), &mut ctx, false);
    assert_eq!(mode.page(), PageId::InputForm);
    assert_eq!(mode.form().map(|f| f.text()), Some("5"));

    mode.handle_key(KeyEvent::new(PageId::InputForm, InputKey::CLEAR), &mut ctx, false);
    assert_eq!(mode.form().map(|f| f.text()), Some(""));
    assert_eq!(ctx.endstops.right.steps(), None);
    assert!(ctx.endstops.left.steps().is_none());

    // Cancel does not bring the stop back.
    mode.handle_key(KeyEvent::new(PageId::InputForm, InputKey::CANCEL), &mut ctx, false);
    assert_eq!(mode.page(), PageId::JogFeed);
    assert_eq!(ctx.endstops.right.steps(), None);
}

/// Entries beyond the travel range are clamped.
#[test]
fn test_stop_entry_clamped_to_travel() {
    let mut ctx = ControlContext::new(Calibration::default(), UnitSystem::Metric);
    let mut mode = ModeStateMachine::new();
    mode.handle_key(KeyEvent::new(PageId::Menu, 1), &mut ctx, false);
    mode.handle_key(KeyEvent::new(PageId::Threading, 3), &mut ctx, false);
    for digit in [9, 9, 9, 9, 9] {
        mode.handle_key(KeyEvent::new(PageId::InputForm, digit), &mut ctx, false);
    }
    mode.handle_key(KeyEvent::new(PageId::InputForm, InputKey::OK), &mut ctx, false);

    assert_eq!(mode.page(), PageId::Threading);
    assert_eq!(ctx.endstop_units(Direction::Left), Some(2000.0));
}

/// A malformed entry keeps the form open with the text intact.
#[test]
fn test_malformed_entry_keeps_form() {
    let mut ctx = ControlContext::new(Calibration::default(), UnitSystem::Metric);
    let mut mode = ModeStateMachine::new();
    mode.handle_key(KeyEvent::new(PageId::Menu, 0), &mut ctx, false);
    mode.handle_key(KeyEvent::new(PageId::JogFeed, 7), &mut ctx, false);
    mode.handle_key(KeyEvent::new(PageId::InputForm, InputKey::SIGN), &mut ctx, false);
    mode.handle_key(KeyEvent::new(PageId::InputForm, InputKey::OK), &mut ctx, false);

    assert_eq!(mode.page(), PageId::InputForm);
    assert_eq!(mode.form().map(|f| f.text()), Some("-"));
    assert_eq!(ctx.endstops.left.steps(), None);
}
