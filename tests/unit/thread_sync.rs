//! Unit tests for the thread synchronization control law.

use leadscrew::axis::{InputLevels, InputSnapshot};
use leadscrew::config::{Calibration, Endstop, UnitSystem};
use leadscrew::context::ControlContext;
use leadscrew::motion::{
    Direction, DisengageReason, SpindleTracker, SyncEvent, ThreadSyncEngine,
};

const PPR: u32 = 2880;

fn context(units: UnitSystem, steps_per_unit: u32) -> ControlContext {
    let calibration = Calibration {
        pulses_per_revolution: PPR,
        steps_per_unit,
        invert_encoder: false,
        ..Calibration::default()
    };
    ControlContext::new(calibration, units)
}

fn set_spindle(ctx: &mut ControlContext, ticks: i32) {
    let mut tracker = SpindleTracker::new(PPR, false);
    ctx.spindle = tracker.update(ticks);
}

fn levels(left: bool, right: bool, enable: bool) -> InputLevels {
    InputLevels {
        left,
        right,
        enable,
        ..InputLevels::default()
    }
}

/// Snapshot with `now` held and edges against `prev`.
fn snapshot(prev: InputLevels, now: InputLevels) -> InputSnapshot {
    InputSnapshot::from_levels(&prev, now)
}

/// Engaging Right at revolution 10 locks one revolution back; the geometric
/// target is one pitch behind the offset and the clamp holds the carriage
/// at the offset.
#[test]
fn test_engage_right_one_revolution_lag() {
    let mut ctx = context(UnitSystem::Metric, 800);
    ctx.thread.set_pitch(1.0, UnitSystem::Metric);
    ctx.position_steps = 5000;
    set_spindle(&mut ctx, 10 * PPR as i32);
    assert_eq!(ctx.spindle.rotation_count, 10);
    assert_eq!(ctx.spindle.phase, 0.0);

    let mut engine = ThreadSyncEngine::new();
    let out = engine.update(
        &ctx,
        &snapshot(levels(false, false, true), levels(false, true, true)),
    );

    assert_eq!(out.event, Some(SyncEvent::Engaged(Direction::Right)));
    assert_eq!(out.raw_target, Some(5000 - 800));
    assert_eq!(out.target, Some(5000));
    assert_eq!(out.max_speed, ctx.calibration.max_step_rate as f32);

    let session = engine.session().expect("engaged");
    assert_eq!(session.thread_offset_rev, 9);
    assert_eq!(session.position_offset_steps, 5000);
}

/// With the switch off, a Right pass is clamped to exactly the right stop
/// and ends there.
#[test]
fn test_right_endstop_clamp_ends_pass() {
    let mut ctx = context(UnitSystem::Metric, 800);
    ctx.position_steps = 5000;
    ctx.endstops.right = Endstop::at(5500);
    set_spindle(&mut ctx, 10 * PPR as i32);

    let mut engine = ThreadSyncEngine::new();
    let engaged = engine.update(
        &ctx,
        &snapshot(levels(false, false, false), levels(false, true, false)),
    );
    assert_eq!(engaged.event, Some(SyncEvent::Engaged(Direction::Right)));

    // Button released with the switch off: the pass coasts on.
    let idle = snapshot(levels(false, true, false), levels(false, false, false));

    // Quarter turn back from the lock revolution: 200 steps right.
    set_spindle(&mut ctx, 8 * PPR as i32 + 2160);
    let out = engine.update(&ctx, &idle);
    assert_eq!(out.target, Some(5200));
    assert!(engine.is_engaged());

    // Two full turns back would be 1600 steps; clamped to the stop.
    set_spindle(&mut ctx, 7 * PPR as i32);
    let out = engine.update(&ctx, &idle);
    assert_eq!(out.raw_target, Some(6600));
    assert_eq!(out.target, Some(5500));
    assert_eq!(
        out.event,
        Some(SyncEvent::Disengaged(DisengageReason::EndstopReached))
    );
    assert!(!engine.is_engaged());
}

/// Left is the mirror image of Right.
#[test]
fn test_left_pass_moves_negative() {
    let mut ctx = context(UnitSystem::Metric, 400);
    ctx.thread.set_pitch(2.0, UnitSystem::Metric);
    ctx.position_steps = 0;
    ctx.endstops.left = Endstop::at(-1000);
    set_spindle(&mut ctx, 5 * PPR as i32);

    let mut engine = ThreadSyncEngine::new();
    engine.update(
        &ctx,
        &snapshot(levels(false, false, false), levels(true, false, false)),
    );
    assert!(engine.is_engaged());

    let idle = snapshot(levels(true, false, false), levels(false, false, false));
    // Half a turn back from the lock revolution: 0.5 * 2 mm * 400 = 400 steps.
    set_spindle(&mut ctx, 3 * PPR as i32 + PPR as i32 / 2);
    let out = engine.update(&ctx, &idle);
    assert_eq!(out.target, Some(-400));

    // Forward of the lock point the clamp holds the offset.
    set_spindle(&mut ctx, 6 * PPR as i32);
    let out = engine.update(&ctx, &idle);
    assert_eq!(out.target, Some(0));

    set_spindle(&mut ctx, 2 * PPR as i32);
    let out = engine.update(&ctx, &idle);
    assert_eq!(out.target, Some(-1000));
    assert!(!engine.is_engaged());
}

/// Switch off and no room toward the stop: no engagement.
#[test]
fn test_no_engage_without_room() {
    let mut ctx = context(UnitSystem::Metric, 400);
    ctx.position_steps = 100;
    set_spindle(&mut ctx, 0);

    let mut engine = ThreadSyncEngine::new();
    let press_left = snapshot(levels(false, false, false), levels(true, false, false));

    // Stop disabled.
    let out = engine.update(&ctx, &press_left);
    assert_eq!(out.event, None);
    assert!(!engine.is_engaged());

    // Already at the stop.
    ctx.endstops.left = Endstop::at(100);
    engine.update(&ctx, &press_left);
    assert!(!engine.is_engaged());

    // Right of the stop.
    ctx.endstops.left = Endstop::at(50);
    engine.update(&ctx, &press_left);
    assert!(engine.is_engaged());
}

/// Engagement is edge-triggered; a held button does not re-engage.
#[test]
fn test_engage_needs_edge() {
    let mut ctx = context(UnitSystem::Metric, 400);
    set_spindle(&mut ctx, 0);

    let mut engine = ThreadSyncEngine::new();
    let held = snapshot(levels(false, true, true), levels(false, true, true));
    engine.update(&ctx, &held);
    assert!(!engine.is_engaged());
}

/// Both buttons pressed together never engage.
#[test]
fn test_both_buttons_refused() {
    let mut ctx = context(UnitSystem::Metric, 400);
    set_spindle(&mut ctx, 0);

    let mut engine = ThreadSyncEngine::new();
    engine.update(
        &ctx,
        &snapshot(levels(false, false, true), levels(true, true, true)),
    );
    assert!(!engine.is_engaged());
}

/// Under the switch the pass lives only while its button is held.
#[test]
fn test_switch_on_release_and_conflict() {
    let mut ctx = context(UnitSystem::Metric, 400);
    set_spindle(&mut ctx, 0);

    let mut engine = ThreadSyncEngine::new();
    engine.update(
        &ctx,
        &snapshot(levels(false, false, true), levels(false, true, true)),
    );
    assert!(engine.is_engaged());

    let still = snapshot(levels(false, true, true), levels(false, true, true));
    assert!(engine.update(&ctx, &still).target.is_some());

    let released = snapshot(levels(false, true, true), levels(false, false, true));
    let out = engine.update(&ctx, &released);
    assert_eq!(out.target, None);
    assert_eq!(
        out.event,
        Some(SyncEvent::Disengaged(DisengageReason::Released))
    );

    engine.update(
        &ctx,
        &snapshot(levels(false, false, true), levels(false, true, true)),
    );
    let conflict = snapshot(levels(false, true, true), levels(true, true, true));
    let out = engine.update(&ctx, &conflict);
    assert_eq!(
        out.event,
        Some(SyncEvent::Disengaged(DisengageReason::Conflict))
    );
}

/// Imperial pitch is threads per inch and divides.
#[test]
fn test_imperial_pitch_divides() {
    let mut ctx = context(UnitSystem::Imperial, 400);
    ctx.thread.set_pitch(20.0, UnitSystem::Imperial);
    ctx.position_steps = 0;
    set_spindle(&mut ctx, 10 * PPR as i32);

    let mut engine = ThreadSyncEngine::new();
    let out = engine.update(
        &ctx,
        &snapshot(levels(false, false, true), levels(true, false, true)),
    );
    // One revolution of lag at 25.4 / 20 mm per rev and 400 steps/mm.
    assert_eq!(out.raw_target, Some(508));
}

/// The active start shifts the geometry by a fraction of a revolution.
#[test]
fn test_start_offset_in_target() {
    let mut ctx = context(UnitSystem::Metric, 800);
    ctx.thread.set_num_starts(2);
    ctx.thread.set_active_start(2);
    ctx.position_steps = 0;
    set_spindle(&mut ctx, 10 * PPR as i32);

    let mut engine = ThreadSyncEngine::new();
    let out = engine.update(
        &ctx,
        &snapshot(levels(false, false, true), levels(false, true, true)),
    );
    assert_eq!(out.raw_target, Some(-1200));
}

/// Cancelling reports whether a pass was active.
#[test]
fn test_disengage() {
    let mut ctx = context(UnitSystem::Metric, 400);
    set_spindle(&mut ctx, 0);

    let mut engine = ThreadSyncEngine::new();
    assert!(!engine.disengage());
    engine.update(
        &ctx,
        &snapshot(levels(false, false, true), levels(false, true, true)),
    );
    assert!(engine.disengage());
    assert!(!engine.is_engaged());
}

/// A stop behind the engage point ends the pass in place when the switch
/// goes off; the carriage is never sent backwards to it.
#[test]
fn test_stop_behind_engage_point_ends_in_place() {
    let mut ctx = context(UnitSystem::Metric, 800);
    ctx.position_steps = 1000;
    ctx.endstops.right = Endstop::at(500);
    ctx.endstops.left = Endstop::at(1500);
    set_spindle(&mut ctx, 10 * PPR as i32);

    let mut engine = ThreadSyncEngine::new();
    let out = engine.update(
        &ctx,
        &snapshot(levels(false, false, true), levels(false, true, true)),
    );
    assert_eq!(out.target, Some(1000));

    let switch_off = snapshot(levels(false, true, true), levels(false, true, false));
    let out = engine.update(&ctx, &switch_off);
    assert_eq!(out.target, Some(1000));
    assert_eq!(
        out.event,
        Some(SyncEvent::Disengaged(DisengageReason::EndstopReached))
    );
    assert!(!engine.is_engaged());

    // Mirror image for a Left pass.
    let mut engine = ThreadSyncEngine::new();
    engine.update(
        &ctx,
        &snapshot(levels(false, false, true), levels(true, false, true)),
    );
    let switch_off = snapshot(levels(true, false, true), levels(true, false, false));
    let out = engine.update(&ctx, &switch_off);
    assert_eq!(out.target, Some(1000));
    assert!(!engine.is_engaged());
}
