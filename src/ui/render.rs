//! Page enter actions and periodic status refresh.

use crate::axis::Display;
use crate::config::CalibrationField;
use crate::context::ControlContext;
use crate::motion::{Direction, MAX_STARTS};

use super::format;
use super::{ModeStateMachine, NamedColor, PageId};

const MENU_FEED: &str = "menu.fr.txt";
const MENU_RPM: &str = "menu.rpm.txt";

const FEED_SPEED: &str = "powerfeed.fr.txt";
const FEED_POSITION: &str = "powerfeed.position.txt";
const FEED_RPM: &str = "powerfeed.rpm.txt";
const FEED_LEFT_STOP: &str = "powerfeed.leftstop.txt";
const FEED_RIGHT_STOP: &str = "powerfeed.rightstop.txt";
const FEED_UNITS: &str = "powerfeed.units.txt";

const THREAD_POSITION: &str = "threading.position.txt";
const THREAD_PITCH: &str = "threading.pitch.txt";
const THREAD_RPM: &str = "threading.rpm.txt";
const THREAD_LEFT_STOP: &str = "threading.leftstop.txt";
const THREAD_RIGHT_STOP: &str = "threading.rightstop.txt";
const THREAD_STARTS: &str = "threading.starts.txt";
const THREAD_UNITS: &str = "threading.bunits.txt";
const THREAD_LABEL: &str = "threading.threadlabel.txt";

/// Background colors of the start buttons b0..b4 then the count buttons b5..b9.
const STARTS_BUTTONS: [&str; 10] = [
    "starts.b0.bco",
    "starts.b1.bco",
    "starts.b2.bco",
    "starts.b3.bco",
    "starts.b4.bco",
    "starts.b5.bco",
    "starts.b6.bco",
    "starts.b7.bco",
    "starts.b8.bco",
    "starts.b9.bco",
];

const INPUT_VALUE: &str = "input.value.txt";
const INPUT_QUESTION: &str = "input.q.txt";
const INPUT_SIGN_BUTTON: &str = "b15";
const INPUT_DOT_BUTTON: &str = "b11";
const INPUT_CURRENT_BUTTON: &str = "b3";

const ERROR_TITLE: &str = "error.title.txt";
const ERROR_MESSAGE: &str = "error.msg.txt";

const SETUP_INVERT: &str = "setup.invert.txt";

fn setup_field(field: CalibrationField) -> &'static str {
    match field {
        CalibrationField::PulsesPerRevolution => "setup.ppr.txt",
        CalibrationField::StepsPerUnit => "setup.spu.txt",
        CalibrationField::Acceleration => "setup.accel.txt",
        CalibrationField::MaxStepRate => "setup.rate.txt",
    }
}

fn selected(on: bool) -> NamedColor {
    if on {
        NamedColor::Selected
    } else {
        NamedColor::Normal
    }
}

/// Write every field of the current page. Idempotent.
pub fn render_page<D: Display + ?Sized>(
    display: &mut D,
    mode: &ModeStateMachine,
    ctx: &ControlContext,
) {
    match mode.page() {
        PageId::Menu => {
            display.write_text(MENU_FEED, &format::feed(ctx.feed.speed, ctx.units));
            display.write_text(MENU_RPM, &format::rpm(ctx.rpm));
        }
        PageId::JogFeed => {
            display.write_text(FEED_SPEED, &format::feed(ctx.feed.speed, ctx.units));
            display.write_text(FEED_POSITION, &format::position(ctx.position_units()));
            display.write_text(
                FEED_LEFT_STOP,
                &format::stop(ctx.endstop_units(Direction::Left)),
            );
            display.write_text(
                FEED_RIGHT_STOP,
                &format::stop(ctx.endstop_units(Direction::Right)),
            );
            display.write_text(FEED_UNITS, ctx.units.label(true));
        }
        PageId::Threading => {
            display.write_text(THREAD_POSITION, &format::position(ctx.position_units()));
            display.write_text(
                THREAD_LEFT_STOP,
                &format::stop(ctx.endstop_units(Direction::Left)),
            );
            display.write_text(
                THREAD_RIGHT_STOP,
                &format::stop(ctx.endstop_units(Direction::Right)),
            );
            display.write_text(
                THREAD_STARTS,
                &format::starts(ctx.thread.active_start(), ctx.thread.num_starts()),
            );
            display.write_text(THREAD_UNITS, ctx.units.label(true));
            display.write_text(THREAD_LABEL, "Thread:");
            display.write_text(THREAD_PITCH, &format::pitch(ctx.thread.pitch(), ctx.units));
        }
        PageId::Starts => {
            let (starts, counts) = STARTS_BUTTONS.split_at(MAX_STARTS as usize);
            for (n, field) in (1..=MAX_STARTS).zip(starts) {
                display.write_color(field, selected(ctx.thread.active_start() == n));
            }
            for (n, field) in (1..=MAX_STARTS).zip(counts) {
                display.write_color(field, selected(ctx.thread.num_starts() == n));
            }
        }
        PageId::Setup => {
            for field in CalibrationField::ALL {
                display.write_text(
                    setup_field(field),
                    &format::integer(ctx.calibration.get(field)),
                );
            }
            let invert = if ctx.calibration.invert_encoder { "Yes" } else { "No" };
            display.write_text(SETUP_INVERT, invert);
        }
        PageId::InputForm => {
            if let Some(form) = mode.form() {
                let kind = form.target().kind();
                display.set_visible(INPUT_SIGN_BUTTON, kind.allows_sign());
                display.set_visible(INPUT_DOT_BUTTON, kind.allows_dot());
                display.set_visible(INPUT_CURRENT_BUTTON, kind.allows_current());
                display.write_text(INPUT_VALUE, form.text());
                display.write_text(INPUT_QUESTION, form.target().prompt());
            }
        }
        PageId::Error => {
            if let Some(error) = mode.error() {
                display.write_text(ERROR_TITLE, error.title());
                display.write_text(ERROR_MESSAGE, error.message());
            }
        }
    }
}

/// Write the fast-changing status fields of `page`.
pub fn refresh_status<D: Display + ?Sized>(display: &mut D, page: PageId, ctx: &ControlContext) {
    match page {
        PageId::Menu => {
            display.write_text(MENU_FEED, &format::feed(ctx.feed.speed, ctx.units));
            display.write_text(MENU_RPM, &format::rpm(ctx.rpm));
        }
        PageId::JogFeed => {
            display.write_text(FEED_SPEED, &format::feed(ctx.feed.speed, ctx.units));
            display.write_text(FEED_POSITION, &format::position(ctx.position_units()));
            display.write_text(FEED_RPM, &format::rpm(ctx.rpm));
        }
        PageId::Threading => {
            display.write_text(THREAD_POSITION, &format::position(ctx.position_units()));
            display.write_text(THREAD_PITCH, &format::pitch(ctx.thread.pitch(), ctx.units));
            display.write_text(THREAD_RPM, &format::rpm(ctx.rpm));
        }
        PageId::InputForm | PageId::Error | PageId::Starts | PageId::Setup => {}
    }
}
