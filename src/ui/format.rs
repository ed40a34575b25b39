//! Fixed-capacity text for display fields.

use core::fmt::Write;

use heapless::String;
use libm::fabsf;

use crate::config::UnitSystem;

/// Capacity of a formatted display value.
pub const FIELD_CAPACITY: usize = 24;

/// Formatted display value.
pub type FieldText = String<FIELD_CAPACITY>;

/// Shown for a disabled stop.
pub const DISABLED: &str = "---";

fn text(args: core::fmt::Arguments<'_>) -> FieldText {
    let mut s = FieldText::new();
    // Overlong values are truncated by the capacity.
    let _ = s.write_fmt(args);
    s
}

/// Position with three decimals.
pub fn position(value: f32) -> FieldText {
    text(format_args!("{:.3}", value))
}

/// Pitch with its unit: "20 tpi" or "1.25mm".
pub fn pitch(value: f32, units: UnitSystem) -> FieldText {
    match units {
        UnitSystem::Imperial => text(format_args!("{:.0} tpi", value)),
        UnitSystem::Metric => text(format_args!("{:.2}mm", value)),
    }
}

/// Spindle speed, unsigned with two decimals.
pub fn rpm(value: f32) -> FieldText {
    text(format_args!("{:.2}", fabsf(value)))
}

/// Jog speed: in/min for imperial, mm/s for metric.
pub fn feed(speed: f32, units: UnitSystem) -> FieldText {
    match units {
        UnitSystem::Imperial => text(format_args!("{:.2}ipm", speed * 60.0)),
        UnitSystem::Metric => text(format_args!("{:.2}mm/s", speed)),
    }
}

/// "2 of 3" for the starts field.
pub fn starts(active: u8, total: u8) -> FieldText {
    text(format_args!("{} of {}", active, total))
}

/// Integer value.
pub fn integer(value: u32) -> FieldText {
    text(format_args!("{}", value))
}

/// At most three decimals with trailing zeros and a bare point removed.
pub fn trim_float<const N: usize>(value: f32) -> String<N> {
    let mut s: String<N> = String::new();
    let _ = write!(s, "{:.3}", value);
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s.clear();
        let _ = s.push('0');
    }
    s
}

/// Stop position, or [`DISABLED`].
pub fn stop(value: Option<f32>) -> FieldText {
    match value {
        Some(v) => trim_float(v),
        None => text(format_args!("{}", DISABLED)),
    }
}
