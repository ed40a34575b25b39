//! Demo: one threading pass on a simulated lathe.
//!
//! This demo shows how to:
//! - Parse a controller configuration from TOML
//! - Drive a `PulseAxis` on no-op pins against a simulated clock
//! - Open the threading page and cut a pass that ends at the right stop
//!
//! Run with: `cargo run --example simulated_lathe --features std`

use std::cell::Cell;
use std::rc::Rc;

use embedded_hal_mock::eh1::delay::NoopDelay;
use leadscrew::config::{parse_config, validate_config, Endstop, MemoryStore};
use leadscrew::mocks::{MockDisplay, MockEncoder, MockInputs};
use leadscrew::motion::Direction;
use leadscrew::ui::PageId;
use leadscrew::{Clock, Controller, PulseAxis, Result, StepperAxis};

/// Pin that accepts every write.
struct NoopPin;

impl embedded_hal::digital::ErrorType for NoopPin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for NoopPin {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        Ok(())
    }
}

/// Clock shared between the axis and the loop.
#[derive(Clone, Default)]
struct SimClock(Rc<Cell<u64>>);

impl Clock for SimClock {
    fn now_us(&self) -> u64 {
        self.0.get()
    }
}

type Lathe = Controller<
    PulseAxis<NoopPin, NoopPin, NoopDelay, SimClock>,
    MockEncoder,
    MockInputs,
    MockDisplay,
    MemoryStore,
>;

const LOOP_US: u64 = 20;
const SPINDLE_RPM: u64 = 300;

/// Advance time by one loop period, turn the spindle and tick once.
fn step(els: &mut Lathe, clock: &SimClock, ppr: u64) -> Result<()> {
    let now = clock.now_us() + LOOP_US;
    clock.0.set(now);
    els.encoder_mut().ticks = (now * ppr * SPINDLE_RPM / 60_000_000) as i32;
    els.tick(now)
}

fn main() -> Result<()> {
    println!("=== Simulated Lathe ===\n");

    let config = parse_config(
        r#"
units = "metric"

[calibration]
pulses_per_revolution = 2880
steps_per_unit = 400
acceleration = 50000
max_step_rate = 20000
invert_encoder = true
"#,
    )?;
    validate_config(&config)?;

    let clock = SimClock::default();
    let axis = PulseAxis::new(NoopPin, NoopPin, NoopDelay::new(), clock.clone());

    let mut els: Lathe = Controller::new(
        &config,
        axis,
        MockEncoder::default(),
        MockInputs::default(),
        MockDisplay::default(),
        MemoryStore::new(),
    );

    // Threading page, 1 mm pitch, right stop 6 mm out.
    els.display_mut().push_key(PageId::Menu, 1);
    els.context_mut().endstops.right = Endstop::at(6 * 400);

    let ppr = config.calibration.pulses_per_revolution as u64;

    for _ in 0..1000 {
        step(&mut els, &clock, ppr)?;
    }
    println!("Page: {:?}, law: {:?}", els.mode().page(), els.law());
    println!("Pitch: {} mm/rev", els.context().thread.pitch());

    // Tap Right with the switch off: the pass coasts to the stop.
    els.inputs_mut().set_button(Direction::Right, true);
    step(&mut els, &clock, ppr)?;
    els.inputs_mut().set_button(Direction::Right, false);
    println!("Event: {:?}", els.last_sync_event());

    let mut elapsed_ms = 0;
    while els.sync().is_engaged() && elapsed_ms < 5000 {
        for _ in 0..(1000 / LOOP_US) {
            step(&mut els, &clock, ppr)?;
        }
        elapsed_ms += 1;
        if elapsed_ms % 250 == 0 {
            println!(
                "  t={:>4} ms  position {:>5} steps",
                elapsed_ms,
                els.axis().current_position()
            );
        }
    }

    while els.axis().is_running() {
        step(&mut els, &clock, ppr)?;
    }

    println!("Event: {:?}", els.last_sync_event());
    println!(
        "Stopped at {} steps ({:.3} mm)",
        els.axis().current_position(),
        els.context().position_units()
    );
    println!("RPM: {:.1}", els.context().rpm.abs());

    println!("\n=== Demo Complete ===");
    Ok(())
}
