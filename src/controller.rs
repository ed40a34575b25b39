//! The control loop.
//!
//! One [`Controller::tick`] per loop iteration, never blocking:
//!
//! 1. sample inputs and the spindle encoder
//! 2. apply knob detents
//! 3. run the control law selected by the active page
//! 4. advance the axis
//! 5. sample RPM at its own slow rate
//! 6. service the display, rate-limited and skipped while the axis moves
//!    or a threading pass is engaged

use crate::axis::{DigitalInputs, Display, Encoder, InputSnapshot, StepperAxis};
use crate::config::store::{load_calibration, persist_calibration};
use crate::config::{ConfigStore, ControllerConfig, LoadOutcome};
use crate::context::ControlContext;
use crate::error::Result;
use crate::motion::{
    DisengageReason, FeedCommand, FeedEngine, JogMultiplier, RpmSampler, SpindleTracker,
    SyncEvent, ThreadSyncEngine,
};
use crate::ui::{refresh_status, render_page, ModeOutcome, ModeStateMachine, PageId};

/// Largest number of key events handled in one tick.
const MAX_KEYS_PER_TICK: usize = 4;

/// Control law driving the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlLaw {
    /// Jog and endstop seek.
    Feed,
    /// Spindle-synchronized threading.
    Thread,
    /// No motion commands.
    Idle,
}

impl ControlLaw {
    /// Law owned by a page.
    pub fn for_page(page: PageId) -> Self {
        match page {
            PageId::Menu | PageId::JogFeed => ControlLaw::Feed,
            PageId::Threading => ControlLaw::Thread,
            PageId::InputForm | PageId::Error | PageId::Starts | PageId::Setup => ControlLaw::Idle,
        }
    }
}

/// Electronic leadscrew controller.
///
/// # Type Parameters
///
/// * `A` - Carriage stepper axis
/// * `E` - Spindle encoder
/// * `I` - Buttons, knob and enable switch
/// * `D` - Touchscreen
/// * `S` - Calibration store
pub struct Controller<A, E, I, D, S>
where
    A: StepperAxis,
    E: Encoder,
    I: DigitalInputs,
    D: Display,
    S: ConfigStore,
{
    axis: A,
    encoder: E,
    inputs: I,
    display: D,
    store: S,

    ctx: ControlContext,
    tracker: SpindleTracker,
    sync: ThreadSyncEngine,
    feed: FeedEngine,
    mode: ModeStateMachine,
    rpm: RpmSampler,
    law: ControlLaw,

    display_interval_us: u64,
    last_display_us: Option<u64>,
    last_event: Option<SyncEvent>,
}

impl<A, E, I, D, S> Controller<A, E, I, D, S>
where
    A: StepperAxis,
    E: Encoder,
    I: DigitalInputs,
    D: Display,
    S: ConfigStore,
{
    /// Build the controller, load calibration and show the main menu.
    ///
    /// `config` is expected to be validated; see
    /// [`validate_config`](crate::config::validate_config).
    pub fn new(
        config: &ControllerConfig,
        axis: A,
        encoder: E,
        inputs: I,
        display: D,
        mut store: S,
    ) -> Self {
        let (calibration, outcome) = load_calibration(&mut store, &config.calibration);

        let mut ctx = ControlContext::new(calibration, config.units);
        ctx.feed.speed = config.jog.speed;
        ctx.feed.multiplier = JogMultiplier::from_value(config.jog.multiplier).unwrap_or_default();

        let mut controller = Self {
            axis,
            encoder,
            inputs,
            display,
            store,
            tracker: SpindleTracker::from_calibration(&ctx.calibration),
            ctx,
            sync: ThreadSyncEngine::new(),
            feed: FeedEngine::new(config.jog.chunk_steps),
            mode: ModeStateMachine::new(),
            rpm: RpmSampler::new(config.timing.rpm_interval_ms),
            law: ControlLaw::Feed,
            display_interval_us: config.timing.display_interval_ms as u64 * 1000,
            last_display_us: None,
            last_event: None,
        };

        controller.apply_caps();
        controller.ctx.position_steps = controller.axis.current_position();
        controller.enter_page();

        if outcome == LoadOutcome::DefaultsUnsaved {
            controller.show_error("Storage", "Defaults not saved");
        }

        controller
    }

    /// Run one loop iteration at `now_us`.
    pub fn tick(&mut self, now_us: u64) -> Result<()> {
        let inputs = self.inputs.sample()?;
        self.ctx.spindle = self.tracker.update(self.encoder.read());
        self.ctx.position_steps = self.axis.current_position();

        if inputs.held.knob_button {
            let engaged = self.sync.is_engaged();
            self.mode.handle_knob(inputs.knob_detent(), &mut self.ctx, engaged);
        }

        self.select_law();
        self.run_law(&inputs);

        self.axis.run()?;
        self.ctx.position_steps = self.axis.current_position();

        let count = self.ctx.spindle.count();
        if let Some(rpm) = self
            .rpm
            .sample(now_us, count, self.tracker.pulses_per_revolution())
        {
            self.ctx.rpm = rpm;
        }

        if !self.axis.is_running() && !self.sync.is_engaged() {
            self.service_display(now_us);
        }

        Ok(())
    }

    /// Open the error page; it returns to the current page when dismissed.
    pub fn show_error(&mut self, title: &str, message: &str) {
        let outcome = self.mode.show_error(title, message);
        self.apply_outcome(outcome);
    }

    /// Shared control state.
    pub fn context(&self) -> &ControlContext {
        &self.ctx
    }

    /// Mutable control state.
    pub fn context_mut(&mut self) -> &mut ControlContext {
        &mut self.ctx
    }

    /// Page state machine.
    pub fn mode(&self) -> &ModeStateMachine {
        &self.mode
    }

    /// Thread sync engine.
    pub fn sync(&self) -> &ThreadSyncEngine {
        &self.sync
    }

    /// Last session transition reported by the sync engine.
    pub fn last_sync_event(&self) -> Option<SyncEvent> {
        self.last_event
    }

    /// Active control law.
    pub fn law(&self) -> ControlLaw {
        self.law
    }

    /// Get a reference to the axis.
    pub fn axis(&self) -> &A {
        &self.axis
    }

    /// Get a mutable reference to the axis.
    pub fn axis_mut(&mut self) -> &mut A {
        &mut self.axis
    }

    /// Get a mutable reference to the encoder.
    pub fn encoder_mut(&mut self) -> &mut E {
        &mut self.encoder
    }

    /// Get a mutable reference to the inputs.
    pub fn inputs_mut(&mut self) -> &mut I {
        &mut self.inputs
    }

    /// Get a reference to the display.
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Get a mutable reference to the display.
    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Get a reference to the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Release the hardware.
    pub fn release(self) -> (A, E, I, D, S) {
        (self.axis, self.encoder, self.inputs, self.display, self.store)
    }

    fn apply_caps(&mut self) {
        let calibration = &self.ctx.calibration;
        self.axis.set_acceleration(calibration.acceleration as f32);
        self.axis.set_max_speed(calibration.max_step_rate as f32);
    }

    fn select_law(&mut self) {
        let law = ControlLaw::for_page(self.mode.page());
        if law == self.law {
            return;
        }
        if self.law == ControlLaw::Thread && self.sync.disengage() {
            self.last_event = Some(SyncEvent::Disengaged(DisengageReason::Cancelled));
        }
        debug!("control law changed");
        self.axis.stop();
        self.law = law;
    }

    fn run_law(&mut self, inputs: &InputSnapshot) {
        match self.law {
            ControlLaw::Feed => {
                let out = self.feed.update(&self.ctx, inputs, self.axis.is_running());
                self.axis.set_max_speed(out.max_speed);
                match out.command {
                    FeedCommand::MoveTo(target) => self.axis.move_to(target),
                    FeedCommand::Stop => self.axis.stop(),
                    FeedCommand::Hold => {}
                }
            }
            ControlLaw::Thread => {
                let out = self.sync.update(&self.ctx, inputs);
                self.axis.set_max_speed(out.max_speed);
                if let Some(target) = out.target {
                    self.axis.move_to(target);
                }
                if out.event.is_some() {
                    self.last_event = out.event;
                }
            }
            ControlLaw::Idle => {}
        }
    }

    fn service_display(&mut self, now_us: u64) {
        for _ in 0..MAX_KEYS_PER_TICK {
            let Some(key) = self.display.poll_key() else {
                break;
            };
            let engaged = self.sync.is_engaged();
            let outcome = self.mode.handle_key(key, &mut self.ctx, engaged);
            self.apply_outcome(outcome);
        }

        let due = match self.last_display_us {
            Some(last) => now_us.saturating_sub(last) >= self.display_interval_us,
            None => true,
        };
        if due {
            refresh_status(&mut self.display, self.mode.page(), &self.ctx);
            self.last_display_us = Some(now_us);
        }
    }

    fn apply_outcome(&mut self, outcome: ModeOutcome) {
        if outcome.zero_axis {
            self.axis.set_current_position(0);
            self.ctx.position_steps = 0;
        }

        if outcome.calibration_changed {
            self.tracker.set_calibration(&self.ctx.calibration);
            self.apply_caps();
            if persist_calibration(&mut self.store, &self.ctx.calibration).is_err() {
                let shown = self.mode.show_error("Storage", "Calibration not saved");
                self.enter_or_redraw(shown);
                return;
            }
        }

        self.enter_or_redraw(outcome);
    }

    fn enter_or_redraw(&mut self, outcome: ModeOutcome) {
        if outcome.page_changed {
            self.enter_page();
        } else if outcome.redraw {
            render_page(&mut self.display, &self.mode, &self.ctx);
        }
    }

    fn enter_page(&mut self) {
        render_page(&mut self.display, &self.mode, &self.ctx);
        self.display.goto_page(self.mode.page());
    }
}
