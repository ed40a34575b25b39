//! # leadscrew
//!
//! Control core for an electronic leadscrew: keeps a stepper-driven lathe
//! carriage locked to the spindle for thread cutting, and jogs it between
//! soft endstops otherwise.
//!
//! ## Features
//!
//! - **Spindle-synchronized threading**: pitch in mm/rev or TPI, up to five starts
//! - **Jog and endstop seek**: knob-adjusted feed speed, captured or typed stops
//! - **embedded-hal 1.0**: `OutputPin` for STEP/DIR, `InputPin` for buttons,
//!   `DelayNs` for the step pulse
//! - **no_std compatible**: Core library works without standard library
//! - **Injected hardware**: axis, encoder, inputs, display and calibration store
//!   are traits, so the loop runs against deterministic fakes in tests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use leadscrew::{Controller, ControllerConfig, MemoryStore, PinInputs, PulseAxis};
//!
//! let config: ControllerConfig = leadscrew::load_config("leadscrew.toml")?;
//!
//! let axis = PulseAxis::new(step_pin, dir_pin, delay, clock.clone());
//! let inputs = PinInputs::new(knob_a, knob_b, knob_btn, left, right, enable);
//! let mut els = Controller::new(&config, axis, encoder, inputs, nextion, MemoryStore::new());
//!
//! loop {
//!     els.tick(clock.now_us())?;
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables TOML configuration files, a file-backed
//!   calibration store and the `mocks` module
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

// Must come first so the logging macros are visible to every module.
#[macro_use]
mod fmt;

// Core modules
pub mod axis;
pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod motion;
pub mod ui;

#[cfg(feature = "std")]
pub mod mocks;

// Re-exports for ergonomic API
pub use axis::{
    Clock, DigitalInputs, Display, Encoder, InputLevels, InputSnapshot, PinInputs, PulseAxis,
    StepperAxis,
};
pub use config::{
    validate_config, Calibration, CalibrationField, ConfigStore, ControllerConfig, MemoryStore,
    UnitConverter, UnitSystem,
};
pub use context::ControlContext;
pub use controller::{ControlLaw, Controller};
pub use error::{Error, Result};
pub use motion::{Direction, SpindleTracker, ThreadSpec, ThreadSyncEngine};
pub use ui::{KeyEvent, ModeStateMachine, PageId};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

#[cfg(feature = "std")]
pub use config::store::TomlFileStore;
