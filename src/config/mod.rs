//! Configuration module for leadscrew.
//!
//! Calibration, unit conversion, soft endstops and the controller
//! configuration loaded from TOML files (with `std` feature) or built in code.

mod calibration;
mod limits;
#[cfg(feature = "std")]
mod loader;
pub mod store;
mod system;
pub mod units;
mod validation;

pub use calibration::{Calibration, CalibrationField, CalibrationRecord, CALIBRATION_MARKER};
pub use limits::{Endstop, Endstops, MAX_TRAVEL_MM};
pub use store::{ConfigStore, LoadOutcome, MemoryStore};
pub use system::{ControllerConfig, JogConfig, TimingConfig};
pub use units::{UnitConverter, UnitSystem, MM_PER_INCH};
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};
