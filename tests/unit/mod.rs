//! Unit test harness for leadscrew.
//!
//! This module organizes unit tests for each component of the library.

mod config_parsing;
mod config_validation;
mod input_editor;
mod thread_sync;
