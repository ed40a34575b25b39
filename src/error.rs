//! Error types for the leadscrew control core.
//!
//! Provides unified error handling across configuration, calibration storage,
//! axis hardware and numeric entry.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all leadscrew operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Calibration store error
    Store(StoreError),
    /// Axis hardware error
    Motor(MotorError),
    /// Numeric entry error
    Input(InputError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// A calibration field that must be positive is zero
    ZeroCalibrationField(&'static str),
    /// A timing interval is zero
    ZeroInterval(&'static str),
    /// Jog chunk must be at least one step
    ZeroJogChunk,
    /// Jog speed must be positive and finite
    InvalidJogSpeed(f32),
    /// Jog multiplier must be one of 0.01, 0.1 or 1
    InvalidJogMultiplier(f32),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Calibration store errors.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The backing store rejected the write
    WriteFailed(heapless::String<64>),
}

/// Axis hardware errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MotorError {
    /// Pin operation failed
    PinError,
}

/// Numeric entry errors.
#[derive(Debug, Clone, PartialEq)]
pub enum InputError {
    /// Text could not be parsed as a number
    Malformed(heapless::String<16>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Store(e) => write!(f, "Store error: {}", e),
            Error::Motor(e) => write!(f, "Motor error: {}", e),
            Error::Input(e) => write!(f, "Input error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::ZeroCalibrationField(name) => {
                write!(f, "Calibration field '{}' must be > 0", name)
            }
            ConfigError::ZeroInterval(name) => write!(f, "Interval '{}' must be > 0", name),
            ConfigError::ZeroJogChunk => write!(f, "Jog chunk must be at least one step"),
            ConfigError::InvalidJogSpeed(v) => write!(f, "Invalid jog speed: {}. Must be > 0", v),
            ConfigError::InvalidJogMultiplier(v) => {
                write!(f, "Invalid jog multiplier: {}. Valid values: 0.01, 0.1, 1", v)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::WriteFailed(msg) => write!(f, "Write failed: {}", msg),
        }
    }
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::PinError => write!(f, "GPIO pin operation failed"),
        }
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Malformed(text) => write!(f, "'{}' is not a number", text),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Error::Store(e)
    }
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Error::Motor(e)
    }
}

impl From<InputError> for Error {
    fn from(e: InputError) -> Self {
        Error::Input(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for StoreError {}

#[cfg(feature = "std")]
impl std::error::Error for MotorError {}

#[cfg(feature = "std")]
impl std::error::Error for InputError {}
