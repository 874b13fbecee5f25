//! Error Types for the Measurement Core
//!
//! ## Design Philosophy
//!
//! The error system follows the same embedded rules as the rest of the core:
//!
//! 1. **Small Size**: Every variant is a handful of scalars, so errors can be
//!    returned from the control loop and stored in reports without cost.
//!
//! 2. **No Heap Allocation**: Messages are `&'static str` only.
//!
//! 3. **Copy Semantics**: All error types are `Copy`.
//!
//! ## Error Categories
//!
//! The categories decide how the control loop reacts, so they are kept in
//! separate types rather than one catch-all enum:
//!
//! ### Transient (retry next cycle)
//! - [`SensorError`]: the sensor produced no reading this cycle
//! - [`CryptoError`]: a single record could not be encrypted
//! - [`TransportError`]: a single send failed or the link dropped
//! - [`PowerError`]: the fuel gauge or clock misbehaved
//!
//! ### Validation rejection (discard the data)
//! - [`ValidationError`]: the reading or stored record is bad data. Never
//!   retried, never stored, never transmitted.
//!
//! ### Fatal (never enter the main loop)
//! - [`InitError`]: a subsystem failed to come up at boot
//! - [`ConfigError`]: the configuration is inconsistent
//!
//! ## Handling Strategy
//!
//! ```rust
//! use glucowatch_core::{MeasurementRecord, ValidationError};
//!
//! match MeasurementRecord::new(1_000, 700.0, 33.0, 80) {
//!     Ok(_record) => {
//!         // Store and evaluate
//!     }
//!     Err(ValidationError::OutOfRange { .. }) => {
//!         // Physiologically impossible - drop it
//!     }
//!     Err(_) => {
//!         // Other bad data - drop it
//!     }
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Bad data: a reading or record that must never be stored or transmitted
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ValidationError {
    /// Value outside the accepted range
    #[error("Value {value} outside range [{min}, {max}]")]
    OutOfRange {
        /// The rejected value
        value: f32,
        /// Lowest accepted value
        min: f32,
        /// Highest accepted value
        max: f32,
    },

    /// Value makes no physical sense (NaN, infinity)
    #[error("Invalid value: not a valid number")]
    InvalidValue,

    /// Reading is timestamped before the latest stored record
    #[error("Timestamp {current} precedes latest record at {previous}")]
    TimestampRegression {
        /// Timestamp of the latest stored record
        previous: u64,
        /// Timestamp of the rejected reading
        current: u64,
    },

    /// Stored integrity code does not match the record payload
    #[error("Integrity check failed: stored {stored:#06x}, computed {computed:#06x}")]
    IntegrityMismatch {
        /// Code carried by the record
        stored: u16,
        /// Code recomputed from the payload
        computed: u16,
    },
}

/// Sensor driver failures. The cycle simply has no measurement.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Driver did not answer in time
    #[error("Sensor read timed out")]
    Timeout,

    /// Driver answered but reported a fault
    #[error("Sensor fault: {reason}")]
    Fault {
        /// Driver-supplied description
        reason: &'static str,
    },

    /// Sensor is still stabilising after power-up
    #[error("Sensor not ready")]
    NotReady,
}

/// Transport failures for a single send
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Link dropped while sending
    #[error("Transport disconnected")]
    Disconnected,

    /// Peer rejected or failed to acknowledge the payload
    #[error("Send failed: {reason}")]
    SendFailed {
        /// Transport-supplied description
        reason: &'static str,
    },
}

/// Encryption failures for a single record
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CryptoError {
    /// No session key established yet
    #[error("No session key")]
    NoKey,

    /// Output does not fit the fixed payload frame
    #[error("Ciphertext of {len} bytes exceeds frame")]
    OutputTooLarge {
        /// Produced length
        len: usize,
    },

    /// Cipher engine reported a fault
    #[error("Cipher fault: {reason}")]
    Fault {
        /// Engine-supplied description
        reason: &'static str,
    },
}

/// Power and clock hardware failures
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerError {
    /// Supply voltage too low to run the radio and sensor
    #[error("Supply brown-out")]
    BrownOut,

    /// Fuel gauge or RTC did not respond
    #[error("Power fault: {reason}")]
    Fault {
        /// Driver-supplied description
        reason: &'static str,
    },
}

/// Inconsistent configuration
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// An interval or period that must be positive is zero
    #[error("{field} must be non-zero")]
    Zero {
        /// Offending field
        field: &'static str,
    },

    /// Fast sampling interval is not shorter than the base interval
    #[error("Fast interval {fast_ms}ms must be shorter than base interval {base_ms}ms")]
    FastIntervalNotShorter {
        /// Configured base interval
        base_ms: u64,
        /// Configured fast interval
        fast_ms: u64,
    },

    /// A lower bound is not below its upper bound
    #[error("Invalid range for {field}: [{low}, {high}]")]
    InvalidRange {
        /// Offending field
        field: &'static str,
        /// Configured lower bound
        low: f32,
        /// Configured upper bound
        high: f32,
    },

    /// Battery threshold outside 0..=100 percent
    #[error("Battery threshold {percent}% outside 0..=100")]
    BatteryThreshold {
        /// Configured threshold
        percent: u8,
    },

    /// Ring store cannot hold a day of readings at the base interval
    #[error("{capacity} slots cover {covered_ms}ms, less than a day")]
    StoreTooSmall {
        /// Ring store capacity
        capacity: usize,
        /// Time the store spans at the base interval
        covered_ms: u64,
    },
}

/// Subsystems brought up at boot, in start-up order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Subsystem {
    /// Power and clock hardware
    Power = 0,
    /// Glucose sensor front end
    Sensor = 1,
    /// Wireless transport
    Transport = 2,
    /// Cryptographic module
    Crypto = 3,
    /// Configuration checks
    Config = 4,
}

impl Subsystem {
    /// Get human-readable name
    pub const fn name(&self) -> &'static str {
        match self {
            Subsystem::Power => "power",
            Subsystem::Sensor => "sensor",
            Subsystem::Transport => "transport",
            Subsystem::Crypto => "crypto",
            Subsystem::Config => "config",
        }
    }
}

/// Fatal start-up failure. The monitor must not run.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{} failed to initialise: {}", .subsystem.name(), .reason)]
pub struct InitError {
    /// Subsystem that failed
    pub subsystem: Subsystem,
    /// Failure description
    pub reason: &'static str,
}

impl InitError {
    /// Create a new init error
    pub const fn new(subsystem: Subsystem, reason: &'static str) -> Self {
        Self { subsystem, reason }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ValidationError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::OutOfRange { value, min, max } =>
                defmt::write!(fmt, "Value {} outside [{}, {}]", value, min, max),
            Self::InvalidValue =>
                defmt::write!(fmt, "Invalid value"),
            Self::TimestampRegression { previous, current } =>
                defmt::write!(fmt, "Timestamp {} before {}", current, previous),
            Self::IntegrityMismatch { stored, computed } =>
                defmt::write!(fmt, "Integrity {=u16:#x} != {=u16:#x}", stored, computed),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for InitError {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{} init failed: {}", self.subsystem.name(), self.reason)
    }
}
