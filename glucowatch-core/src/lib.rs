//! Measurement and alarm core for the GlucoWatch continuous glucose monitor
//!
//! Runs the periodic sensing loop of a wearable CGM patch: read the biosensor,
//! validate and store the reading, smooth it, raise clinical alerts, and hand
//! encrypted records to the radio when a paired host is connected.
//! Designed for a battery-powered microcontroller.
//!
//! Key constraints:
//! - No heap allocation anywhere in the core
//! - One control loop, run to completion each cycle, then sleep
//! - Every hardware collaborator sits behind a trait in [`traits`]
//!
//! ```ignore
//! use glucowatch_core::{Monitor, MonitorConfig};
//!
//! // Board support crate provides the four collaborators
//! let (sensor, transport, cipher, power) = board::devices();
//!
//! let mut monitor = match Monitor::start(MonitorConfig::default(), sensor, transport, cipher, power) {
//!     Ok(monitor) => monitor,
//!     Err(_) => return, // Hardware is already in its error state
//! };
//!
//! loop {
//!     monitor.run_cycle();
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod macros;

pub mod alarms;
pub mod buffer;
pub mod config;
pub mod constants;
pub mod errors;
pub mod filter;
pub mod monitor;
pub mod power;
pub mod record;
pub mod scheduler;
pub mod state;
pub mod time;
pub mod traits;
pub mod transmit;

// Public API
pub use alarms::{Alert, AlarmEvaluator, AlarmThresholds, Assessment, GlucoseLevel};
pub use buffer::{RingStore, SlotId};
pub use config::MonitorConfig;
pub use errors::{
    ConfigError, CryptoError, InitError, PowerError, SensorError, Subsystem, TransportError,
    ValidationError, ValidationResult,
};
pub use filter::SmoothingFilter;
pub use monitor::{CycleReport, MeasurementOutcome, Monitor};
pub use power::{PowerMode, PowerPolicy};
pub use record::MeasurementRecord;
pub use scheduler::{Scheduler, SleepDecision};
pub use state::AppState;
pub use transmit::{TransmissionPipeline, TransmitPolicy, TransmitReport};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
