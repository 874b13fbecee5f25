//! Shared fixtures for integration tests
//!
//! - [`devices`]: scripted collaborators sharing one call journal
//! - [`traces`]: glucose profiles for multi-cycle scenarios

#![allow(dead_code)]

pub mod devices;
pub mod traces;

use glucowatch_core::{CycleReport, MonitorConfig};

pub use devices::{Devices, TestMonitor};

/// Run cycles until one takes a measurement, at most `limit` cycles
pub fn run_until_measured(monitor: &mut TestMonitor, limit: usize) -> Option<CycleReport> {
    (0..limit)
        .map(|_| monitor.run_cycle())
        .find(|report| report.measurement.is_some())
}

/// Default configuration with a short warm-up, which keeps scenarios readable
pub fn quick_config() -> MonitorConfig {
    MonitorConfig::default().with_warmup(1_000)
}
