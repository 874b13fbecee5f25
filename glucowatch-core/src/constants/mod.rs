//! Constants for the GlucoWatch core
//!
//! Every numeric value the core relies on lives here, with its unit in the
//! name and its source in the doc comment. Defaults in
//! [`MonitorConfig`](crate::config::MonitorConfig) are built from these.
//!
//! ## Organization
//!
//! - **Clinical**: glucose validity range and alarm thresholds
//! - **Time**: conversions, sampling intervals, warm-up, sleep thresholds
//! - **Buffers**: compile-time capacities
//! - **Power**: battery thresholds and logging cadence

/// Glucose validity range and clinical alarm thresholds.
pub mod clinical;

/// Time conversions and scheduling intervals.
pub mod time;

/// Compile-time capacities for fixed-size storage.
pub mod buffers;

/// Battery thresholds and power-policy timing.
pub mod power;

// Re-export commonly used constants for convenience
pub use clinical::{
    GLUCOSE_VALID_MIN_MG_DL, GLUCOSE_VALID_MAX_MG_DL,
    HYPOGLYCEMIA_THRESHOLD_MG_DL, HYPERGLYCEMIA_THRESHOLD_MG_DL,
    RAPID_CHANGE_THRESHOLD_MG_DL_PER_MIN,
};

pub use time::{
    MS_PER_SECOND, MS_PER_MINUTE,
    BASE_MEASUREMENT_INTERVAL_MS, FAST_MEASUREMENT_INTERVAL_MS,
    SENSOR_WARMUP_MS, MIN_SLEEP_MS,
};

pub use buffers::{
    RING_STORE_CAPACITY, SMOOTHING_WINDOW, ALERT_OUTBOX_CAPACITY,
    MAX_RECORDS_PER_CYCLE,
};

pub use power::{LOW_BATTERY_THRESHOLD_PCT, BATTERY_RECOVERY_MARGIN_PCT};
