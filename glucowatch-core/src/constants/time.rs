//! Time-Related Constants
//!
//! All device time is milliseconds since boot.

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

/// Seconds per minute.
pub const SECONDS_PER_MINUTE: u64 = 60;

/// Minutes per hour.
pub const MINUTES_PER_HOUR: u64 = 60;

/// Hours per day.
pub const HOURS_PER_DAY: u64 = 24;

/// Milliseconds per minute.
pub const MS_PER_MINUTE: u64 = MS_PER_SECOND * SECONDS_PER_MINUTE;

/// Milliseconds per hour.
pub const MS_PER_HOUR: u64 = MS_PER_MINUTE * MINUTES_PER_HOUR;

/// Milliseconds per day.
pub const MS_PER_DAY: u64 = MS_PER_HOUR * HOURS_PER_DAY;

// ===== SAMPLING INTERVALS =====

/// Base measurement interval (milliseconds).
///
/// One reading per minute. Together with [`RING_STORE_CAPACITY`] this
/// gives exactly one day of on-device history.
///
/// [`RING_STORE_CAPACITY`]: crate::constants::buffers::RING_STORE_CAPACITY
pub const BASE_MEASUREMENT_INTERVAL_MS: u64 = MS_PER_MINUTE;

/// Fast measurement interval while hypoglycemic (milliseconds).
pub const FAST_MEASUREMENT_INTERVAL_MS: u64 = 30 * MS_PER_SECOND;

/// Sensor warm-up after power-on before the first reading (milliseconds).
///
/// Source: enzyme electrode stabilisation time
pub const SENSOR_WARMUP_MS: u64 = MS_PER_MINUTE;

// ===== SLEEP =====

/// Shortest sleep worth entering (milliseconds).
///
/// Stop-mode entry and wake-up cost more than they save below this,
/// and the wake-up latency risks overshooting the due time.
pub const MIN_SLEEP_MS: u64 = MS_PER_SECOND;
