//! Power Constants

use super::time::MS_PER_HOUR;

/// Low battery threshold (percent). Low when at or below.
pub const LOW_BATTERY_THRESHOLD_PCT: u8 = 15;

/// Margin above the threshold the battery must recover by before the core
/// leaves emergency mode (percent).
///
/// A charger briefly lifting the reading by a point or two must not bounce
/// the device in and out of emergency mode.
pub const BATTERY_RECOVERY_MARGIN_PCT: u8 = 10;

/// Battery status log period (milliseconds).
pub const BATTERY_LOG_INTERVAL_MS: u64 = MS_PER_HOUR;
