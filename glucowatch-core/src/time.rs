//! Device time
//!
//! The core only ever sees a monotonic millisecond counter that starts at
//! boot. It never needs wall-clock time: timestamps are relative, and the
//! host paired over the radio maps them to calendar time.

use crate::constants::time::MS_PER_MINUTE;

/// Timestamp in milliseconds since device boot
pub type Timestamp = u64;

/// Milliseconds elapsed from `earlier` to `later`, zero if time went backwards
pub fn elapsed_ms(earlier: Timestamp, later: Timestamp) -> u64 {
    later.saturating_sub(earlier)
}

/// Convert a millisecond duration to fractional minutes
pub fn ms_to_minutes(ms: u64) -> f32 {
    ms as f32 / MS_PER_MINUTE as f32
}

/// Rate of change per minute over a fixed interval
///
/// Returns 0 for a zero interval rather than dividing by zero.
pub fn rate_per_minute(value_delta: f32, interval_ms: u64) -> f32 {
    if interval_ms == 0 {
        return 0.0;
    }

    value_delta / ms_to_minutes(interval_ms)
}

/// Manually driven clock for tests and simulation
#[derive(Debug, Clone, Default)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    /// Create a clock reading `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Current reading
    pub fn now(&self) -> Timestamp {
        self.timestamp
    }

    /// Jump to an absolute time
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Move forward by `ms`
    pub fn advance(&mut self, ms: u64) {
        self.timestamp = self.timestamp.saturating_add(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_time_advances() {
        let mut time = FixedTime::new(1000);
        assert_eq!(time.now(), 1000);

        time.advance(500);
        assert_eq!(time.now(), 1500);
    }

    #[test]
    fn rate_calculation() {
        // 15 mg/dL over 5 minutes
        assert_eq!(rate_per_minute(15.0, 5 * MS_PER_MINUTE), 3.0);

        // Falling values give a negative rate
        assert_eq!(rate_per_minute(-6.0, 2 * MS_PER_MINUTE), -3.0);

        // Zero interval
        assert_eq!(rate_per_minute(10.0, 0), 0.0);
    }

    #[test]
    fn elapsed_saturates() {
        assert_eq!(elapsed_ms(100, 250), 150);
        assert_eq!(elapsed_ms(250, 100), 0);
    }
}
