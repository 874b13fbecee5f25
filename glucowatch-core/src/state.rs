//! Session state
//!
//! Flags and last-seen values for one powered-on session. Created at start-up
//! and reset only by re-initialising the monitor. Timing state lives in the
//! [`Scheduler`](crate::scheduler::Scheduler).

/// Connection, pairing and last-reading state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AppState {
    /// A receiver has completed pairing this session
    pub paired: bool,
    /// Transport reported a connection at the last check
    pub connected: bool,
    /// Battery level at the last reading (percent)
    pub last_battery_pct: Option<u8>,
    /// Smoothed glucose at the last stored reading (mg/dL)
    pub last_smoothed_mg_dl: Option<f32>,
    /// Control loop cycles run
    pub cycles: u64,
    /// Sensor reads that failed
    pub sensor_failures: u32,
    /// Readings rejected by validation
    pub rejected_readings: u32,
    /// Times the clock read earlier than the last measurement attempt
    pub clock_resets: u32,
}

impl AppState {
    /// Check if records and alerts may be sent
    pub fn link_ready(&self) -> bool {
        self.paired && self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_needs_pairing_and_connection() {
        let mut state = AppState {
            connected: true,
            ..AppState::default()
        };
        assert!(!state.link_ready());
        state.paired = true;
        assert!(state.link_ready());
    }
}
