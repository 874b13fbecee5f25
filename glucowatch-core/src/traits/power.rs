//! Power, clock and sleep control

use crate::errors::PowerError;
use crate::time::Timestamp;

/// Board power management and the monotonic clock
pub trait PowerControl {
    /// Bring up the fuel gauge and clock. Called once at boot, first.
    fn init(&mut self) -> Result<(), PowerError> {
        Ok(())
    }

    /// Milliseconds since boot
    fn now(&self) -> Timestamp;

    /// Battery level in percent (0–100)
    fn battery_level(&mut self) -> u8;

    /// Enter low-power sleep for `duration_ms`
    ///
    /// Returns after waking. Wake early on any interrupt is fine; the core
    /// recomputes its schedule from [`now`](Self::now).
    fn enter_sleep(&mut self, duration_ms: u64);

    /// Shed load: radio advertising off, clocks down
    fn enter_emergency_mode(&mut self);

    /// Restore normal operation after the battery recovered
    fn exit_emergency_mode(&mut self) {}

    /// Signal an unrecoverable start-up failure (LED pattern, halt)
    fn enter_error_state(&mut self);
}
