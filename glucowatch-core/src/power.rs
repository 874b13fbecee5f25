//! Power Policy
//!
//! Watches the battery every cycle, independent of measurement timing.
//!
//! ```text
//!            battery ≤ threshold
//!   ┌────────┐ ──────────────────────→ ┌───────────┐
//!   │ Normal │                         │ Emergency │
//!   └────────┘ ←────────────────────── └───────────┘
//!            battery ≥ threshold + margin
//! ```
//!
//! Every check at or below the threshold raises `LOW_BATTERY`, whether or not
//! a reading was taken; the alert outbox keeps only the latest one. The
//! hardware is asked to shed load once, on entry. The core never leaves
//! emergency mode on a marginal reading: the battery has to come back by the
//! recovery margin first (a charger, a battery swap).

use crate::alarms::Alert;
use crate::config::MonitorConfig;
use crate::time::{elapsed_ms, Timestamp};
use crate::traits::PowerControl;

/// Power operating state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PowerMode {
    /// Normal operation
    Normal = 0,
    /// Low-battery load shedding
    Emergency = 1,
}

/// Mode change produced by a power check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerTransition {
    /// Battery fell to the threshold
    EnteredEmergency,
    /// Battery recovered past threshold plus margin
    Recovered,
}

/// Result of one power check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerCheck {
    /// Battery level read this cycle (percent)
    pub battery_pct: u8,
    /// Mode after the check
    pub mode: PowerMode,
    /// Mode change, if any
    pub transition: Option<PowerTransition>,
    /// Alert raised by this check
    pub alert: Option<Alert>,
}

/// Battery watcher and emergency escalation
#[derive(Debug, Clone)]
pub struct PowerPolicy {
    low_threshold_pct: u8,
    recovery_margin_pct: u8,
    log_interval_ms: u64,
    mode: PowerMode,
    last_log: Option<Timestamp>,
}

impl PowerPolicy {
    /// Create a policy in normal mode
    pub fn new(low_threshold_pct: u8, recovery_margin_pct: u8, log_interval_ms: u64) -> Self {
        Self {
            low_threshold_pct,
            recovery_margin_pct,
            log_interval_ms,
            mode: PowerMode::Normal,
            last_log: None,
        }
    }

    /// Create a policy from monitor configuration
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(
            config.thresholds.low_battery_pct,
            config.battery_recovery_margin_pct,
            config.battery_log_interval_ms,
        )
    }

    /// Current mode
    pub fn mode(&self) -> PowerMode {
        self.mode
    }

    /// Battery level needed to leave emergency mode
    pub fn recovery_level_pct(&self) -> u8 {
        self.low_threshold_pct.saturating_add(self.recovery_margin_pct)
    }

    /// Apply a battery reading to the mode state machine
    ///
    /// Pure decision; [`check`](Self::check) drives the hardware.
    pub fn assess(&mut self, battery_pct: u8) -> PowerCheck {
        let transition = match self.mode {
            PowerMode::Normal if battery_pct <= self.low_threshold_pct => {
                self.mode = PowerMode::Emergency;
                Some(PowerTransition::EnteredEmergency)
            }
            PowerMode::Emergency if battery_pct >= self.recovery_level_pct() => {
                self.mode = PowerMode::Normal;
                Some(PowerTransition::Recovered)
            }
            _ => None,
        };

        let alert =
            (battery_pct <= self.low_threshold_pct).then_some(Alert::LowBattery { battery_pct });

        PowerCheck {
            battery_pct,
            mode: self.mode,
            transition,
            alert,
        }
    }

    /// Read the battery, escalate or recover, and log periodically
    pub fn check<P: PowerControl>(&mut self, power: &mut P, now: Timestamp) -> PowerCheck {
        let battery_pct = power.battery_level();
        let result = self.assess(battery_pct);

        match result.transition {
            Some(PowerTransition::EnteredEmergency) => {
                log_warn!("battery {}%, entering emergency mode", battery_pct);
                power.enter_emergency_mode();
            }
            Some(PowerTransition::Recovered) => {
                log_info!("battery recovered to {}%, leaving emergency mode", battery_pct);
                power.exit_emergency_mode();
            }
            None => {}
        }

        if self.log_due(now) {
            log_info!("battery {}%", battery_pct);
            self.last_log = Some(now);
        }

        result
    }

    fn log_due(&self, now: Timestamp) -> bool {
        match self.last_log {
            Some(last) => elapsed_ms(last, now) >= self.log_interval_ms,
            None => true,
        }
    }
}

impl Default for PowerPolicy {
    fn default() -> Self {
        Self::from_config(&MonitorConfig::default())
    }
}
