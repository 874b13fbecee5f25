//! Measurement Scheduler
//!
//! Decides when the next reading is due and how long the device may sleep
//! until then.
//!
//! ## Interval State Machine
//!
//! ```text
//!              Low reading
//!   ┌──────┐ ─────────────→ ┌──────┐
//!   │ Base │                │ Fast │
//!   └──────┘ ←───────────── └──────┘
//!             Normal reading
//! ```
//!
//! High readings and rapid-change alerts leave the interval alone. Only a
//! reading back in the normal range returns a fast-sampling device to the
//! base cadence.
//!
//! ## Sleep Budget
//!
//! The budget is always recomputed from the due time and the current clock,
//! never counted down. A budget shorter than the minimum actionable sleep
//! means "wake again immediately": entering stop mode for a few hundred
//! milliseconds risks waking after the reading was due.

use crate::alarms::GlucoseLevel;
use crate::config::MonitorConfig;
use crate::time::{elapsed_ms, Timestamp};

/// Which measurement interval is in force
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalMode {
    /// Configured base interval
    Base,
    /// Shortened interval while hypoglycemic
    Fast,
}

/// What the control loop should do at the end of a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepDecision {
    /// Enter low-power sleep for this long
    Sleep {
        /// Sleep duration in milliseconds
        duration_ms: u64,
    },
    /// Next reading is due too soon to be worth sleeping
    WakeImmediately,
}

/// Measurement timing and the adaptive interval
#[derive(Debug, Clone)]
pub struct Scheduler {
    base_interval_ms: u64,
    fast_interval_ms: u64,
    min_sleep_ms: u64,
    mode: IntervalMode,
    /// Time of the last measurement attempt
    last_measurement: Option<Timestamp>,
    /// Due time of the first reading (boot plus sensor warm-up)
    first_due: Timestamp,
}

impl Scheduler {
    /// Create a scheduler starting at `boot`
    ///
    /// The first reading is due once `warmup_ms` has elapsed.
    pub fn new(
        base_interval_ms: u64,
        fast_interval_ms: u64,
        warmup_ms: u64,
        min_sleep_ms: u64,
        boot: Timestamp,
    ) -> Self {
        Self {
            base_interval_ms,
            fast_interval_ms,
            min_sleep_ms,
            mode: IntervalMode::Base,
            last_measurement: None,
            first_due: boot.saturating_add(warmup_ms),
        }
    }

    /// Create a scheduler from monitor configuration
    pub fn from_config(config: &MonitorConfig, boot: Timestamp) -> Self {
        Self::new(
            config.base_interval_ms,
            config.fast_interval_ms,
            config.warmup_ms,
            config.min_sleep_ms,
            boot,
        )
    }

    /// Interval mode in force
    pub fn mode(&self) -> IntervalMode {
        self.mode
    }

    /// Interval in force, in milliseconds
    pub fn current_interval_ms(&self) -> u64 {
        match self.mode {
            IntervalMode::Base => self.base_interval_ms,
            IntervalMode::Fast => self.fast_interval_ms,
        }
    }

    /// Time of the last measurement attempt
    pub fn last_measurement(&self) -> Option<Timestamp> {
        self.last_measurement
    }

    /// When the next reading is due
    pub fn next_due(&self) -> Timestamp {
        match self.last_measurement {
            Some(last) => last.saturating_add(self.current_interval_ms()),
            None => self.first_due,
        }
    }

    /// Check if a reading is due at `now`
    ///
    /// A clock that reads earlier than the last attempt has been reset;
    /// the reading is due at once rather than after the clock catches up.
    pub fn is_due(&self, now: Timestamp) -> bool {
        let clock_reset = matches!(self.last_measurement, Some(last) if now < last);
        clock_reset || now >= self.next_due()
    }

    /// Record a measurement attempt at `now`
    ///
    /// Called for every attempt, successful or not, so a failing sensor is
    /// retried at the normal cadence.
    pub fn record_measurement(&mut self, now: Timestamp) {
        self.last_measurement = Some(now);
    }

    /// Adapt the interval to the latest classification
    ///
    /// Returns `true` if the interval changed.
    pub fn apply(&mut self, level: GlucoseLevel) -> bool {
        let next = match level {
            GlucoseLevel::Low => IntervalMode::Fast,
            GlucoseLevel::Normal => IntervalMode::Base,
            GlucoseLevel::High => self.mode,
        };

        let changed = next != self.mode;
        self.mode = next;
        changed
    }

    /// Milliseconds until the next reading is due, zero if overdue
    pub fn budget_ms(&self, now: Timestamp) -> u64 {
        if self.is_due(now) {
            0
        } else {
            elapsed_ms(now, self.next_due())
        }
    }

    /// How long the device may sleep from `now`
    pub fn sleep_budget(&self, now: Timestamp) -> SleepDecision {
        let budget = self.budget_ms(now);
        if budget < self.min_sleep_ms {
            SleepDecision::WakeImmediately
        } else {
            SleepDecision::Sleep { duration_ms: budget }
        }
    }
}
