//! Clinical Alarm Evaluation
//!
//! ## Overview
//!
//! The evaluator turns one smoothed glucose value (plus the previous one and
//! the interval between them) into zero or more alerts. It is a pure function
//! of its inputs: no history, no side effects, no failure path. Delivering
//! alerts is the transmission pipeline's job; reacting to them with a faster
//! sampling rate is the scheduler's.
//!
//! ## Rules
//!
//! | Condition     | Rule                                         | Alert          |
//! |---------------|----------------------------------------------|----------------|
//! | Hypoglycemia  | value < 70 mg/dL                             | `LowGlucose`   |
//! | Hyperglycemia | value > 250 mg/dL                            | `HighGlucose`  |
//! | Rapid change  | \|Δvalue / interval_min\| > 3 mg/dL/min        | `RapidChange`  |
//! | Low battery   | battery ≤ threshold                          | `LowBattery`   |
//!
//! All comparisons against glucose thresholds are strict, so 70.0 and 250.0
//! are both normal and a rate of exactly 3.0 mg/dL/min does not fire. The
//! conditions are independent: a falling hypoglycemic reading on a flat
//! battery raises three alerts at once.
//!
//! ## Example
//!
//! ```rust
//! use glucowatch_core::{AlarmEvaluator, GlucoseLevel};
//!
//! let evaluator = AlarmEvaluator::default();
//!
//! // 100 → 115 over a 5 minute interval is exactly 3.0 mg/dL/min
//! let assessment = evaluator.evaluate(115.0, Some(100.0), 300_000, 80);
//! assert_eq!(assessment.level, GlucoseLevel::Normal);
//! assert!(assessment.alerts.is_empty());
//! ```

use heapless::Vec;

use crate::constants::clinical::{
    HYPERGLYCEMIA_THRESHOLD_MG_DL, HYPOGLYCEMIA_THRESHOLD_MG_DL,
    RAPID_CHANGE_THRESHOLD_MG_DL_PER_MIN,
};
use crate::constants::power::LOW_BATTERY_THRESHOLD_PCT;
use crate::time;

/// Upper bound on alerts from one evaluation (one per kind)
pub const MAX_ALERTS_PER_EVALUATION: usize = 4;

/// Size of an encoded alert frame
pub const ALERT_FRAME_SIZE: usize = 5;

/// Glucose classification against the level thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GlucoseLevel {
    /// Below the hypoglycemia threshold
    Low = 0,
    /// Within thresholds, inclusive
    Normal = 1,
    /// Above the hyperglycemia threshold
    High = 2,
}

/// Alert raised by the evaluator or the power policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Alert {
    /// Smoothed glucose below the hypoglycemia threshold
    LowGlucose {
        /// Smoothed value that triggered the alert
        glucose_mg_dl: f32,
    },
    /// Smoothed glucose above the hyperglycemia threshold
    HighGlucose {
        /// Smoothed value that triggered the alert
        glucose_mg_dl: f32,
    },
    /// Smoothed glucose changing faster than the rate threshold
    RapidChange {
        /// Signed rate, negative when falling
        rate_mg_dl_per_min: f32,
    },
    /// Battery at or below the low-battery threshold
    LowBattery {
        /// Battery level that triggered the alert
        battery_pct: u8,
    },
}

impl Alert {
    /// Wire code for the alert kind
    pub const fn code(&self) -> u8 {
        match self {
            Alert::LowGlucose { .. } => 0x01,
            Alert::HighGlucose { .. } => 0x02,
            Alert::RapidChange { .. } => 0x03,
            Alert::LowBattery { .. } => 0x04,
        }
    }

    /// Get human-readable name
    pub const fn name(&self) -> &'static str {
        match self {
            Alert::LowGlucose { .. } => "LOW_GLUCOSE",
            Alert::HighGlucose { .. } => "HIGH_GLUCOSE",
            Alert::RapidChange { .. } => "RAPID_CHANGE",
            Alert::LowBattery { .. } => "LOW_BATTERY",
        }
    }

    /// Value carried by the alert, in the alert's own unit
    pub fn value(&self) -> f32 {
        match *self {
            Alert::LowGlucose { glucose_mg_dl } | Alert::HighGlucose { glucose_mg_dl } => glucose_mg_dl,
            Alert::RapidChange { rate_mg_dl_per_min } => rate_mg_dl_per_min,
            Alert::LowBattery { battery_pct } => battery_pct as f32,
        }
    }

    /// Encode as `[code, value (f32 LE)]`
    pub fn to_frame(&self) -> [u8; ALERT_FRAME_SIZE] {
        let mut frame = [0u8; ALERT_FRAME_SIZE];
        frame[0] = self.code();
        frame[1..].copy_from_slice(&self.value().to_le_bytes());
        frame
    }

    /// Check if two alerts are of the same kind, ignoring values
    pub fn same_kind(&self, other: &Alert) -> bool {
        self.code() == other.code()
    }
}

/// Clinical thresholds used by the evaluator
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AlarmThresholds {
    /// Low alarm fires strictly below this (mg/dL)
    pub hypoglycemia_mg_dl: f32,
    /// High alarm fires strictly above this (mg/dL)
    pub hyperglycemia_mg_dl: f32,
    /// Rapid-change alarm fires strictly above this magnitude (mg/dL/min)
    pub rapid_change_mg_dl_per_min: f32,
    /// Low-battery alarm fires at or below this (percent)
    pub low_battery_pct: u8,
}

impl Default for AlarmThresholds {
    fn default() -> Self {
        Self {
            hypoglycemia_mg_dl: HYPOGLYCEMIA_THRESHOLD_MG_DL,
            hyperglycemia_mg_dl: HYPERGLYCEMIA_THRESHOLD_MG_DL,
            rapid_change_mg_dl_per_min: RAPID_CHANGE_THRESHOLD_MG_DL_PER_MIN,
            low_battery_pct: LOW_BATTERY_THRESHOLD_PCT,
        }
    }
}

/// Result of evaluating one smoothed reading
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    /// Level classification, drives the scheduler
    pub level: GlucoseLevel,
    /// Signed rate of change when a previous value was available
    pub rate_mg_dl_per_min: Option<f32>,
    /// Alerts raised, in rule order
    pub alerts: Vec<Alert, MAX_ALERTS_PER_EVALUATION>,
}

impl Assessment {
    /// Check if an alert of the same kind as `alert` was raised
    pub fn raised(&self, alert: &Alert) -> bool {
        self.alerts.iter().any(|a| a.same_kind(alert))
    }
}

/// Stateless alarm rules over smoothed glucose
#[derive(Debug, Clone, Default)]
pub struct AlarmEvaluator {
    thresholds: AlarmThresholds,
}

impl AlarmEvaluator {
    /// Create an evaluator with custom thresholds
    pub fn new(thresholds: AlarmThresholds) -> Self {
        Self { thresholds }
    }

    /// Thresholds in use
    pub fn thresholds(&self) -> &AlarmThresholds {
        &self.thresholds
    }

    /// Classify a smoothed value against the level thresholds
    pub fn classify(&self, glucose_mg_dl: f32) -> GlucoseLevel {
        if glucose_mg_dl < self.thresholds.hypoglycemia_mg_dl {
            GlucoseLevel::Low
        } else if glucose_mg_dl > self.thresholds.hyperglycemia_mg_dl {
            GlucoseLevel::High
        } else {
            GlucoseLevel::Normal
        }
    }

    /// Evaluate every rule against the current reading
    ///
    /// `previous` is the smoothed value from the prior measurement and
    /// `interval_ms` the cadence between the two. Without a previous value
    /// the rate rule is skipped.
    pub fn evaluate(
        &self,
        current: f32,
        previous: Option<f32>,
        interval_ms: u64,
        battery_pct: u8,
    ) -> Assessment {
        let mut alerts = Vec::new();
        let level = self.classify(current);

        match level {
            GlucoseLevel::Low => raise(&mut alerts, Alert::LowGlucose { glucose_mg_dl: current }),
            GlucoseLevel::High => raise(&mut alerts, Alert::HighGlucose { glucose_mg_dl: current }),
            GlucoseLevel::Normal => {}
        }

        let rate = previous.map(|prev| time::rate_per_minute(current - prev, interval_ms));
        if let Some(rate) = rate {
            if libm::fabsf(rate) > self.thresholds.rapid_change_mg_dl_per_min {
                raise(&mut alerts, Alert::RapidChange { rate_mg_dl_per_min: rate });
            }
        }

        if let Some(alert) = self.check_battery(battery_pct) {
            raise(&mut alerts, alert);
        }

        Assessment {
            level,
            rate_mg_dl_per_min: rate,
            alerts,
        }
    }

    /// Low-battery rule on its own
    pub fn check_battery(&self, battery_pct: u8) -> Option<Alert> {
        (battery_pct <= self.thresholds.low_battery_pct).then_some(Alert::LowBattery { battery_pct })
    }
}

fn raise(alerts: &mut Vec<Alert, MAX_ALERTS_PER_EVALUATION>, alert: Alert) {
    // Capacity holds one of each kind
    let _ = alerts.push(alert);
}
