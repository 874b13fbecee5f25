//! Monitor configuration
//!
//! Runtime parameters for the control loop. Capacities (ring store, smoothing
//! window, alert outbox) are compile-time constants on [`Monitor`] instead.
//!
//! Defaults come from [`constants`](crate::constants). With the `serde`
//! feature the configuration can be loaded from a provisioning blob; missing
//! fields keep their defaults.
//!
//! ```rust
//! use glucowatch_core::MonitorConfig;
//!
//! let config = MonitorConfig::default()
//!     .with_intervals(300_000, 60_000)
//!     .with_max_records_per_cycle(20);
//!
//! assert!(config.validate().is_ok());
//! ```
//!
//! [`Monitor`]: crate::monitor::Monitor

use crate::alarms::AlarmThresholds;
use crate::constants::buffers::MAX_RECORDS_PER_CYCLE;
use crate::constants::clinical::{GLUCOSE_VALID_MAX_MG_DL, GLUCOSE_VALID_MIN_MG_DL};
use crate::constants::power::{BATTERY_LOG_INTERVAL_MS, BATTERY_RECOVERY_MARGIN_PCT};
use crate::constants::time::{
    BASE_MEASUREMENT_INTERVAL_MS, FAST_MEASUREMENT_INTERVAL_MS, MIN_SLEEP_MS, MS_PER_DAY,
    SENSOR_WARMUP_MS,
};
use crate::errors::ConfigError;
use crate::transmit::TransmitPolicy;

/// Control loop configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MonitorConfig {
    /// Normal measurement interval (ms)
    pub base_interval_ms: u64,
    /// Measurement interval while hypoglycemic (ms)
    pub fast_interval_ms: u64,
    /// Delay from boot to the first reading (ms)
    pub warmup_ms: u64,
    /// Shortest sleep worth entering (ms)
    pub min_sleep_ms: u64,
    /// Lowest accepted raw glucose (mg/dL)
    pub glucose_valid_min_mg_dl: f32,
    /// Highest accepted raw glucose (mg/dL)
    pub glucose_valid_max_mg_dl: f32,
    /// Alarm thresholds
    pub thresholds: AlarmThresholds,
    /// Battery rise above the low threshold needed to leave emergency mode (percent)
    pub battery_recovery_margin_pct: u8,
    /// Records handed to the transport per cycle
    pub max_records_per_cycle: usize,
    /// Which pending records to send first
    pub transmit_policy: TransmitPolicy,
    /// Battery status log period (ms)
    pub battery_log_interval_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: BASE_MEASUREMENT_INTERVAL_MS,
            fast_interval_ms: FAST_MEASUREMENT_INTERVAL_MS,
            warmup_ms: SENSOR_WARMUP_MS,
            min_sleep_ms: MIN_SLEEP_MS,
            glucose_valid_min_mg_dl: GLUCOSE_VALID_MIN_MG_DL,
            glucose_valid_max_mg_dl: GLUCOSE_VALID_MAX_MG_DL,
            thresholds: AlarmThresholds::default(),
            battery_recovery_margin_pct: BATTERY_RECOVERY_MARGIN_PCT,
            max_records_per_cycle: MAX_RECORDS_PER_CYCLE,
            transmit_policy: TransmitPolicy::OldestUnsent,
            battery_log_interval_ms: BATTERY_LOG_INTERVAL_MS,
        }
    }
}

impl MonitorConfig {
    /// Set base and fast measurement intervals
    pub fn with_intervals(mut self, base_ms: u64, fast_ms: u64) -> Self {
        self.base_interval_ms = base_ms;
        self.fast_interval_ms = fast_ms;
        self
    }

    /// Set the sensor warm-up delay
    pub fn with_warmup(mut self, warmup_ms: u64) -> Self {
        self.warmup_ms = warmup_ms;
        self
    }

    /// Set alarm thresholds
    pub fn with_thresholds(mut self, thresholds: AlarmThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the per-cycle transmission bound
    pub fn with_max_records_per_cycle(mut self, max: usize) -> Self {
        self.max_records_per_cycle = max;
        self
    }

    /// Set the transmission policy
    pub fn with_transmit_policy(mut self, policy: TransmitPolicy) -> Self {
        self.transmit_policy = policy;
        self
    }

    /// Glucose validity range as `(min, max)`
    pub fn glucose_range(&self) -> (f32, f32) {
        (self.glucose_valid_min_mg_dl, self.glucose_valid_max_mg_dl)
    }

    /// Check the configuration is internally consistent
    ///
    /// Float bounds are compared with negated `<` so NaN fails too.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("base_interval_ms", self.base_interval_ms),
            ("fast_interval_ms", self.fast_interval_ms),
            ("battery_log_interval_ms", self.battery_log_interval_ms),
            ("max_records_per_cycle", self.max_records_per_cycle as u64),
        ] {
            if value == 0 {
                return Err(ConfigError::Zero { field });
            }
        }

        if self.fast_interval_ms >= self.base_interval_ms {
            return Err(ConfigError::FastIntervalNotShorter {
                base_ms: self.base_interval_ms,
                fast_ms: self.fast_interval_ms,
            });
        }

        if !(self.glucose_valid_min_mg_dl < self.glucose_valid_max_mg_dl) {
            return Err(ConfigError::InvalidRange {
                field: "glucose_valid",
                low: self.glucose_valid_min_mg_dl,
                high: self.glucose_valid_max_mg_dl,
            });
        }

        let thresholds = &self.thresholds;
        if !(thresholds.hypoglycemia_mg_dl < thresholds.hyperglycemia_mg_dl) {
            return Err(ConfigError::InvalidRange {
                field: "thresholds",
                low: thresholds.hypoglycemia_mg_dl,
                high: thresholds.hyperglycemia_mg_dl,
            });
        }

        if !(thresholds.rapid_change_mg_dl_per_min > 0.0) {
            return Err(ConfigError::InvalidRange {
                field: "rapid_change_mg_dl_per_min",
                low: 0.0,
                high: thresholds.rapid_change_mg_dl_per_min,
            });
        }

        if thresholds.low_battery_pct > 100 {
            return Err(ConfigError::BatteryThreshold {
                percent: thresholds.low_battery_pct,
            });
        }

        if let TransmitPolicy::RecentWindow { window: 0 } = self.transmit_policy {
            return Err(ConfigError::Zero { field: "transmit_policy.window" });
        }

        Ok(())
    }

    /// Check a ring store of `capacity` records spans at least one day at
    /// the base interval
    pub fn check_capacity(&self, capacity: usize) -> Result<(), ConfigError> {
        let covered_ms = (capacity as u64).saturating_mul(self.base_interval_ms);
        if covered_ms < MS_PER_DAY {
            return Err(ConfigError::StoreTooSmall { capacity, covered_ms });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = MonitorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.base_interval_ms, 60_000);
        assert_eq!(config.fast_interval_ms, 30_000);
        assert_eq!(config.transmit_policy, TransmitPolicy::OldestUnsent);
    }

    #[test]
    fn fast_interval_must_be_shorter() {
        let config = MonitorConfig::default().with_intervals(60_000, 60_000);
        assert_eq!(
            config.validate(),
            Err(ConfigError::FastIntervalNotShorter { base_ms: 60_000, fast_ms: 60_000 })
        );
    }

    #[test]
    fn zero_fields_rejected() {
        let config = MonitorConfig::default().with_max_records_per_cycle(0);
        assert_eq!(config.validate(), Err(ConfigError::Zero { field: "max_records_per_cycle" }));

        let config = MonitorConfig::default()
            .with_transmit_policy(TransmitPolicy::RecentWindow { window: 0 });
        assert!(config.validate().is_err());
    }

    #[test]
    fn inverted_thresholds_rejected() {
        let config = MonitorConfig::default().with_thresholds(AlarmThresholds {
            hypoglycemia_mg_dl: 260.0,
            ..AlarmThresholds::default()
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange { field: "thresholds", .. })
        ));
    }

    #[test]
    fn battery_threshold_over_100_rejected() {
        let config = MonitorConfig::default().with_thresholds(AlarmThresholds {
            low_battery_pct: 120,
            ..AlarmThresholds::default()
        });
        assert_eq!(config.validate(), Err(ConfigError::BatteryThreshold { percent: 120 }));
    }

    #[test]
    fn store_must_span_a_day() {
        use crate::constants::buffers::RING_STORE_CAPACITY;

        let config = MonitorConfig::default();
        assert!(config.check_capacity(RING_STORE_CAPACITY).is_ok());
        assert_eq!(
            config.check_capacity(RING_STORE_CAPACITY - 1),
            Err(ConfigError::StoreTooSmall {
                capacity: RING_STORE_CAPACITY - 1,
                covered_ms: MS_PER_DAY - 60_000,
            })
        );

        let faster = config.with_intervals(30_000, 10_000);
        assert!(faster.check_capacity(RING_STORE_CAPACITY).is_err());
        assert!(faster.check_capacity(2 * RING_STORE_CAPACITY).is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{
            "base_interval_ms": 300000,
            "thresholds": { "low_battery_pct": 20 },
            "transmit_policy": { "RecentWindow": { "window": 10 } }
        }"#;

        let config: MonitorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.base_interval_ms, 300_000);
        assert_eq!(config.fast_interval_ms, 30_000);
        assert_eq!(config.thresholds.low_battery_pct, 20);
        assert_eq!(config.thresholds.hypoglycemia_mg_dl, 70.0);
        assert_eq!(config.transmit_policy, TransmitPolicy::RecentWindow { window: 10 });
        assert!(config.validate().is_ok());
    }
}
