//! Control Loop
//!
//! [`Monitor`] owns every piece of core state and the four collaborators,
//! and runs one cooperative cycle per wake-up.
//!
//! ## Cycle
//!
//! ```text
//!  wake
//!   │
//!   ├─ 1. measure        (if due)  sensor → validate → store → smooth → evaluate
//!   │                               └─ scheduler adapts interval, alerts queued
//!   ├─ 2. transmit       (if paired and connected)  alerts, then records
//!   ├─ 3. power check    battery → emergency / recovery
//!   ├─ 4. pairing check
//!   └─ 5. sleep          budget recomputed from the clock
//! ```
//!
//! A reading stored in step 1 is visible to the evaluator and the pipeline
//! in the same cycle. Nothing in the cycle blocks: sensor errors skip the
//! measurement, transport backpressure defers the drain, and the only
//! suspension is the sleep at the end.
//!
//! ## Start-up
//!
//! [`Monitor::start`] validates the configuration, checks the ring store
//! holds a day of readings at the base interval, and brings collaborators up
//! in order: power, sensor, transport, crypto. The first failure puts the
//! hardware in its error state and returns [`InitError`]; no monitor exists
//! to run.

use crate::alarms::{AlarmEvaluator, Alert, Assessment};
use crate::buffer::{RingStore, SlotId};
use crate::config::MonitorConfig;
use crate::constants::buffers::{RING_STORE_CAPACITY, SMOOTHING_WINDOW};
use crate::errors::{InitError, SensorError, Subsystem, ValidationError, ValidationResult};
use crate::filter::SmoothingFilter;
use crate::power::{PowerCheck, PowerMode, PowerPolicy};
use crate::record::MeasurementRecord;
use crate::scheduler::{Scheduler, SleepDecision};
use crate::state::AppState;
use crate::time::Timestamp;
use crate::traits::{Cipher, GlucoseSensor, PowerControl, SensorSample, Transport};
use crate::transmit::{AlertOutbox, TransmissionPipeline, TransmitReport};

/// What happened to this cycle's measurement
#[derive(Debug, Clone, PartialEq)]
pub enum MeasurementOutcome {
    /// Reading stored and evaluated
    Stored {
        /// Slot of the stored record
        slot: SlotId,
        /// Smoothed glucose (mg/dL)
        smoothed_mg_dl: f32,
        /// Classification and alerts
        assessment: Assessment,
    },
    /// Sensor produced no reading
    SensorFailed(SensorError),
    /// Reading failed validation and was discarded
    Rejected(ValidationError),
}

impl MeasurementOutcome {
    /// Check if the reading was stored
    pub fn is_stored(&self) -> bool {
        matches!(self, MeasurementOutcome::Stored { .. })
    }
}

/// Summary of one control loop cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Measurement outcome, `None` if no reading was due
    pub measurement: Option<MeasurementOutcome>,
    /// Transmission results, idle when the link was down
    pub transmit: TransmitReport,
    /// Battery check result
    pub power: PowerCheck,
    /// Pairing completed this cycle
    pub paired: bool,
    /// Sleep taken at the end of the cycle
    pub sleep: SleepDecision,
}

impl CycleReport {
    /// Alerts raised by this cycle's measurement and power check
    ///
    /// A battery alert raised by both appears once.
    pub fn alerts(&self) -> impl Iterator<Item = &Alert> + '_ {
        let measured: &[Alert] = match &self.measurement {
            Some(MeasurementOutcome::Stored { assessment, .. }) => assessment.alerts.as_slice(),
            _ => &[],
        };
        let power = self
            .power
            .alert
            .iter()
            .filter(move |alert| !measured.iter().any(|raised| raised.same_kind(alert)));
        measured.iter().chain(power)
    }
}

/// Glucose monitor core
///
/// `N` is the ring store capacity and `W` the smoothing window.
pub struct Monitor<
    S,
    T,
    C,
    P,
    const N: usize = RING_STORE_CAPACITY,
    const W: usize = SMOOTHING_WINDOW,
> {
    config: MonitorConfig,
    sensor: S,
    transport: T,
    cipher: C,
    power: P,
    store: RingStore<N>,
    filter: SmoothingFilter<W>,
    evaluator: AlarmEvaluator,
    scheduler: Scheduler,
    pipeline: TransmissionPipeline,
    power_policy: PowerPolicy,
    outbox: AlertOutbox,
    state: AppState,
}

impl<S, T, C, P> Monitor<S, T, C, P>
where
    S: GlucoseSensor,
    T: Transport,
    C: Cipher,
    P: PowerControl,
{
    /// Validate configuration, initialise collaborators and build the monitor
    /// with the default capacities
    pub fn start(
        config: MonitorConfig,
        sensor: S,
        transport: T,
        cipher: C,
        power: P,
    ) -> Result<Self, InitError> {
        Self::start_with_capacity(config, sensor, transport, cipher, power)
    }
}

impl<S, T, C, P, const N: usize, const W: usize> Monitor<S, T, C, P, N, W>
where
    S: GlucoseSensor,
    T: Transport,
    C: Cipher,
    P: PowerControl,
{
    /// Like [`start`](Monitor::start), with explicit store and window sizes
    pub fn start_with_capacity(
        config: MonitorConfig,
        mut sensor: S,
        mut transport: T,
        mut cipher: C,
        mut power: P,
    ) -> Result<Self, InitError> {
        let init = Self::init_collaborators(
            &config,
            &mut sensor,
            &mut transport,
            &mut cipher,
            &mut power,
        );
        if let Err(err) = init {
            log_error!("start-up failed: {}", err);
            power.enter_error_state();
            return Err(err);
        }

        let boot = power.now();
        log_info!(
            "monitor started at {} ms, first reading in {} ms",
            boot,
            config.warmup_ms
        );

        Ok(Self {
            store: RingStore::new(),
            filter: SmoothingFilter::new(),
            evaluator: AlarmEvaluator::new(config.thresholds),
            scheduler: Scheduler::from_config(&config, boot),
            pipeline: TransmissionPipeline::from_config(&config),
            power_policy: PowerPolicy::from_config(&config),
            outbox: AlertOutbox::new(),
            state: AppState::default(),
            config,
            sensor,
            transport,
            cipher,
            power,
        })
    }

    fn init_collaborators(
        config: &MonitorConfig,
        sensor: &mut S,
        transport: &mut T,
        cipher: &mut C,
        power: &mut P,
    ) -> Result<(), InitError> {
        config.validate().map_err(|err| {
            log_error!("invalid configuration: {}", err);
            InitError::new(Subsystem::Config, "invalid configuration")
        })?;

        config.check_capacity(N).map_err(|err| {
            log_error!("store too small: {}", err);
            InitError::new(Subsystem::Config, "ring store holds less than a day")
        })?;

        power.init().map_err(|err| {
            log_error!("power init: {}", err);
            InitError::new(Subsystem::Power, "power hardware did not start")
        })?;

        sensor.init().map_err(|err| {
            log_error!("sensor init: {}", err);
            InitError::new(Subsystem::Sensor, "sensor did not start")
        })?;

        transport.init().map_err(|err| {
            log_error!("transport init: {}", err);
            InitError::new(Subsystem::Transport, "transport did not start")
        })?;

        cipher.init().map_err(|err| {
            log_error!("crypto init: {}", err);
            InitError::new(Subsystem::Crypto, "crypto module did not start")
        })?;

        Ok(())
    }

    /// Run one control loop cycle, ending in sleep
    pub fn run_cycle(&mut self) -> CycleReport {
        self.state.cycles += 1;
        let now = self.power.now();

        if let Some(last) = self.scheduler.last_measurement().filter(|&last| now < last) {
            // Readings stay rejected until the clock passes the latest record
            log_error!("clock went back from {} ms to {} ms", last, now);
            self.state.clock_resets = self.state.clock_resets.saturating_add(1);
        }

        let measurement = if self.scheduler.is_due(now) {
            Some(self.measure(now))
        } else {
            None
        };

        let transmit = self.transmit();

        let power = self.power_policy.check(&mut self.power, now);
        if let Some(alert) = power.alert {
            self.outbox.push(alert);
        }

        let paired = self.check_pairing();

        let sleep = self.scheduler.sleep_budget(self.power.now());
        if let SleepDecision::Sleep { duration_ms } = sleep {
            log_debug!("sleeping {} ms", duration_ms);
            self.power.enter_sleep(duration_ms);
        }

        CycleReport {
            measurement,
            transmit,
            power,
            paired,
            sleep,
        }
    }

    fn measure(&mut self, now: Timestamp) -> MeasurementOutcome {
        // Every attempt counts, so a failing sensor is retried at the normal cadence
        self.scheduler.record_measurement(now);
        let battery_pct = self.power.battery_level();
        self.state.last_battery_pct = Some(battery_pct);

        let sample = match self.sensor.read() {
            Ok(sample) => sample,
            Err(err) => {
                log_warn!("sensor read failed: {}", err);
                self.state.sensor_failures = self.state.sensor_failures.saturating_add(1);
                return MeasurementOutcome::SensorFailed(err);
            }
        };

        let record = match self.build_record(now, sample, battery_pct) {
            Ok(record) => record,
            Err(err) => {
                log_warn!("reading rejected: {}", err);
                self.state.rejected_readings = self.state.rejected_readings.saturating_add(1);
                return MeasurementOutcome::Rejected(err);
            }
        };

        let slot = self.store.append(record);
        let smoothed_mg_dl = self.filter.update(record.glucose_mg_dl());

        // Rate uses the interval in force when this reading was scheduled
        let assessment = self.evaluator.evaluate(
            smoothed_mg_dl,
            self.state.last_smoothed_mg_dl,
            self.scheduler.current_interval_ms(),
            battery_pct,
        );
        self.state.last_smoothed_mg_dl = Some(smoothed_mg_dl);

        if self.scheduler.apply(assessment.level) {
            log_info!(
                "measurement interval now {} ms",
                self.scheduler.current_interval_ms()
            );
        }

        for alert in &assessment.alerts {
            log_warn!("{} alert: {}", alert.name(), alert.value());
            self.outbox.push(*alert);
        }

        log_debug!(
            "reading #{}: raw {} mg/dL, smoothed {} mg/dL",
            slot.sequence(),
            record.glucose_mg_dl(),
            smoothed_mg_dl
        );

        MeasurementOutcome::Stored {
            slot,
            smoothed_mg_dl,
            assessment,
        }
    }

    fn build_record(
        &self,
        now: Timestamp,
        sample: SensorSample,
        battery_pct: u8,
    ) -> ValidationResult<MeasurementRecord> {
        if let Some(latest) = self.store.latest() {
            if now < latest.timestamp() {
                return Err(ValidationError::TimestampRegression {
                    previous: latest.timestamp(),
                    current: now,
                });
            }
        }

        MeasurementRecord::with_range(
            now,
            sample.glucose_mg_dl,
            sample.temperature_c,
            battery_pct,
            self.config.glucose_range(),
        )
    }

    fn transmit(&mut self) -> TransmitReport {
        let connected = self.transport.is_connected();
        if connected != self.state.connected {
            log_info!("transport {}", if connected { "connected" } else { "disconnected" });
            self.state.connected = connected;
        }

        if !self.state.link_ready() {
            return TransmitReport::default();
        }

        let alerts_sent = self.pipeline.deliver_alerts(&mut self.outbox, &mut self.transport);
        let report = self
            .pipeline
            .drain(&mut self.store, &mut self.cipher, &mut self.transport);

        TransmitReport {
            alerts_sent,
            ..report
        }
    }

    fn check_pairing(&mut self) -> bool {
        if !self.transport.pairing_requested() {
            return false;
        }

        let paired = self.transport.complete_pairing();
        if paired {
            log_info!("pairing complete");
        } else {
            log_warn!("pairing failed");
        }
        self.state.paired = paired;
        paired
    }

    /// Ring store, read-only
    pub fn store(&self) -> &RingStore<N> {
        &self.store
    }

    /// Stored records passing their integrity check, oldest first
    ///
    /// Independent of delivery state.
    pub fn export(&self) -> impl Iterator<Item = &MeasurementRecord> + '_ {
        self.store.verified()
    }

    /// Session state
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Measurement scheduler
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Power mode in force
    pub fn power_mode(&self) -> PowerMode {
        self.power_policy.mode()
    }

    /// Alerts waiting for the link
    pub fn pending_alerts(&self) -> &AlertOutbox {
        &self.outbox
    }

    /// Active configuration
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Sensor driver
    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// Transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Transport, mutable
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Cipher
    pub fn cipher(&self) -> &C {
        &self.cipher
    }

    /// Cipher, mutable
    pub fn cipher_mut(&mut self) -> &mut C {
        &mut self.cipher
    }

    /// Power and clock hardware
    pub fn power(&self) -> &P {
        &self.power
    }

    /// Power and clock hardware, mutable
    pub fn power_mut(&mut self) -> &mut P {
        &mut self.power
    }
}
