//! Simulated Monitoring Session
//!
//! Runs the monitor core for a simulated two hours against in-memory devices:
//! a sensor replaying a hypoglycemic dip, a radio that drops out for a while,
//! and a board whose clock advances when the core sleeps.
//!
//! ## What You'll Learn
//!
//! - Implementing the four collaborator traits
//! - Starting the monitor and running its cycle
//! - Reading the cycle report: measurements, alerts, transmission, sleep
//! - How the interval tightens during hypoglycemia
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_simulated_session
//! ```

use glucowatch_core::errors::{CryptoError, SensorError, TransportError};
use glucowatch_core::record::RecordBytes;
use glucowatch_core::time::{ms_to_minutes, Timestamp};
use glucowatch_core::traits::{
    Cipher, GlucoseSensor, Payload, PowerControl, SensorSample, Transport,
};
use glucowatch_core::{Alert, MeasurementOutcome, Monitor, MonitorConfig, SleepDecision};

/// Sensor following a scripted glucose curve over time
struct CurveSensor<'a> {
    clock: &'a core::cell::Cell<Timestamp>,
}

impl GlucoseSensor for CurveSensor<'_> {
    fn read(&mut self) -> Result<SensorSample, SensorError> {
        let minutes = ms_to_minutes(self.clock.get());
        // Falls from 120 to ~55 over 40 minutes, recovers by minute 80
        let glucose = match minutes {
            m if m < 40.0 => 120.0 - m * 1.6,
            m if m < 60.0 => 56.0,
            m if m < 80.0 => 56.0 + (m - 60.0) * 3.0,
            _ => 116.0,
        };
        Ok(SensorSample::new(glucose, 33.0))
    }
}

/// Radio that is out of range between minutes 20 and 50
struct FlakyRadio<'a> {
    clock: &'a core::cell::Cell<Timestamp>,
    paired: bool,
    frames: usize,
}

impl FlakyRadio<'_> {
    fn in_range(&self) -> bool {
        let minutes = self.clock.get() / 60_000;
        !(20..50).contains(&minutes)
    }
}

impl Transport for FlakyRadio<'_> {
    fn is_connected(&self) -> bool {
        self.in_range()
    }

    fn send(&mut self, _payload: &[u8]) -> nb::Result<(), TransportError> {
        self.frames += 1;
        Ok(())
    }

    fn send_alert(&mut self, alert: &Alert) -> nb::Result<(), TransportError> {
        println!("    >> receiver notified: {} ({:.1})", alert.name(), alert.value());
        Ok(())
    }

    fn pairing_requested(&self) -> bool {
        !self.paired
    }

    fn complete_pairing(&mut self) -> bool {
        self.paired = true;
        true
    }
}

/// Toy cipher; a real board uses its AES-CCM engine
struct XorCipher;

impl Cipher for XorCipher {
    fn encrypt(&mut self, plaintext: &RecordBytes) -> Result<Payload, CryptoError> {
        Ok(plaintext.iter().map(|byte| byte ^ 0xA5).collect())
    }
}

/// Board whose clock advances while sleeping
struct SimBoard<'a> {
    clock: &'a core::cell::Cell<Timestamp>,
    battery_pct: u8,
}

impl PowerControl for SimBoard<'_> {
    fn now(&self) -> Timestamp {
        self.clock.get()
    }

    fn battery_level(&mut self) -> u8 {
        self.battery_pct
    }

    fn enter_sleep(&mut self, duration_ms: u64) {
        self.clock.set(self.clock.get() + duration_ms);
    }

    fn enter_emergency_mode(&mut self) {
        println!("    !! emergency power mode");
    }

    fn enter_error_state(&mut self) {
        println!("    !! hardware error state");
    }
}

fn main() {
    println!("GlucoWatch Simulated Session");
    println!("============================\n");

    let clock = core::cell::Cell::new(0);
    let config = MonitorConfig::default();
    println!("Configuration:");
    println!("  Base interval: {} s", config.base_interval_ms / 1000);
    println!("  Fast interval: {} s", config.fast_interval_ms / 1000);
    println!(
        "  Low / high thresholds: {} / {} mg/dL\n",
        config.thresholds.hypoglycemia_mg_dl, config.thresholds.hyperglycemia_mg_dl
    );

    let start = Monitor::start(
        config,
        CurveSensor { clock: &clock },
        FlakyRadio { clock: &clock, paired: false, frames: 0 },
        XorCipher,
        SimBoard { clock: &clock, battery_pct: 70 },
    );
    let mut monitor = match start {
        Ok(monitor) => monitor,
        Err(err) => {
            println!("Start-up failed: {}", err);
            return;
        }
    };

    let mut fast_minutes = 0.0;
    while clock.get() < 2 * 60 * 60_000 {
        let report = monitor.run_cycle();

        if let Some(MeasurementOutcome::Stored { smoothed_mg_dl, assessment, .. }) =
            &report.measurement
        {
            let minutes = monitor.store().latest().map_or(0, |r| r.timestamp()) / 60_000;
            println!(
                "t={:3} min  smoothed {:5.1} mg/dL  {:?}  pending {:2}  sent {:2}",
                minutes,
                smoothed_mg_dl,
                assessment.level,
                monitor.store().pending_count(),
                report.transmit.sent
            );
            for alert in &assessment.alerts {
                println!("    ALERT {} ({:.1})", alert.name(), alert.value());
            }
        }

        if let SleepDecision::Sleep { duration_ms } = report.sleep {
            if duration_ms <= monitor.config().fast_interval_ms {
                fast_minutes += ms_to_minutes(duration_ms);
            }
        }
    }

    println!("\nSession summary:");
    println!("  Records stored: {}", monitor.store().len());
    println!("  Records transmitted: {}", monitor.transport().frames);
    println!("  Still pending: {}", monitor.store().pending_count());
    println!("  Minutes at fast sampling: {:.0}", fast_minutes);
    println!("  Verified for export: {}", monitor.export().count());
}
