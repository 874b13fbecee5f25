//! Scripted collaborators
//!
//! Every device appends to a shared [`Journal`] so tests can assert on call
//! order across devices (init sequence, encrypt-before-send).

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use glucowatch_core::errors::{CryptoError, PowerError, SensorError, TransportError};
use glucowatch_core::record::{RecordBytes, RECORD_WIRE_SIZE};
use glucowatch_core::time::{FixedTime, Timestamp};
use glucowatch_core::traits::{
    Cipher, GlucoseSensor, Payload, PowerControl, SensorSample, Transport,
};
use glucowatch_core::{Alert, InitError, Monitor, MonitorConfig};

/// Ordered log of collaborator calls
#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<&'static str>>>);

impl Journal {
    pub fn note(&self, entry: &'static str) {
        self.0.borrow_mut().push(entry);
    }

    pub fn entries(&self) -> Vec<&'static str> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Entries matching any of `names`, in order
    pub fn only(&self, names: &[&str]) -> Vec<&'static str> {
        self.entries()
            .into_iter()
            .filter(|entry| names.contains(entry))
            .collect()
    }
}

/// Sensor replaying a script, then repeating its last reading
pub struct ScriptedSensor {
    script: VecDeque<Result<SensorSample, SensorError>>,
    last: Result<SensorSample, SensorError>,
    pub fail_init: bool,
    pub reads: usize,
    journal: Journal,
}

impl ScriptedSensor {
    pub fn new(glucose: &[f32], journal: Journal) -> Self {
        Self {
            script: glucose
                .iter()
                .map(|&value| Ok(SensorSample::new(value, 33.5)))
                .collect(),
            last: Err(SensorError::NotReady),
            fail_init: false,
            reads: 0,
            journal,
        }
    }

    pub fn queue(&mut self, reading: Result<SensorSample, SensorError>) {
        self.script.push_back(reading);
    }

    pub fn queue_glucose(&mut self, values: &[f32]) {
        for &value in values {
            self.queue(Ok(SensorSample::new(value, 33.5)));
        }
    }
}

impl GlucoseSensor for ScriptedSensor {
    fn init(&mut self) -> Result<(), SensorError> {
        self.journal.note("sensor.init");
        if self.fail_init {
            return Err(SensorError::Fault { reason: "no bias voltage" });
        }
        Ok(())
    }

    fn read(&mut self) -> Result<SensorSample, SensorError> {
        self.reads += 1;
        self.journal.note("sensor.read");
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        self.last
    }
}

/// Transport recording every payload it accepts
pub struct RecordingTransport {
    pub connected: bool,
    pub pairing_request: bool,
    pub accept_pairing: bool,
    /// Report `WouldBlock` for every send
    pub busy: bool,
    pub fail_init: bool,
    pub payloads: Vec<Vec<u8>>,
    pub alerts: Vec<Alert>,
    journal: Journal,
}

impl RecordingTransport {
    pub fn new(journal: Journal) -> Self {
        Self {
            connected: false,
            pairing_request: false,
            accept_pairing: true,
            busy: false,
            fail_init: false,
            payloads: Vec::new(),
            alerts: Vec::new(),
            journal,
        }
    }
}

impl Transport for RecordingTransport {
    fn init(&mut self) -> Result<(), TransportError> {
        self.journal.note("transport.init");
        if self.fail_init {
            return Err(TransportError::SendFailed { reason: "radio absent" });
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn send(&mut self, payload: &[u8]) -> nb::Result<(), TransportError> {
        if self.busy {
            return Err(nb::Error::WouldBlock);
        }
        if !self.connected {
            return Err(nb::Error::Other(TransportError::Disconnected));
        }
        self.journal.note("transport.send");
        self.payloads.push(payload.to_vec());
        Ok(())
    }

    fn send_alert(&mut self, alert: &Alert) -> nb::Result<(), TransportError> {
        if self.busy {
            return Err(nb::Error::WouldBlock);
        }
        self.journal.note("transport.alert");
        self.alerts.push(*alert);
        Ok(())
    }

    fn pairing_requested(&self) -> bool {
        self.pairing_request
    }

    fn complete_pairing(&mut self) -> bool {
        self.journal.note("transport.pair");
        self.pairing_request = false;
        self.accept_pairing
    }
}

/// Single-byte XOR stand-in for the crypto module
pub struct XorCipher {
    key: u8,
    pub refuse: bool,
    pub fail_init: bool,
    pub encrypted: usize,
    journal: Journal,
}

impl XorCipher {
    pub const KEY: u8 = 0x5A;

    pub fn new(journal: Journal) -> Self {
        Self {
            key: Self::KEY,
            refuse: false,
            fail_init: false,
            encrypted: 0,
            journal,
        }
    }

    pub fn decrypt(payload: &[u8]) -> RecordBytes {
        let mut plain: RecordBytes = [0; RECORD_WIRE_SIZE];
        for (out, byte) in plain.iter_mut().zip(payload) {
            *out = byte ^ Self::KEY;
        }
        plain
    }
}

impl Cipher for XorCipher {
    fn init(&mut self) -> Result<(), CryptoError> {
        self.journal.note("crypto.init");
        if self.fail_init {
            return Err(CryptoError::NoKey);
        }
        Ok(())
    }

    fn encrypt(&mut self, plaintext: &RecordBytes) -> Result<Payload, CryptoError> {
        self.journal.note("crypto.encrypt");
        if self.refuse {
            return Err(CryptoError::Fault { reason: "engine busy" });
        }
        self.encrypted += 1;
        Ok(plaintext.iter().map(|byte| byte ^ self.key).collect())
    }
}

/// Simulated board: sleeping advances the clock
pub struct SimBoard {
    pub clock: FixedTime,
    pub battery_pct: u8,
    pub sleeps: Vec<u64>,
    pub emergency: bool,
    pub fail_init: bool,
    journal: Journal,
}

impl SimBoard {
    pub fn new(journal: Journal) -> Self {
        Self {
            clock: FixedTime::new(0),
            battery_pct: 80,
            sleeps: Vec::new(),
            emergency: false,
            fail_init: false,
            journal,
        }
    }
}

impl PowerControl for SimBoard {
    fn init(&mut self) -> Result<(), PowerError> {
        self.journal.note("power.init");
        if self.fail_init {
            return Err(PowerError::BrownOut);
        }
        Ok(())
    }

    fn now(&self) -> Timestamp {
        self.clock.now()
    }

    fn battery_level(&mut self) -> u8 {
        self.battery_pct
    }

    fn enter_sleep(&mut self, duration_ms: u64) {
        self.sleeps.push(duration_ms);
        self.clock.advance(duration_ms);
    }

    fn enter_emergency_mode(&mut self) {
        self.journal.note("power.emergency");
        self.emergency = true;
    }

    fn exit_emergency_mode(&mut self) {
        self.journal.note("power.recover");
        self.emergency = false;
    }

    fn enter_error_state(&mut self) {
        self.journal.note("power.error_state");
    }
}

pub type TestMonitor = Monitor<ScriptedSensor, RecordingTransport, XorCipher, SimBoard>;

/// The four collaborators, wired to one journal
pub struct Devices {
    pub sensor: ScriptedSensor,
    pub transport: RecordingTransport,
    pub cipher: XorCipher,
    pub board: SimBoard,
    pub journal: Journal,
}

impl Devices {
    pub fn new(glucose: &[f32]) -> Self {
        let journal = Journal::default();
        Self {
            sensor: ScriptedSensor::new(glucose, journal.clone()),
            transport: RecordingTransport::new(journal.clone()),
            cipher: XorCipher::new(journal.clone()),
            board: SimBoard::new(journal.clone()),
            journal,
        }
    }

    /// Receiver in range and asking to pair on the first cycle
    pub fn linked(glucose: &[f32]) -> Self {
        let mut devices = Self::new(glucose);
        devices.transport.connected = true;
        devices.transport.pairing_request = true;
        devices
    }

    pub fn start(self, config: MonitorConfig) -> Result<TestMonitor, InitError> {
        Monitor::start(config, self.sensor, self.transport, self.cipher, self.board)
    }
}
