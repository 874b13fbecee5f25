//! Transmission Pipeline
//!
//! Moves undelivered records from the ring store to the transport, and queued
//! alerts from the alert outbox.
//!
//! ## Record Flow
//!
//! ```text
//!  RingStore (Pending)
//!        │  candidate = pending.nth(skipped)
//!        ▼
//!   verify ──fail──→ quarantine, next
//!        │
//!        ▼
//!   encrypt ──fail──→ stays Pending, skipped += 1
//!        │
//!        ▼
//!    send ──WouldBlock──→ stop, retry next cycle
//!        │  └─Err──→ stays Pending, skipped += 1
//!        ▼
//!   mark_sent
//! ```
//!
//! A record only becomes `Sent` after the transport accepted it, and the
//! transport only ever sees encrypted bytes. At most `max_records_per_cycle`
//! records are attempted per drain so a large backlog cannot starve the
//! measurement cadence.
//!
//! Failed records remain pending, which keeps them ahead of untried records
//! in the pending order. The drain therefore addresses its next candidate as
//! the `skipped`-th pending record instead of collecting ids up front.
//!
//! ## Alerts
//!
//! Alerts are more urgent than history and go out first. They wait in an
//! [`AlertOutbox`] while the link is down. A queued alert of the same kind is
//! replaced by the newer one, so a long disconnection cannot crowd a glucose
//! alarm out behind repeated battery warnings.

use heapless::Deque;

use crate::alarms::Alert;
use crate::buffer::{RingStore, SlotId};
use crate::config::MonitorConfig;
use crate::constants::buffers::ALERT_OUTBOX_CAPACITY;
use crate::errors::TransportError;
use crate::record::MeasurementRecord;
use crate::traits::{Cipher, Transport};

/// Which undelivered records a drain offers first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransmitPolicy {
    /// Whole backlog, oldest first. Nothing is skipped while it is stored.
    #[default]
    OldestUnsent,
    /// Only undelivered records among the last `window`, newest first
    RecentWindow {
        /// How many of the most recent records to consider
        window: usize,
    },
}

/// Outcome of one drain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransmitReport {
    /// Records taken from the store this drain
    pub attempted: usize,
    /// Records accepted by the transport and marked sent
    pub sent: usize,
    /// Records the cipher refused
    pub encrypt_failures: usize,
    /// Records the transport refused
    pub send_failures: usize,
    /// Records that failed read-back verification and were quarantined
    pub quarantined: usize,
    /// Drain stopped because the transport was busy
    pub backpressured: bool,
    /// Alerts delivered from the outbox
    pub alerts_sent: usize,
}

impl TransmitReport {
    /// Check if nothing was attempted
    pub fn is_idle(&self) -> bool {
        self.attempted == 0 && self.alerts_sent == 0
    }
}

/// Bounded queue of alerts awaiting delivery
#[derive(Debug, Clone)]
pub struct AlertOutbox<const A: usize = ALERT_OUTBOX_CAPACITY> {
    queue: Deque<Alert, A>,
    dropped: u32,
}

impl<const A: usize> AlertOutbox<A> {
    /// Create an empty outbox
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
            dropped: 0,
        }
    }

    /// Queue an alert
    ///
    /// Replaces a queued alert of the same kind in place. If the outbox is
    /// full the oldest alert is dropped and counted.
    pub fn push(&mut self, alert: Alert) {
        if let Some(queued) = self.queue.iter_mut().find(|queued| queued.same_kind(&alert)) {
            *queued = alert;
            return;
        }

        if self.queue.is_full() {
            if let Some(evicted) = self.queue.pop_front() {
                log_warn!("alert outbox full, dropping {}", evicted.name());
            }
            self.dropped = self.dropped.saturating_add(1);
        }

        // Cannot fail: a slot was freed above if needed
        let _ = self.queue.push_back(alert);
    }

    /// Oldest queued alert
    pub fn peek(&self) -> Option<&Alert> {
        self.queue.front()
    }

    /// Queued alerts, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Alert> + '_ {
        self.queue.iter()
    }

    /// Number of queued alerts
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Alerts lost to overflow since boot
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    fn pop(&mut self) -> Option<Alert> {
        self.queue.pop_front()
    }
}

impl<const A: usize> Default for AlertOutbox<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Drains the ring store and alert outbox to the transport
#[derive(Debug, Clone, Copy)]
pub struct TransmissionPipeline {
    max_records_per_cycle: usize,
    policy: TransmitPolicy,
}

impl TransmissionPipeline {
    /// Create a pipeline
    pub fn new(max_records_per_cycle: usize, policy: TransmitPolicy) -> Self {
        Self {
            max_records_per_cycle,
            policy,
        }
    }

    /// Create a pipeline from monitor configuration
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(config.max_records_per_cycle, config.transmit_policy)
    }

    /// Selection policy
    pub fn policy(&self) -> TransmitPolicy {
        self.policy
    }

    /// Encrypt and send up to `max_records_per_cycle` undelivered records
    ///
    /// Does nothing while the transport is disconnected. Records stay
    /// `Pending` on any failure and are offered again next drain.
    pub fn drain<const N: usize, C, T>(
        &self,
        store: &mut RingStore<N>,
        cipher: &mut C,
        transport: &mut T,
    ) -> TransmitReport
    where
        C: Cipher,
        T: Transport,
    {
        let mut report = TransmitReport::default();
        if !transport.is_connected() {
            return report;
        }

        let mut skipped = 0;
        while report.attempted < self.max_records_per_cycle {
            let Some((id, record)) = self.candidate(store, skipped) else {
                break;
            };
            report.attempted += 1;

            if let Err(err) = record.verify() {
                log_error!("record #{} failed integrity check: {}", id.sequence(), err);
                store.quarantine(id);
                report.quarantined += 1;
                continue;
            }

            let payload = match cipher.encrypt(&record.to_bytes()) {
                Ok(payload) => payload,
                Err(err) => {
                    log_warn!("record #{} not encrypted: {}", id.sequence(), err);
                    report.encrypt_failures += 1;
                    skipped += 1;
                    continue;
                }
            };

            match transport.send(&payload) {
                Ok(()) => {
                    store.mark_sent(id);
                    report.sent += 1;
                }
                Err(nb::Error::WouldBlock) => {
                    // Not a failure: the record was never handed over
                    report.attempted -= 1;
                    report.backpressured = true;
                    break;
                }
                Err(nb::Error::Other(err)) => {
                    log_warn!("record #{} not sent: {}", id.sequence(), err);
                    report.send_failures += 1;
                    skipped += 1;
                    if err == TransportError::Disconnected {
                        break;
                    }
                }
            }
        }

        if report.attempted > 0 {
            log_debug!(
                "drain: {} sent, {} failed, {} quarantined",
                report.sent,
                report.encrypt_failures + report.send_failures,
                report.quarantined
            );
        }

        report
    }

    /// Deliver queued alerts, oldest first
    ///
    /// Stops at the first alert the transport does not accept; that alert
    /// stays queued. Returns the number delivered.
    pub fn deliver_alerts<const A: usize, T: Transport>(
        &self,
        outbox: &mut AlertOutbox<A>,
        transport: &mut T,
    ) -> usize {
        if !transport.is_connected() {
            return 0;
        }

        let mut delivered = 0;
        while let Some(alert) = outbox.peek().copied() {
            match transport.send_alert(&alert) {
                Ok(()) => {
                    outbox.pop();
                    delivered += 1;
                }
                Err(nb::Error::WouldBlock) => break,
                Err(nb::Error::Other(err)) => {
                    log_warn!("{} alert not delivered: {}", alert.name(), err);
                    break;
                }
            }
        }

        delivered
    }

    fn candidate<const N: usize>(
        &self,
        store: &RingStore<N>,
        skipped: usize,
    ) -> Option<(SlotId, MeasurementRecord)> {
        let found = match self.policy {
            TransmitPolicy::OldestUnsent => store.pending_unsent().nth(skipped),
            TransmitPolicy::RecentWindow { window } => store.pending_recent(window).nth(skipped),
        };

        found.map(|(id, record)| (id, *record))
    }
}

impl Default for TransmissionPipeline {
    fn default() -> Self {
        Self::from_config(&MonitorConfig::default())
    }
}
