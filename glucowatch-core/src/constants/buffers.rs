//! Buffer Sizes
//!
//! Capacities are compile-time constants so every container in the core is
//! statically sized.

use super::time::{BASE_MEASUREMENT_INTERVAL_MS, MS_PER_DAY};

/// Ring store capacity (records).
///
/// One day at the base interval:
/// - 1440 records × ~40 bytes/slot = ~56KB
/// - Covers a full day without a connected host
pub const RING_STORE_CAPACITY: usize = (MS_PER_DAY / BASE_MEASUREMENT_INTERVAL_MS) as usize;

/// Smoothing window (raw readings averaged).
pub const SMOOTHING_WINDOW: usize = 3;

/// Pending alert queue depth.
///
/// Alerts raised while disconnected wait here, at most one per kind, so
/// eight slots leave headroom for new alert kinds. Oldest are dropped first.
pub const ALERT_OUTBOX_CAPACITY: usize = 8;

/// Maximum records handed to the transport per cycle.
pub const MAX_RECORDS_PER_CYCLE: usize = 10;

const _: () = assert!(
    RING_STORE_CAPACITY >= SMOOTHING_WINDOW,
    "Smoothing window must fit in the ring store"
);
