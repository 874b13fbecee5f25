//! Fixed-Capacity Ring Store for Measurement Records
//!
//! ## Overview
//!
//! The ring store is the durable state of the monitor: the last `N` validated
//! measurement records, kept in a statically sized array. Once full, each
//! append overwrites the oldest slot. The past is lossy, the present never is.
//!
//! Alongside each record the store keeps its delivery state, so the
//! transmission pipeline can drain the backlog and retry failures without a
//! second queue.
//!
//! ## Slot Identity
//!
//! Appends return a [`SlotId`]: the record's sequence number among all records
//! ever written. Physical position is `seq % N`. Because the id is the full
//! sequence number rather than the array index, a stale id for a slot that has
//! since been overwritten is detected and ignored instead of touching the new
//! occupant.
//!
//! ```text
//! RingStore<5> after 7 appends:
//! ┌─────┬─────┬─────┬─────┬─────┐
//! │ #5  │ #6  │ #2  │ #3  │ #4  │  ← sequence numbers held
//! └─────┴─────┴─────┴─────┴─────┘
//!    0     1     2     3     4      ← physical slots
//!                ↑
//!                └── write_pos = 2 (oldest, next to overwrite)
//!
//! total_written = 7, len = 5
//! live ids: 2..7   mark_sent(SlotId(0)) → no-op
//! ```
//!
//! ## Delivery State
//!
//! Each slot is `Pending`, `Sent`, or `Quarantined`:
//! - `Pending` records are offered by [`RingStore::pending_unsent`]
//! - `Sent` records stay for export until overwritten
//! - `Quarantined` records failed an integrity check on read-back; they are
//!   never offered for transmission or verified export again
//!
//! ## Access Model
//!
//! Mutation takes `&mut self` and every view borrows `&self`, so the borrow
//! checker enforces single-writer / many-reader: no iterator can observe a
//! slot mid-write. Moving transmission into an interrupt context would
//! require wrapping the store in a critical-section mutex.

use crate::record::MeasurementRecord;

/// Identity of an appended record: its sequence number since boot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(u64);

impl SlotId {
    /// Sequence number of the record
    pub const fn sequence(&self) -> u64 {
        self.0
    }
}

/// Delivery state of a stored record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryState {
    /// Not yet confirmed delivered
    Pending,
    /// Accepted by the transport
    Sent,
    /// Failed integrity on read-back, never used again
    Quarantined,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    record: MeasurementRecord,
    seq: u64,
    state: DeliveryState,
}

/// Fixed-capacity, overwrite-oldest store of measurement records
///
/// ## Internal Invariants
///
/// - `write_pos == total_written % N`
/// - `len == min(total_written, N)`
/// - the slot at `seq % N` holds sequence `seq` for every live id
#[derive(Clone)]
pub struct RingStore<const N: usize> {
    slots: [Option<Slot>; N],
    write_pos: usize,
    len: usize,
    total_written: u64,
}

impl<const N: usize> RingStore<N> {
    const NON_ZERO: () = assert!(N > 0, "RingStore capacity must be non-zero");

    /// Create an empty store
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_ZERO;

        Self {
            slots: [None; N],
            write_pos: 0,
            len: 0,
            total_written: 0,
        }
    }

    /// Append a validated record, overwriting the oldest when full
    ///
    /// Never fails and never blocks.
    pub fn append(&mut self, record: MeasurementRecord) -> SlotId {
        let seq = self.total_written;
        self.slots[self.write_pos] = Some(Slot {
            record,
            seq,
            state: DeliveryState::Pending,
        });

        self.write_pos = (self.write_pos + 1) % N;
        self.total_written += 1;
        if self.len < N {
            self.len += 1;
        }

        SlotId(seq)
    }

    /// Most recently appended record
    pub fn latest(&self) -> Option<MeasurementRecord> {
        self.entries_newest_first().next().map(|slot| slot.record)
    }

    /// Up to `n` most recent records, newest first
    pub fn window(&self, n: usize) -> impl Iterator<Item = &MeasurementRecord> + '_ {
        self.entries_newest_first().take(n).map(|slot| &slot.record)
    }

    /// Records not yet delivered, oldest first
    ///
    /// Bounded by capacity. Each call reflects the current delivery state.
    pub fn pending_unsent(&self) -> impl Iterator<Item = (SlotId, &MeasurementRecord)> + '_ {
        self.entries_oldest_first()
            .filter(|slot| slot.state == DeliveryState::Pending)
            .map(|slot| (SlotId(slot.seq), &slot.record))
    }

    /// Undelivered records among the `n` most recent, newest first
    pub fn pending_recent(&self, n: usize) -> impl Iterator<Item = (SlotId, &MeasurementRecord)> + '_ {
        self.entries_newest_first()
            .take(n)
            .filter(|slot| slot.state == DeliveryState::Pending)
            .map(|slot| (SlotId(slot.seq), &slot.record))
    }

    /// Mark a record as delivered
    ///
    /// Idempotent. Ids for overwritten or quarantined slots are ignored.
    pub fn mark_sent(&mut self, id: SlotId) {
        if let Some(slot) = self.slot_mut(id) {
            if slot.state == DeliveryState::Pending {
                slot.state = DeliveryState::Sent;
            }
        }
    }

    /// Exclude a record that failed its integrity check from all trusted use
    pub fn quarantine(&mut self, id: SlotId) {
        if let Some(slot) = self.slot_mut(id) {
            slot.state = DeliveryState::Quarantined;
        }
    }

    /// Delivery state of a live record, `None` once overwritten
    pub fn state(&self, id: SlotId) -> Option<DeliveryState> {
        self.slot(id).map(|slot| slot.state)
    }

    /// All stored records, oldest first, regardless of delivery state
    ///
    /// Raw view for reporting. Use [`verified`](Self::verified) for anything
    /// that treats the records as trusted.
    pub fn iter(&self) -> impl Iterator<Item = &MeasurementRecord> + '_ {
        self.entries_oldest_first().map(|slot| &slot.record)
    }

    /// Stored records that pass their integrity check, oldest first
    pub fn verified(&self) -> impl Iterator<Item = &MeasurementRecord> + '_ {
        self.entries_oldest_first()
            .filter(|slot| slot.state != DeliveryState::Quarantined)
            .map(|slot| &slot.record)
            .filter(|record| record.verify().is_ok())
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if store is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if store is full
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Fixed capacity
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Records appended since boot, including overwritten ones
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Number of stored records awaiting delivery
    pub fn pending_count(&self) -> usize {
        self.entries_oldest_first()
            .filter(|slot| slot.state == DeliveryState::Pending)
            .count()
    }

    fn is_live(&self, id: SlotId) -> bool {
        id.0 < self.total_written && id.0 >= self.total_written - self.len as u64
    }

    fn slot(&self, id: SlotId) -> Option<&Slot> {
        if !self.is_live(id) {
            return None;
        }
        self.slots[(id.0 % N as u64) as usize]
            .as_ref()
            .filter(|slot| slot.seq == id.0)
    }

    fn slot_mut(&mut self, id: SlotId) -> Option<&mut Slot> {
        if !self.is_live(id) {
            return None;
        }
        self.slots[(id.0 % N as u64) as usize]
            .as_mut()
            .filter(|slot| slot.seq == id.0)
    }

    /// Translate a logical index (0 = oldest) to its physical slot
    ///
    /// ```text
    /// Physical array:  [D, E, A, B, C]  (write_pos = 2, len = 5)
    /// Logical view:    [A, B, C, D, E]
    /// start = (write_pos + N - len) % N = 2
    /// ```
    fn get(&self, index: usize) -> Option<&Slot> {
        if index >= self.len {
            return None;
        }
        let start = (self.write_pos + N - self.len) % N;
        self.slots[(start + index) % N].as_ref()
    }

    fn entries_oldest_first(&self) -> Entries<'_, N> {
        Entries {
            store: self,
            front: 0,
            back: self.len,
        }
    }

    fn entries_newest_first(&self) -> core::iter::Rev<Entries<'_, N>> {
        self.entries_oldest_first().rev()
    }

    #[cfg(test)]
    pub(crate) fn corrupt(&mut self, id: SlotId) {
        if let Some(slot) = self.slot_mut(id) {
            slot.record.corrupt();
        }
    }
}

impl<const N: usize> Default for RingStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Double-ended walk over live slots in logical order
struct Entries<'a, const N: usize> {
    store: &'a RingStore<N>,
    front: usize,
    back: usize,
}

impl<'a, const N: usize> Iterator for Entries<'a, N> {
    type Item = &'a Slot;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let slot = self.store.get(self.front)?;
        self.front += 1;
        Some(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<'a, const N: usize> DoubleEndedIterator for Entries<'a, N> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.store.get(self.back)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(i: u64) -> MeasurementRecord {
        MeasurementRecord::new(i * 60_000, 100.0 + i as f32, 33.0, 90).unwrap()
    }

    fn timestamps<'a>(records: impl Iterator<Item = &'a MeasurementRecord>) -> Vec<u64> {
        records.map(|r| r.timestamp()).collect()
    }

    #[test]
    fn empty_store() {
        let store: RingStore<5> = RingStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(store.latest().is_none());
        assert_eq!(store.window(3).count(), 0);
        assert_eq!(store.pending_unsent().count(), 0);
    }

    #[test]
    fn append_and_latest() {
        let mut store = RingStore::<5>::new();

        let id = store.append(record(1));
        assert_eq!(id.sequence(), 0);
        assert_eq!(store.len(), 1);
        assert_eq!(store.latest(), Some(record(1)));
    }

    #[test]
    fn overwrite_keeps_last_capacity() {
        let mut store = RingStore::<3>::new();
        for i in 0..5 {
            store.append(record(i));
        }

        assert_eq!(store.len(), 3);
        assert!(store.is_full());
        assert_eq!(store.total_written(), 5);
        assert_eq!(timestamps(store.iter()), vec![120_000, 180_000, 240_000]);
    }

    #[test]
    fn window_is_newest_first_and_short_when_sparse() {
        let mut store = RingStore::<4>::new();
        for i in 0..6 {
            store.append(record(i));
        }

        assert_eq!(timestamps(store.window(2)), vec![300_000, 240_000]);
        assert_eq!(store.window(10).count(), 4);
    }

    #[test]
    fn mark_sent_is_idempotent() {
        let mut store = RingStore::<4>::new();
        let first = store.append(record(0));
        store.append(record(1));

        store.mark_sent(first);
        let after_once: Vec<_> = store.pending_unsent().map(|(id, _)| id).collect();
        store.mark_sent(first);
        let after_twice: Vec<_> = store.pending_unsent().map(|(id, _)| id).collect();

        assert_eq!(after_once, after_twice);
        assert_eq!(store.state(first), Some(DeliveryState::Sent));
        assert_eq!(store.pending_count(), 1);
    }

    #[test]
    fn mark_sent_on_overwritten_slot_is_noop() {
        let mut store = RingStore::<2>::new();
        let stale = store.append(record(0));
        store.append(record(1));
        let occupant = store.append(record(2)); // reuses the physical slot of `stale`

        store.mark_sent(stale);

        assert_eq!(store.state(stale), None);
        assert_eq!(store.state(occupant), Some(DeliveryState::Pending));
        assert_eq!(store.pending_count(), 2);
    }

    #[test]
    fn pending_is_oldest_first_and_restartable() {
        let mut store = RingStore::<8>::new();
        let ids: Vec<_> = (0..4).map(|i| store.append(record(i))).collect();

        store.mark_sent(ids[1]);
        let pending: Vec<_> = store.pending_unsent().map(|(id, _)| id).collect();
        assert_eq!(pending, vec![ids[0], ids[2], ids[3]]);

        store.mark_sent(ids[0]);
        let pending: Vec<_> = store.pending_unsent().map(|(id, _)| id).collect();
        assert_eq!(pending, vec![ids[2], ids[3]]);
    }

    #[test]
    fn pending_recent_is_bounded_newest_first() {
        let mut store = RingStore::<8>::new();
        let ids: Vec<_> = (0..5).map(|i| store.append(record(i))).collect();
        store.mark_sent(ids[3]);

        let recent: Vec<_> = store.pending_recent(3).map(|(id, _)| id).collect();
        assert_eq!(recent, vec![ids[4], ids[2]]);
    }

    #[test]
    fn quarantined_records_leave_pending_and_verified_views() {
        let mut store = RingStore::<4>::new();
        let good = store.append(record(0));
        let bad = store.append(record(1));
        store.corrupt(bad);
        store.quarantine(bad);

        let pending: Vec<_> = store.pending_unsent().map(|(id, _)| id).collect();
        assert_eq!(pending, vec![good]);
        assert_eq!(store.verified().count(), 1);
        assert_eq!(store.iter().count(), 2);

        // A quarantined record cannot be marked sent
        store.mark_sent(bad);
        assert_eq!(store.state(bad), Some(DeliveryState::Quarantined));
    }

    #[test]
    fn verified_skips_corruption_even_before_quarantine() {
        let mut store = RingStore::<4>::new();
        store.append(record(0));
        let bad = store.append(record(1));
        store.corrupt(bad);

        assert_eq!(store.verified().count(), 1);
    }

    proptest! {
        #[test]
        fn holds_exactly_the_last_capacity_records(count in 0usize..40) {
            let mut store = RingStore::<16>::new();
            for i in 0..count {
                store.append(record(i as u64));
            }

            let kept = count.min(16);
            let expected: Vec<u64> = (count - kept..count).map(|i| i as u64 * 60_000).collect();
            prop_assert_eq!(timestamps(store.iter()), expected);
            prop_assert_eq!(store.len(), kept);
            prop_assert_eq!(store.total_written(), count as u64);
        }

        #[test]
        fn window_matches_reversed_tail(count in 0usize..40, n in 0usize..20) {
            let mut store = RingStore::<16>::new();
            for i in 0..count {
                store.append(record(i as u64));
            }

            let mut all = timestamps(store.iter());
            all.reverse();
            all.truncate(n);
            prop_assert_eq!(timestamps(store.window(n)), all);
        }
    }
}
