//! Per-bank state machine.
//!
//! One [`BankState`] exists for every rank × bank in a channel, created at
//! construction and mutated every cycle, never destroyed during a run. A bank
//! services at most one request at a time; the request is referenced by a
//! stable queue slot index, never by a pointer into the slot storage.

use crate::mem::queue::SlotIndex;

/// Which admission queue a bank's slot reference points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    /// The per-channel read queue.
    Read,
    /// The per-channel write queue.
    Write,
}

/// Stable reference to the queue slot a bank is servicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRef {
    /// Queue holding the request.
    pub kind: QueueKind,
    /// Position within that queue; valid until the slot is cleared.
    pub index: SlotIndex,
}

/// Timing state of one DRAM bank.
#[derive(Debug, Clone, Copy, Default)]
pub struct BankState {
    /// Whether the bank is busy servicing a request.
    pub valid: bool,
    /// Whether the last access hit the open row.
    pub row_buffer_hit: bool,
    /// The currently latched row, or `None` when no row is open.
    pub open_row: Option<u64>,
    /// Cycle at which the array access completes and the bank can use the bus.
    pub event_cycle: u64,
    /// Slot of the request being serviced; `Some` exactly when `valid`.
    pub serving: Option<SlotRef>,
}

impl BankState {
    /// Returns true if the bank can accept a new request this cycle.
    #[inline]
    pub const fn is_idle(&self) -> bool {
        !self.valid
    }

    /// Claims the bank for a request.
    ///
    /// # Arguments
    ///
    /// * `row` - Row the request targets; becomes the open row.
    /// * `row_buffer_hit` - Whether `row` was already latched.
    /// * `event_cycle` - Cycle at which the array access completes.
    /// * `slot` - Stable reference to the serviced queue slot.
    pub fn claim(&mut self, row: u64, row_buffer_hit: bool, event_cycle: u64, slot: SlotRef) {
        debug_assert!(self.is_idle(), "bank claimed while busy");
        self.valid = true;
        self.row_buffer_hit = row_buffer_hit;
        self.open_row = Some(row);
        self.event_cycle = event_cycle;
        self.serving = Some(slot);
    }

    /// Releases the bank after its request leaves the bus.
    ///
    /// The row stays open; a follow-up access to the same row is a hit.
    pub fn release(&mut self) {
        self.valid = false;
        self.row_buffer_hit = false;
        self.serving = None;
    }
}
