//! Fixed-capacity admission queues.
//!
//! Each channel owns one read queue and one write queue. A queue is a
//! fixed-capacity sequence of optional request slots:
//! 1. **Admission:** New requests take the first free slot; a full queue rejects synchronously.
//! 2. **Stability:** Capacity never changes after construction, so a [`SlotIndex`]
//!    handed to the bank scheduler stays valid for the request's whole lifetime.
//! 3. **Completion:** The serviced slot is cleared, freeing capacity.
//!
//! Scan order is slot order, which doubles as the first-come-first-served
//! tie-break among requests contending for the same idle bank.

use crate::common::PhysAddr;
use crate::mem::request::Request;

/// Stable position of a request in its queue.
///
/// Valid from admission until the slot is cleared at completion; the bank
/// state machine holds one of these instead of a reference so that no
/// aliasing into the slot storage is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotIndex(pub usize);

/// A fixed-capacity queue of optional request slots.
#[derive(Debug, Default)]
pub struct RequestQueue {
    slots: Vec<Option<Request>>,
}

impl RequestQueue {
    /// Creates a queue with the given fixed capacity.
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self { slots }
    }

    /// Returns the fixed capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of occupied slots.
    #[inline]
    pub fn occupancy(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Returns true if no slot is free.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_some())
    }

    /// Inserts a request into the first free slot.
    ///
    /// Returns the slot index, or `None` if the queue is full (the caller
    /// reports synchronous backpressure and retries on a later cycle).
    pub fn insert(&mut self, request: Request) -> Option<SlotIndex> {
        let index = self.slots.iter().position(|slot| slot.is_none())?;
        self.slots[index] = Some(request);
        Some(SlotIndex(index))
    }

    /// Returns the request in the given slot, if occupied.
    #[inline]
    pub fn get(&self, index: SlotIndex) -> Option<&Request> {
        self.slots.get(index.0)?.as_ref()
    }

    /// Returns the request in the given slot mutably, if occupied.
    #[inline]
    pub fn get_mut(&mut self, index: SlotIndex) -> Option<&mut Request> {
        self.slots.get_mut(index.0)?.as_mut()
    }

    /// Clears the given slot, returning its request.
    pub fn take(&mut self, index: SlotIndex) -> Option<Request> {
        self.slots.get_mut(index.0)?.take()
    }

    /// Finds the slot holding a request for the given address.
    ///
    /// Admission stores block-aligned addresses, so equality here is the
    /// same-block test used for read coalescing and write merging.
    pub fn find_address(&self, address: PhysAddr) -> Option<SlotIndex> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|req| req.address == address))
            .map(SlotIndex)
    }

    /// Iterates occupied slots in queue (FCFS) order.
    pub fn iter_occupied(&self) -> impl Iterator<Item = (SlotIndex, &Request)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|req| (SlotIndex(i), req)))
    }

    /// Admission cycle of the oldest request still in flight.
    ///
    /// The deadlock watchdog compares this against its cycle budget.
    pub fn oldest_admission_cycle(&self) -> Option<u64> {
        self.slots
            .iter()
            .flatten()
            .map(|req| req.initiate_cycle)
            .min()
    }
}
