//! In-flight memory request and response types.
//!
//! This module defines the unit of work that flows through the controller. It provides:
//! 1. **Request:** One admitted memory access with its latency checkpoints.
//! 2. **Response:** The completion record pushed into every registered sink.
//! 3. **Handles:** Non-owning references to dependent instructions and response sinks.
//!
//! The model is single-threaded and cycle-stepped, so response sinks are
//! `Rc<RefCell<VecDeque<Response>>>` queues shared with the upstream
//! collaborator; no locking is involved. Dependent instructions are owned by
//! the core pipeline, never by the request, so they are referenced by plain
//! index handles that the consumer resolves on wakeup.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::common::{PhysAddr, VirtAddr};

/// Non-owning handle to a dependent instruction record.
///
/// The instruction lives in the core pipeline and may be retired or squashed
/// independently of this request; the handle is only meaningful to the
/// collaborator that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstrHandle(pub usize);

/// A shared completion queue owned by an upstream collaborator.
///
/// Each registered sink receives exactly one [`Response`] per completed read.
pub type ResponseSink = Rc<RefCell<VecDeque<Response>>>;

/// Completion record delivered to every sink registered on a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// Physical address of the completed block.
    pub address: PhysAddr,
    /// Originating virtual address.
    pub v_address: VirtAddr,
    /// Block payload.
    pub data: u64,
    /// Prefetch metadata carried through from admission.
    pub pf_metadata: u32,
    /// Instructions to wake now that the data is available.
    pub instr_depend_on_me: Vec<InstrHandle>,
}

/// One in-flight memory access occupying a queue slot.
///
/// A request is exclusively owned by its slot from admission to completion.
/// It is mutated in place as it moves through the scheduling phases; on
/// completion the result is copied to every sink and the slot is cleared.
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// Whether the bank scheduler has claimed a bank for this request.
    pub scheduled: bool,
    /// Whether admission already checked the write queue for forwarding.
    pub forward_checked: bool,

    /// Address-space identifier pair carried for bookkeeping.
    pub asid: [u8; 2],
    /// Prefetch metadata carried for bookkeeping.
    pub pf_metadata: u32,

    /// Physical address of the accessed block.
    pub address: PhysAddr,
    /// Originating virtual address.
    pub v_address: VirtAddr,
    /// Block payload (write data, or read fill data on completion).
    pub data: u64,
    /// Cycle at which the claimed bank completes its array access.
    pub event_cycle: u64,

    /// Cycle of admission into the queue.
    pub initiate_cycle: u64,
    /// Cycle at which the bank scheduler claimed a bank.
    pub bank_cycle: u64,
    /// Cycle at which the bus grant began.
    pub active_cycle: u64,

    /// Dependent instructions to wake on completion.
    pub instr_depend_on_me: Vec<InstrHandle>,
    /// Sinks that must each receive exactly one completion record.
    pub to_return: Vec<ResponseSink>,
}

impl Request {
    /// Builds the completion record for this request.
    pub fn response(&self) -> Response {
        Response {
            address: self.address,
            v_address: self.v_address,
            data: self.data,
            pf_metadata: self.pf_metadata,
            instr_depend_on_me: self.instr_depend_on_me.clone(),
        }
    }

    /// Pushes one completion record into every registered sink.
    pub fn deliver(&self) {
        let response = self.response();
        for sink in &self.to_return {
            sink.borrow_mut().push_back(response.clone());
        }
    }
}
