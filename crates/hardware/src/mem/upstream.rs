//! Upstream collaborator channels.
//!
//! The cache hierarchy does not call the controller directly each cycle;
//! it appends submissions to a shared [`UpstreamChannel`] and the controller
//! drains every registered channel at the start of its own cycle. Submissions
//! that cannot be admitted (full queue) stay at the front of the deque and
//! are retried on a later controller cycle — synchronous backpressure, never
//! an error. Completed reads are pushed into the channel's `returned` queue.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::common::{PhysAddr, VirtAddr};
use crate::mem::request::{InstrHandle, Response, ResponseSink};

/// A memory access as submitted by an upstream collaborator.
#[derive(Debug, Clone, Default)]
pub struct UpstreamRequest {
    /// Physical address of the accessed block.
    pub address: PhysAddr,
    /// Originating virtual address.
    pub v_address: VirtAddr,
    /// Write data, unused for reads.
    pub data: u64,
    /// Address-space identifier pair.
    pub asid: [u8; 2],
    /// Prefetch metadata carried through to the response.
    pub pf_metadata: u32,
    /// Instructions waiting on this access.
    pub instr_depend_on_me: Vec<InstrHandle>,
}

/// Submission and return queues shared between one collaborator and the
/// controller.
#[derive(Debug, Default)]
pub struct UpstreamChannel {
    /// Pending read submissions, oldest first.
    pub rq: VecDeque<UpstreamRequest>,
    /// Pending write submissions, oldest first.
    pub wq: VecDeque<UpstreamRequest>,
    /// Completed read responses for this collaborator.
    pub returned: ResponseSink,
}

impl UpstreamChannel {
    /// Creates a channel wrapped for sharing with the controller.
    pub fn new() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }

    /// Queues a read submission.
    pub fn submit_read(&mut self, request: UpstreamRequest) {
        self.rq.push_back(request);
    }

    /// Queues a write submission.
    pub fn submit_write(&mut self, request: UpstreamRequest) {
        self.wq.push_back(request);
    }

    /// Returns the sink the controller registers for this channel's reads.
    pub fn sink(&self) -> ResponseSink {
        Rc::clone(&self.returned)
    }

    /// Pops the next completed response, if any.
    pub fn pop_response(&mut self) -> Option<Response> {
        self.returned.borrow_mut().pop_front()
    }
}

/// Convenience constructor for a read of the given physical address.
pub fn read_of(address: u64) -> UpstreamRequest {
    UpstreamRequest {
        address: PhysAddr::new(address),
        v_address: VirtAddr::new(address),
        ..UpstreamRequest::default()
    }
}

/// Convenience constructor for a write of `data` to the given address.
pub fn write_of(address: u64, data: u64) -> UpstreamRequest {
    UpstreamRequest {
        address: PhysAddr::new(address),
        v_address: VirtAddr::new(address),
        data,
        ..UpstreamRequest::default()
    }
}
