//! The multi-channel memory controller.
//!
//! This module ties the per-channel machinery together behind the admission
//! and per-cycle operation API. It provides:
//! 1. **Admission:** `add_rq`/`add_wq` with write forwarding, read coalescing,
//!    and in-place write merging; a full queue rejects synchronously.
//! 2. **Operation:** One call per controller cycle runs drain, scheduling,
//!    bus arbitration, and the forward-progress check in a fixed order.
//! 3. **Statistics:** Parallel free-running and region-of-interest windows
//!    per channel.
//!
//! The controller never invents latency: every cycle charged comes from the
//! configured timing parameters, and every completion is observable as
//! exactly one response per registered sink.

use std::cell::RefCell;
use std::rc::Rc;

use crate::common::{ConfigError, DeadlockError};
use crate::config::{Config, GeometryConfig, TimingConfig};
use crate::mem::addrdec::AddressDecoder;
use crate::mem::channel::DramChannel;
use crate::mem::deadlock;
use crate::mem::request::{Request, Response, ResponseSink};
use crate::mem::upstream::{UpstreamChannel, UpstreamRequest};

/// Cycle-stepped DRAM memory controller with one scheduler per channel.
#[derive(Debug)]
pub struct MemoryController {
    decoder: AddressDecoder,
    timing: TimingConfig,
    idle_memory: bool,
    geometry: GeometryConfig,
    channels: Vec<DramChannel>,
    upstream: Vec<Rc<RefCell<UpstreamChannel>>>,
}

impl MemoryController {
    /// Builds a controller for the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Validated model configuration.
    /// * `upstream` - Collaborator channels drained at the start of each cycle.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the configuration fails validation; an
    /// unusable address mapping is fatal at construction, never at runtime.
    pub fn new(
        config: &Config,
        upstream: Vec<Rc<RefCell<UpstreamChannel>>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let decoder = AddressDecoder::new(&config.geometry)?;

        let bank_count = (config.geometry.ranks * config.geometry.banks) as usize;
        let channels = (0..config.geometry.channels as usize)
            .map(|index| {
                DramChannel::new(
                    index,
                    bank_count,
                    config.queues.rq_size,
                    config.queues.wq_size,
                )
            })
            .collect();

        Ok(Self {
            decoder,
            timing: config.timing.clone(),
            idle_memory: config.general.idle_memory,
            geometry: config.geometry.clone(),
            channels,
            upstream,
        })
    }

    /// Total addressable capacity in bytes.
    pub const fn size(&self) -> u64 {
        self.geometry.channels
            * self.geometry.ranks
            * self.geometry.banks
            * self.geometry.rows
            * self.geometry.columns
            * self.geometry.block_bytes
    }

    /// The controller's address decoder.
    pub const fn decoder(&self) -> &AddressDecoder {
        &self.decoder
    }

    /// The per-channel state, in channel-index order.
    pub fn channels(&self) -> &[DramChannel] {
        &self.channels
    }

    /// Admits a read into its channel's read queue.
    ///
    /// Tried in order before a slot is consumed:
    /// 1. A pending write to the same block answers the read immediately
    ///    (write forwarding); no slot is used.
    /// 2. An in-flight read of the same block absorbs this one's sink and
    ///    dependents (coalescing); no slot is used.
    /// 3. Otherwise the first free slot is taken.
    ///
    /// Returns `false`, and counts a `rq_full` event, when the queue has no
    /// free slot; the caller holds the submission and retries later.
    pub fn add_rq(&mut self, submission: &UpstreamRequest, sink: ResponseSink, cycle: u64) -> bool {
        let address = submission.address.block_aligned(self.decoder.offset_bits());
        let index = self.decoder.channel(address) as usize;
        let channel = &mut self.channels[index];

        if let Some(slot) = channel.wq.find_address(address)
            && let Some(write) = channel.wq.get(slot)
        {
            let response = Response {
                address,
                v_address: submission.v_address,
                data: write.data,
                pf_metadata: submission.pf_metadata,
                instr_depend_on_me: submission.instr_depend_on_me.clone(),
            };
            sink.borrow_mut().push_back(response);
            tracing::trace!(%address, "read forwarded from pending write");
            return true;
        }

        if let Some(slot) = channel.rq.find_address(address)
            && let Some(read) = channel.rq.get_mut(slot)
        {
            read.to_return.push(sink);
            read.instr_depend_on_me
                .extend(submission.instr_depend_on_me.iter().copied());
            tracing::trace!(%address, "read coalesced onto in-flight read");
            return true;
        }

        let request = Request {
            forward_checked: true,
            asid: submission.asid,
            pf_metadata: submission.pf_metadata,
            address,
            v_address: submission.v_address,
            initiate_cycle: cycle,
            instr_depend_on_me: submission.instr_depend_on_me.clone(),
            to_return: vec![sink],
            ..Request::default()
        };
        if channel.rq.insert(request).is_some() {
            true
        } else {
            channel.bump(|s| s.rq_full += 1);
            false
        }
    }

    /// Admits a write into its channel's write queue.
    ///
    /// A pending write to the same block is merged in place (its data is
    /// overwritten) without consuming a slot. Returns `false`, and counts a
    /// `wq_full` event, when the queue has no free slot.
    pub fn add_wq(&mut self, submission: &UpstreamRequest, cycle: u64) -> bool {
        let address = submission.address.block_aligned(self.decoder.offset_bits());
        let index = self.decoder.channel(address) as usize;
        let channel = &mut self.channels[index];

        if let Some(slot) = channel.wq.find_address(address)
            && let Some(write) = channel.wq.get_mut(slot)
        {
            write.data = submission.data;
            tracing::trace!(%address, "write merged in place");
            return true;
        }

        let request = Request {
            asid: submission.asid,
            pf_metadata: submission.pf_metadata,
            address,
            v_address: submission.v_address,
            data: submission.data,
            initiate_cycle: cycle,
            ..Request::default()
        };
        if channel.wq.insert(request).is_some() {
            true
        } else {
            channel.bump(|s| s.wq_full += 1);
            false
        }
    }

    /// Drains pending submissions from every upstream channel.
    ///
    /// Each deque is drained oldest-first and stops at the first rejection,
    /// preserving per-collaborator submission order under backpressure.
    fn initiate_requests(&mut self, cycle: u64) {
        for index in 0..self.upstream.len() {
            let upstream = Rc::clone(&self.upstream[index]);
            let mut upstream = upstream.borrow_mut();

            loop {
                let Some(front) = upstream.rq.front() else {
                    break;
                };
                if !self.add_rq(front, upstream.sink(), cycle) {
                    break;
                }
                let _ = upstream.rq.pop_front();
            }

            loop {
                let Some(front) = upstream.wq.front() else {
                    break;
                };
                if !self.add_wq(front, cycle) {
                    break;
                }
                let _ = upstream.wq.pop_front();
            }
        }
    }

    /// Runs one controller cycle.
    ///
    /// Phase order is fixed: drain upstream submissions, then per channel the
    /// write-mode update and bank scheduling, then bus completion and grant,
    /// then the forward-progress check.
    ///
    /// # Returns
    ///
    /// The number of scheduling and bus events that made progress this cycle.
    ///
    /// # Errors
    ///
    /// Returns a [`DeadlockError`] when any channel holds a request older
    /// than the watchdog's cycle budget.
    pub fn operate(&mut self, cycle: u64) -> Result<u64, DeadlockError> {
        self.initiate_requests(cycle);

        let mut progress = 0;
        for channel in &mut self.channels {
            progress += channel.schedule_banks(cycle, &self.decoder, &self.timing, self.idle_memory);
            progress += channel.operate_bus(cycle, &self.timing);
        }

        for (index, channel) in self.channels.iter().enumerate() {
            deadlock::check_channel(channel, index, cycle)?;
        }
        Ok(progress)
    }

    /// Zeroes the region-of-interest window on every channel.
    ///
    /// The free-running window is unaffected; in-flight requests complete
    /// into the new window.
    pub fn begin_roi(&mut self) {
        for channel in &mut self.channels {
            channel.roi_stats.reset();
        }
        tracing::info!("region of interest begins");
    }

    /// Prints the final report for every channel's free-running window.
    pub fn print_stats(&self) {
        for channel in &self.channels {
            channel.sim_stats.print();
        }
    }

    /// Prints the final report for every channel's region-of-interest window.
    pub fn print_roi_stats(&self) {
        for channel in &self.channels {
            channel.roi_stats.print();
        }
    }
}
