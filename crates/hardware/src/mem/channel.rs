//! Per-channel DRAM state and scheduling.
//!
//! Each channel owns its queues, bank array, and shared data bus, and runs
//! the channel-local phases of the per-cycle protocol:
//! 1. **Mode control:** Write-drain hysteresis over write-queue occupancy.
//! 2. **Bank scheduling:** Claims idle banks for queued requests and charges
//!    row-hit or precharge + activate + column timing.
//! 3. **Bus arbitration:** Grants the single bus to the earliest-ready bank,
//!    charges turnaround on direction changes, and delivers completions.
//!
//! All state here is private to the channel and touched only by the
//! controller's per-cycle operation; collaborators never reach in.

use crate::config::TimingConfig;
use crate::mem::addrdec::AddressDecoder;
use crate::mem::bank::{BankState, QueueKind, SlotRef};
use crate::mem::queue::{RequestQueue, SlotIndex};
use crate::stats::DramStats;

/// One DRAM channel: queues, banks, bus, and statistics windows.
#[derive(Debug)]
pub struct DramChannel {
    /// Read admission queue.
    pub(crate) rq: RequestQueue,
    /// Write admission queue.
    pub(crate) wq: RequestQueue,
    /// Bank state, `ranks * banks` entries, fixed at construction.
    banks: Vec<BankState>,

    /// Bank currently driving the shared bus.
    active_bank: Option<usize>,
    /// Cycle at which the bus becomes free.
    dbus_cycle_available: u64,
    /// Direction of the previous bus grant; a change costs turnaround.
    dbus_last_write: bool,

    /// Whether writes currently have scheduling priority.
    write_mode: bool,
    /// Writes completed since entering write mode.
    writes_drained: usize,

    /// Free-running statistics window.
    pub sim_stats: DramStats,
    /// Region-of-interest statistics window, zeroed at the ROI transition.
    pub roi_stats: DramStats,

    // Watermarks controlling when to send out a burst of writes.
    write_high_wm: usize,
    write_low_wm: usize,
    min_writes_per_switch: usize,
}

impl DramChannel {
    /// Creates a channel with empty queues and all banks idle.
    ///
    /// # Arguments
    ///
    /// * `index` - Channel index, used for the report label.
    /// * `bank_count` - Total banks (ranks × banks per rank).
    /// * `rq_size` - Read queue capacity.
    /// * `wq_size` - Write queue capacity.
    pub fn new(index: usize, bank_count: usize, rq_size: usize, wq_size: usize) -> Self {
        let name = format!("dram_ch{index}");
        Self {
            rq: RequestQueue::new(rq_size),
            wq: RequestQueue::new(wq_size),
            banks: vec![BankState::default(); bank_count],
            active_bank: None,
            dbus_cycle_available: 0,
            dbus_last_write: false,
            write_mode: false,
            writes_drained: 0,
            sim_stats: DramStats::new(name.clone()),
            roi_stats: DramStats::new(name),
            write_high_wm: (wq_size * 7) >> 3, // 7/8th
            write_low_wm: (wq_size * 6) >> 3,  // 6/8th
            min_writes_per_switch: wq_size >> 2, // 1/4
        }
    }

    /// Returns true if the channel is in write-drain mode.
    #[inline]
    pub const fn write_mode(&self) -> bool {
        self.write_mode
    }

    /// Read queue occupancy.
    #[inline]
    pub fn rq_occupancy(&self) -> usize {
        self.rq.occupancy()
    }

    /// Write queue occupancy.
    #[inline]
    pub fn wq_occupancy(&self) -> usize {
        self.wq.occupancy()
    }

    /// Admission cycle of the channel's oldest in-flight request.
    pub fn oldest_admission_cycle(&self) -> Option<u64> {
        [&self.rq, &self.wq]
            .into_iter()
            .filter_map(RequestQueue::oldest_admission_cycle)
            .min()
    }

    /// Applies a counter update to both statistics windows.
    pub(crate) fn bump(&mut self, update: impl Fn(&mut DramStats)) {
        update(&mut self.sim_stats);
        update(&mut self.roi_stats);
    }

    /// Advances the write-drain hysteresis.
    ///
    /// Entry: write-queue occupancy reaches the high watermark. Exit: both
    /// occupancy below the low watermark *and* the minimum number of writes
    /// drained since entry — the second condition prevents thrashing between
    /// modes during long write bursts.
    pub(crate) fn update_write_mode(&mut self) {
        let occupancy = self.wq.occupancy();
        if !self.write_mode && occupancy >= self.write_high_wm {
            self.write_mode = true;
            self.writes_drained = 0;
            tracing::debug!(
                channel = %self.sim_stats.name,
                occupancy,
                "entering write-drain mode"
            );
        } else if self.write_mode
            && occupancy < self.write_low_wm
            && self.writes_drained >= self.min_writes_per_switch
        {
            self.write_mode = false;
            tracing::debug!(
                channel = %self.sim_stats.name,
                occupancy,
                drained = self.writes_drained,
                "leaving write-drain mode"
            );
        }
    }

    /// Bank scheduling phase: claims idle banks for unscheduled requests.
    ///
    /// The mode-priority queue is scanned first in slot (FCFS) order; the
    /// other queue then fills idle banks no priority request claimed. A
    /// row-buffer hit charges tCAS only; a miss charges tRP + tRCD + tCAS
    /// and latches the new row.
    ///
    /// Returns the number of requests scheduled.
    pub(crate) fn schedule_banks(
        &mut self,
        cycle: u64,
        decoder: &AddressDecoder,
        timing: &TimingConfig,
        idle_memory: bool,
    ) -> u64 {
        self.update_write_mode();

        let mut progress = 0;
        let order = if self.write_mode {
            [QueueKind::Write, QueueKind::Read]
        } else {
            [QueueKind::Read, QueueKind::Write]
        };

        for kind in order {
            let capacity = self.queue(kind).capacity();
            for slot in (0..capacity).map(SlotIndex) {
                let Some(request) = self.queue(kind).get(slot) else {
                    continue;
                };
                if request.scheduled {
                    continue;
                }
                let address = request.address;

                let bank_idx = decoder.flat_bank(address);
                if !self.banks[bank_idx].is_idle() {
                    self.bump(|s| s.bank_access_fail += 1);
                    continue;
                }

                let row = decoder.row(address);
                let hit = self.banks[bank_idx].open_row == Some(row);
                // An otherwise-empty channel skips the row cycle when the
                // idealized idle-memory shortcut is enabled.
                let uncontended =
                    idle_memory && self.rq.occupancy() + self.wq.occupancy() == 1;
                let charge = if hit || uncontended {
                    timing.t_cas
                } else {
                    timing.t_rp + timing.t_rcd + timing.t_cas
                };
                let event_cycle = cycle + charge;

                self.banks[bank_idx].claim(row, hit, event_cycle, SlotRef { kind, index: slot });
                if let Some(request) = self.queue_mut(kind).get_mut(slot) {
                    request.scheduled = true;
                    request.bank_cycle = cycle;
                    request.event_cycle = event_cycle;
                }

                self.bump(|s| {
                    s.bank_access_success += 1;
                    match (kind, hit) {
                        (QueueKind::Read, true) => s.rq_row_buffer_hit += 1,
                        (QueueKind::Read, false) => s.rq_row_buffer_miss += 1,
                        (QueueKind::Write, true) => s.wq_row_buffer_hit += 1,
                        (QueueKind::Write, false) => s.wq_row_buffer_miss += 1,
                    }
                });
                tracing::trace!(
                    channel = %self.sim_stats.name,
                    bank = bank_idx,
                    row,
                    hit,
                    event_cycle,
                    "bank scheduled"
                );
                progress += 1;
            }
        }
        progress
    }

    /// Bus arbitration phase: completes the active transfer, then grants the
    /// bus to the earliest-ready bank (ties broken by bank index).
    ///
    /// Returns the number of completions plus grants this cycle.
    pub(crate) fn operate_bus(&mut self, cycle: u64, timing: &TimingConfig) -> u64 {
        let mut progress = 0;

        if let Some(bank_idx) = self.active_bank
            && self.dbus_cycle_available <= cycle
        {
            progress += self.complete_active(cycle, bank_idx);
            self.active_bank = None;
        }

        if self.active_bank.is_none()
            && let Some(bank_idx) = self.next_ready_bank(cycle)
        {
            let is_write = matches!(
                self.banks[bank_idx].serving,
                Some(SlotRef {
                    kind: QueueKind::Write,
                    ..
                })
            );
            let mut cost = timing.dbus_return;
            if is_write != self.dbus_last_write {
                cost += timing.dbus_turnaround;
            }
            self.dbus_last_write = is_write;
            self.dbus_cycle_available = cycle + cost;
            self.active_bank = Some(bank_idx);

            if let Some(slot) = self.banks[bank_idx].serving
                && let Some(request) = self.queue_mut(slot.kind).get_mut(slot.index)
            {
                request.active_cycle = cycle;
            }
            progress += 1;
        }

        // Any remaining ready bank is stalled behind the granted one.
        let waiting = self
            .banks
            .iter()
            .enumerate()
            .filter(|(i, bank)| {
                bank.valid && bank.event_cycle <= cycle && Some(*i) != self.active_bank
            })
            .count() as u64;
        if waiting > 0 {
            self.bump(|s| {
                s.dbus_cycle_congested += 1;
                s.dbus_count_congested += waiting;
            });
        }

        progress
    }

    /// Finishes the transfer on the active bank: delivers read responses,
    /// accounts the three-stage latency, clears the slot, and frees the bank.
    fn complete_active(&mut self, cycle: u64, bank_idx: usize) -> u64 {
        let Some(slot) = self.banks[bank_idx].serving else {
            return 0;
        };
        let Some(request) = self.queue_mut(slot.kind).take(slot.index) else {
            return 0;
        };

        match slot.kind {
            QueueKind::Read => request.deliver(),
            QueueKind::Write => {
                if self.write_mode {
                    self.writes_drained += 1;
                }
            }
        }

        let initiate = request.bank_cycle - request.initiate_cycle;
        let bank = request.active_cycle - request.bank_cycle;
        let active = cycle - request.active_cycle;
        self.bump(|s| {
            s.total_access += 1;
            s.total_initiate_latency += initiate;
            s.total_bank_latency += bank;
            s.total_active_latency += active;
        });

        self.banks[bank_idx].release();
        tracing::trace!(
            channel = %self.sim_stats.name,
            bank = bank_idx,
            cycle,
            "transfer complete"
        );
        1
    }

    /// Earliest-ready bank eligible for the bus, ties broken by index.
    fn next_ready_bank(&self, cycle: u64) -> Option<usize> {
        self.banks
            .iter()
            .enumerate()
            .filter(|(_, bank)| bank.valid && bank.event_cycle <= cycle)
            .min_by_key(|(i, bank)| (bank.event_cycle, *i))
            .map(|(i, _)| i)
    }

    /// Dumps queue and bank state through `tracing::error!`.
    ///
    /// Called by the deadlock watchdog before the run aborts.
    pub fn dump_state(&self, cycle: u64) {
        tracing::error!(
            channel = %self.sim_stats.name,
            cycle,
            rq_occupancy = self.rq.occupancy(),
            wq_occupancy = self.wq.occupancy(),
            write_mode = self.write_mode,
            dbus_cycle_available = self.dbus_cycle_available,
            "channel state dump"
        );
        for (kind, queue) in [(QueueKind::Read, &self.rq), (QueueKind::Write, &self.wq)] {
            for (slot, request) in queue.iter_occupied() {
                tracing::error!(
                    queue = ?kind,
                    slot = slot.0,
                    address = %request.address,
                    scheduled = request.scheduled,
                    initiate_cycle = request.initiate_cycle,
                    event_cycle = request.event_cycle,
                    "queued request"
                );
            }
        }
        for (index, bank) in self.banks.iter().enumerate() {
            if bank.valid {
                tracing::error!(
                    bank = index,
                    open_row = ?bank.open_row,
                    event_cycle = bank.event_cycle,
                    row_buffer_hit = bank.row_buffer_hit,
                    "busy bank"
                );
            }
        }
    }

    /// The queue of the given kind.
    pub(crate) fn queue(&self, kind: QueueKind) -> &RequestQueue {
        match kind {
            QueueKind::Read => &self.rq,
            QueueKind::Write => &self.wq,
        }
    }

    /// The queue of the given kind, mutably.
    pub(crate) fn queue_mut(&mut self, kind: QueueKind) -> &mut RequestQueue {
        match kind {
            QueueKind::Read => &mut self.rq,
            QueueKind::Write => &mut self.wq,
        }
    }
}
