//! Per-channel statistics collection and reporting.
//!
//! This module tracks the counters published by each DRAM channel. It provides:
//! 1. **Queue counters:** Row-buffer hit/miss and full-rejection counts for both queues.
//! 2. **Bus counters:** Congested-cycle and congested-count totals for the shared data bus.
//! 3. **Bank counters:** Scheduling success/fail counts.
//! 4. **Latency breakdown:** Three-stage totals (admission, bank, active) and derived averages.
//!
//! Every channel carries two instances: a free-running `sim` window and a
//! `roi` window that is zeroed at the warmup-to-region-of-interest transition.
//! Field semantics are part of the reporting contract and must not change.

/// Counters published by one DRAM channel for one measurement window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DramStats {
    /// Channel label used in reports (e.g. `"dram_ch0"`).
    pub name: String,

    /// Cycles on which a bank was ready but the bus was already granted.
    pub dbus_cycle_congested: u64,
    /// Ready banks that could not be serviced, summed over congested cycles.
    pub dbus_count_congested: u64,

    /// Read-queue accesses scheduled into an already-open row.
    pub rq_row_buffer_hit: u64,
    /// Read-queue accesses that required precharge + activate.
    pub rq_row_buffer_miss: u64,
    /// Read admissions rejected because the read queue was full.
    pub rq_full: u64,

    /// Write-queue accesses scheduled into an already-open row.
    pub wq_row_buffer_hit: u64,
    /// Write-queue accesses that required precharge + activate.
    pub wq_row_buffer_miss: u64,
    /// Write admissions rejected because the write queue was full.
    pub wq_full: u64,

    /// Scheduling attempts that claimed an idle bank.
    pub bank_access_success: u64,
    /// Scheduling attempts that found the target bank busy.
    pub bank_access_fail: u64,

    /// Requests that completed their bus transfer in this window.
    pub total_access: u64,
    /// Summed admission-to-bank-scheduled latency over completed requests.
    pub total_initiate_latency: u64,
    /// Summed bank-scheduled-to-bus-active latency over completed requests.
    pub total_bank_latency: u64,
    /// Summed bus-active-to-completion latency over completed requests.
    pub total_active_latency: u64,
}

impl DramStats {
    /// Creates a zeroed statistics window with the given report label.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Zeroes every counter, keeping the label.
    ///
    /// Called on the ROI window at the warmup-to-ROI transition.
    pub fn reset(&mut self) {
        let name = std::mem::take(&mut self.name);
        *self = Self::new(name);
    }

    /// Mean admission-to-bank-scheduled latency in cycles.
    pub fn avg_initiate_latency(&self) -> f64 {
        Self::mean(self.total_initiate_latency, self.total_access)
    }

    /// Mean bank-scheduled-to-bus-active latency in cycles.
    pub fn avg_bank_latency(&self) -> f64 {
        Self::mean(self.total_bank_latency, self.total_access)
    }

    /// Mean bus-active-to-completion latency in cycles.
    pub fn avg_active_latency(&self) -> f64 {
        Self::mean(self.total_active_latency, self.total_access)
    }

    /// Divides a total by a count, reporting zero for an empty window.
    fn mean(total: u64, count: u64) -> f64 {
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    }

    /// Prints this window to stdout in the plain report format.
    pub fn print(&self) {
        println!("{}", self.name);
        println!(
            "  rq.row_buffer          hit: {:<10} miss: {:<10} full: {}",
            self.rq_row_buffer_hit, self.rq_row_buffer_miss, self.rq_full
        );
        println!(
            "  wq.row_buffer          hit: {:<10} miss: {:<10} full: {}",
            self.wq_row_buffer_hit, self.wq_row_buffer_miss, self.wq_full
        );
        println!(
            "  bank.access            success: {:<10} fail: {}",
            self.bank_access_success, self.bank_access_fail
        );
        println!(
            "  dbus.congested         cycles: {:<10} count: {}",
            self.dbus_cycle_congested, self.dbus_count_congested
        );
        println!("  accesses               {}", self.total_access);
        println!(
            "  latency.initiate       total: {:<12} avg: {:.4}",
            self.total_initiate_latency,
            self.avg_initiate_latency()
        );
        println!(
            "  latency.bank           total: {:<12} avg: {:.4}",
            self.total_bank_latency,
            self.avg_bank_latency()
        );
        println!(
            "  latency.active         total: {:<12} avg: {:.4}",
            self.total_active_latency,
            self.avg_active_latency()
        );
    }
}
