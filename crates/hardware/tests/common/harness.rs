//! Test bench wiring a controller to one synthetic upstream channel.

use std::cell::RefCell;
use std::rc::Rc;

use dram_core::config::Config;
use dram_core::mem::upstream::{read_of, write_of, UpstreamChannel};
use dram_core::mem::{MemoryController, Response};
use dram_core::stats::DramStats;

/// Installs the test tracing subscriber; later calls are no-ops.
///
/// Scheduling traces show up in failing tests via `RUST_LOG=trace`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A controller, one upstream channel, and a cycle counter.
pub struct TestBench {
    pub mc: MemoryController,
    pub upstream: Rc<RefCell<UpstreamChannel>>,
    pub cycle: u64,
}

impl TestBench {
    /// Builds a bench for the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid; bench configs are fixed in
    /// the tests, so a failure here is a test bug.
    pub fn new(config: &Config) -> Self {
        init_tracing();
        let upstream = UpstreamChannel::new();
        let mc = MemoryController::new(config, vec![Rc::clone(&upstream)])
            .expect("bench config must validate");
        Self {
            mc,
            upstream,
            cycle: 0,
        }
    }

    /// Queues a read submission for the next drain.
    pub fn submit_read(&self, address: u64) {
        self.upstream.borrow_mut().submit_read(read_of(address));
    }

    /// Queues a write submission for the next drain.
    pub fn submit_write(&self, address: u64, data: u64) {
        self.upstream.borrow_mut().submit_write(write_of(address, data));
    }

    /// Runs one controller cycle.
    ///
    /// # Panics
    ///
    /// Panics on a deadlock report; no bench workload should ever wedge.
    pub fn step(&mut self) -> u64 {
        let progress = self
            .mc
            .operate(self.cycle)
            .expect("bench workload must make progress");
        self.cycle += 1;
        progress
    }

    /// Runs the given number of controller cycles.
    pub fn run(&mut self, cycles: u64) -> u64 {
        (0..cycles).map(|_| self.step()).sum()
    }

    /// Runs until `count` responses have arrived, up to `limit` cycles.
    ///
    /// Returns the cycle on which the count was reached.
    ///
    /// # Panics
    ///
    /// Panics when the limit is hit first.
    pub fn run_until_responses(&mut self, count: usize, limit: u64) -> u64 {
        while self.cycle < limit {
            let _ = self.step();
            if self.upstream.borrow().returned.borrow().len() >= count {
                return self.cycle - 1;
            }
        }
        panic!("no {count} responses within {limit} cycles");
    }

    /// Drains and returns every response received so far.
    pub fn responses(&mut self) -> Vec<Response> {
        let upstream = self.upstream.borrow_mut();
        let mut returned = upstream.returned.borrow_mut();
        returned.drain(..).collect()
    }

    /// Free-running statistics of channel 0.
    pub fn stats(&self) -> &DramStats {
        &self.mc.channels()[0].sim_stats
    }
}

/// A geometry small enough to reason about by hand: one channel, one rank,
/// eight banks, and shallow queues. Timing keeps the defaults
/// (tRP = tRCD = tCAS = 12, bus 4, turnaround 8).
pub fn small_config() -> Config {
    let mut config = Config::default();
    config.geometry.rows = 1024;
    config.queues.rq_size = 8;
    config.queues.wq_size = 8;
    config
}
