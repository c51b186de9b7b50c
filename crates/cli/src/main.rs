//! DRAM timing-model CLI.
//!
//! This binary drives the memory controller with synthetic traffic. It performs:
//! 1. **Configuration:** Load a JSON config file or fall back to the built-in defaults.
//! 2. **Traffic generation:** Issue a random or streaming mix of reads and writes
//!    through an upstream channel, with backpressure respected.
//! 3. **Reporting:** Print the per-channel statistics for the whole run and for
//!    the post-warmup region of interest.

use std::{fs, process};

use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use dram_core::config::Config;
use dram_core::mem::UpstreamChannel;
use dram_core::mem::upstream::{read_of, write_of};
use dram_core::sim::Simulator;

#[derive(Parser, Debug)]
#[command(
    name = "sim",
    author,
    version,
    about = "Cycle-level DRAM memory-controller simulator",
    long_about = "Drive the DRAM timing model with synthetic traffic.\n\nExamples:\n  sim --requests 100000 --read-fraction 0.7\n  sim -c configs/ddr4.json --pattern stream\n  sim --warmup 10000 --seed 42"
)]
struct Cli {
    /// JSON configuration file (built-in defaults when omitted).
    #[arg(short, long)]
    config: Option<String>,

    /// Driver ticks to run before giving up on outstanding traffic.
    #[arg(long, default_value_t = 10_000_000)]
    ticks: u64,

    /// Total requests to issue.
    #[arg(long, default_value_t = 100_000)]
    requests: u64,

    /// Fraction of requests that are reads.
    #[arg(long, default_value_t = 0.7)]
    read_fraction: f64,

    /// Requests issued at the start of warmup that do not count toward
    /// the region of interest.
    #[arg(long, default_value_t = 0)]
    warmup: u64,

    /// Address pattern of the synthetic stream.
    #[arg(long, value_enum, default_value_t = Pattern::Random)]
    pattern: Pattern,

    /// Seed for the traffic generator.
    #[arg(long, default_value_t = 0xDEAD_BEEF)]
    seed: u64,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Pattern {
    /// Uniform random blocks over the whole device.
    Random,
    /// Sequential blocks, wrapping at the device size.
    Stream,
}

/// Synthetic request stream over the device address space.
struct Traffic {
    rng: StdRng,
    pattern: Pattern,
    read_fraction: f64,
    block_bytes: u64,
    blocks: u64,
    next_block: u64,
    remaining: u64,
}

impl Traffic {
    fn new(cli: &Cli, size: u64, block_bytes: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(cli.seed),
            pattern: cli.pattern,
            read_fraction: cli.read_fraction,
            block_bytes,
            blocks: size / block_bytes,
            next_block: 0,
            remaining: cli.requests,
        }
    }

    /// Produces the next (address, is_read) pair, if any remain.
    fn next_access(&mut self) -> Option<(u64, bool)> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let block = match self.pattern {
            Pattern::Random => self.rng.random_range(0..self.blocks),
            Pattern::Stream => {
                let block = self.next_block;
                self.next_block = (self.next_block + 1) % self.blocks;
                block
            }
        };
        let is_read = self.rng.random_bool(self.read_fraction);
        Some((block * self.block_bytes, is_read))
    }
}

fn load_config(path: Option<&str>) -> Result<Config, String> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = fs::read_to_string(path).map_err(|e| format!("cannot read {path}: {e}"))?;
    serde_json::from_str(&text).map_err(|e| format!("cannot parse {path}: {e}"))
}

fn run(cli: &Cli) -> Result<(), String> {
    let config = load_config(cli.config.as_deref())?;

    let upstream = UpstreamChannel::new();
    let mut sim = Simulator::new(&config, vec![upstream.clone()])
        .map_err(|e| format!("invalid configuration: {e}"))?;

    let size = sim.controller().size();
    tracing::info!(
        size_mib = size / 1024 / 1024,
        channels = config.geometry.channels,
        "device configured"
    );

    if !(0.0..=1.0).contains(&cli.read_fraction) {
        return Err(format!(
            "read fraction must be in [0, 1], got {}",
            cli.read_fraction
        ));
    }

    let mut traffic = Traffic::new(cli, size, config.geometry.block_bytes);
    let mut issued = 0u64;
    let mut reads_issued = 0u64;
    let mut reads_answered = 0u64;
    let mut roi_started = cli.warmup == 0;
    if roi_started {
        sim.controller_mut().begin_roi();
    }

    // Keep a shallow submission backlog so admission backpressure, not the
    // generator, paces the controller.
    const BACKLOG: usize = 8;

    for _ in 0..cli.ticks {
        {
            let mut channel = upstream.borrow_mut();
            while channel.rq.len() + channel.wq.len() < BACKLOG {
                let Some((address, is_read)) = traffic.next_access() else {
                    break;
                };
                if is_read {
                    channel.submit_read(read_of(address));
                    reads_issued += 1;
                } else {
                    channel.submit_write(write_of(address, address));
                }
                issued += 1;
            }
            while channel.pop_response().is_some() {
                reads_answered += 1;
            }
        }

        if !roi_started && issued >= cli.warmup {
            sim.controller_mut().begin_roi();
            roi_started = true;
            tracing::info!(issued, "warmup complete");
        }

        let _ = sim.tick().map_err(|e| e.to_string())?;

        // Stop once everything issued has drained out of the model.
        if issued == cli.requests {
            let submissions_pending = {
                let channel = upstream.borrow();
                !channel.rq.is_empty() || !channel.wq.is_empty()
            };
            let in_flight = sim
                .controller()
                .channels()
                .iter()
                .any(|ch| ch.rq_occupancy() + ch.wq_occupancy() > 0);
            if !submissions_pending && !in_flight {
                break;
            }
        }
    }
    println!("=== run ({} cycles) ===", sim.cycle());
    sim.controller().print_stats();
    println!("=== region of interest ===");
    sim.controller().print_roi_stats();
    println!(
        "issued: {issued}  reads: {reads_issued}  answered: {reads_answered}"
    );
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(message) = run(&cli) {
        eprintln!("error: {message}");
        process::exit(1);
    }
}
