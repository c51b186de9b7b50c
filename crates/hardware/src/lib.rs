//! Cycle-level DRAM memory-controller model.
//!
//! This crate implements the main-memory timing backend of a cycle-stepped
//! architecture simulator with the following:
//! 1. **Decoding:** Channel/rank/bank/row/column address mapping, validated at construction.
//! 2. **Admission:** Bounded read/write queues with forwarding, coalescing, and merging.
//! 3. **Scheduling:** Per-bank row-buffer state machines and a shared data bus
//!    with write-drain hysteresis and turnaround costs.
//! 4. **Statistics:** Parallel free-running and region-of-interest windows per channel.
//! 5. **Simulation:** A clock-scale driver and a forward-progress watchdog.

/// Common types (addresses, fatal errors).
pub mod common;
/// Model configuration (defaults, hierarchical config structures, validation).
pub mod config;
/// The memory subsystem (decoder, queues, banks, channels, controller).
pub mod mem;
/// Simulation driving (clock-domain stepping).
pub mod sim;
/// Per-channel statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// The multi-channel controller; construct with `MemoryController::new`.
pub use crate::mem::MemoryController;
/// Collaborator-facing submission/return channel.
pub use crate::mem::UpstreamChannel;
/// Clock-scale driver stepping the controller from an external clock.
pub use crate::sim::Simulator;
