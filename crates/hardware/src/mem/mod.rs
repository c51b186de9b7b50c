//! The DRAM memory subsystem.
//!
//! This module contains the full timing model of the main-memory backend:
//! 1. **Decoding:** [`addrdec`] slices physical addresses into topology indices.
//! 2. **Admission:** [`queue`] and [`request`] hold in-flight accesses in
//!    fixed slot storage; [`upstream`] carries collaborator submissions.
//! 3. **Scheduling:** [`bank`] and [`channel`] model the per-bank row buffers
//!    and the shared data bus; [`controller`] runs the per-cycle protocol.
//! 4. **Safety net:** [`deadlock`] aborts runs that stop making progress.

pub mod addrdec;
pub mod bank;
pub mod channel;
pub mod controller;
pub mod deadlock;
pub mod queue;
pub mod request;
pub mod upstream;

pub use addrdec::{AddressDecoder, DramAddress};
pub use channel::DramChannel;
pub use controller::MemoryController;
pub use request::{InstrHandle, Request, Response, ResponseSink};
pub use upstream::{UpstreamChannel, UpstreamRequest};
