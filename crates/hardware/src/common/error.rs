//! Fatal error definitions for the memory-controller model.
//!
//! This module defines the two non-recoverable failure classes of the core. It provides:
//! 1. **Configuration Errors:** Raised at construction when geometry or timing parameters are unusable.
//! 2. **Deadlock Errors:** Raised at runtime when a request makes no progress past the cycle budget.
//!
//! Recoverable conditions (a full admission queue) are *not* errors: admission
//! returns `false` synchronously and the caller retries on a later cycle.

use thiserror::Error;

/// Fatal configuration errors detected before any channel state is built.
///
/// A misconfigured address mapping would silently truncate addresses at
/// runtime, so construction fails fast instead.
// No `Eq`: the clock-scale variant carries an `f64`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A geometry field count is zero or not a power of two.
    ///
    /// Every decoded field occupies an exact number of address bits, which
    /// requires power-of-two channel/rank/bank/row/column counts.
    #[error("geometry field `{field}` must be a nonzero power of two, got {value}")]
    NotPowerOfTwo {
        /// Name of the offending configuration field.
        field: &'static str,
        /// The rejected value.
        value: u64,
    },

    /// The combined bit widths of all decoded fields exceed the address width.
    #[error("address fields need {required} bits but only {available} are available")]
    FieldsExceedAddress {
        /// Total bits required by offset + channel + bank + column + rank + row.
        required: u32,
        /// Bits available in a physical address.
        available: u32,
    },

    /// A queue capacity of zero would make every admission fail forever.
    #[error("queue `{queue}` must have nonzero capacity")]
    EmptyQueue {
        /// Name of the offending queue.
        queue: &'static str,
    },

    /// The clock scale must be positive for the controller to ever tick.
    #[error("clock scale must be positive, got {0}")]
    NonPositiveClockScale(f64),
}

/// Fatal runtime error: a request exceeded the progress cycle budget.
///
/// A deadlock is a logic or configuration bug in the surrounding model, never
/// a transient condition; the enclosing simulation run must abort. The
/// per-channel diagnostic state is dumped through `tracing` before this is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "deadlock: channel {channel} request admitted at cycle {admitted} still in flight at cycle {cycle}"
)]
pub struct DeadlockError {
    /// Index of the channel holding the stuck request.
    pub channel: usize,
    /// Cycle at which the stuck request was admitted.
    pub admitted: u64,
    /// Cycle at which the budget breach was detected.
    pub cycle: u64,
}
