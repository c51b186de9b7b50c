//! Forward-progress watchdog.
//!
//! A request that sits in a queue past the cycle budget means the scheduler
//! has wedged (a bank claimed and never released, a bus grant never
//! completed). Rather than spin forever, the watchdog dumps the offending
//! channel's state and aborts the run with a [`DeadlockError`].

use crate::common::DeadlockError;
use crate::mem::channel::DramChannel;

/// Cycles a request may remain in flight before the run is declared wedged.
///
/// Generous compared to any legal service time: a worst-case request behind
/// a full queue of row misses and turnarounds still completes within a few
/// thousand cycles on default timings.
pub const CYCLE_BUDGET: u64 = 500_000;

/// Checks one channel for a request older than the cycle budget.
///
/// # Arguments
///
/// * `channel` - The channel to inspect.
/// * `index` - Channel index, reported in the error.
/// * `cycle` - Current controller cycle.
///
/// # Errors
///
/// Returns a [`DeadlockError`] naming the stuck request's admission cycle
/// after dumping the channel state through `tracing::error!`.
pub fn check_channel(
    channel: &DramChannel,
    index: usize,
    cycle: u64,
) -> Result<(), DeadlockError> {
    let Some(admitted) = channel.oldest_admission_cycle() else {
        return Ok(());
    };
    if cycle.saturating_sub(admitted) <= CYCLE_BUDGET {
        return Ok(());
    }
    channel.dump_state(cycle);
    Err(DeadlockError {
        channel: index,
        admitted,
        cycle,
    })
}
