//! Common types shared across the memory model.
//!
//! This module collects the small building blocks used throughout the crate:
//! 1. **Addresses:** Strong physical/virtual address newtypes.
//! 2. **Errors:** Fatal configuration and deadlock error types.

/// Physical and virtual address newtypes.
pub mod addr;
/// Fatal error definitions (configuration, deadlock).
pub mod error;

pub use addr::{PhysAddr, VirtAddr};
pub use error::{ConfigError, DeadlockError};
