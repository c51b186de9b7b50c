//! Physical and Virtual Address types.
//!
//! This module defines strong types for physical and virtual addresses to prevent
//! accidental mixing of address spaces. It provides the following:
//! 1. **Type Safety:** Distinguishes between the translated and program-visible address spaces at compile time.
//! 2. **Address Manipulation:** Provides helper methods for extracting block offsets and raw values.
//! 3. **Decoder Integration:** Acts as the primary input type for DRAM address decoding.

/// A virtual address as issued by the simulated program.
///
/// Virtual addresses travel alongside requests for bookkeeping (prefetcher
/// training, trace correlation) but are never decoded by the controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtAddr(pub u64);

/// A physical address in the simulated memory space.
///
/// Physical addresses are what the address decoder slices into
/// channel/rank/bank/row/column indices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysAddr(pub u64);

impl VirtAddr {
    /// Creates a new virtual address from a raw 64-bit value.
    ///
    /// # Arguments
    ///
    /// * `addr` - The raw 64-bit address value.
    ///
    /// # Returns
    ///
    /// A new `VirtAddr` instance wrapping the provided address.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub const fn val(&self) -> u64 {
        self.0
    }
}

impl PhysAddr {
    /// Creates a new physical address from a raw 64-bit value.
    ///
    /// # Arguments
    ///
    /// * `addr` - The raw 64-bit address value.
    ///
    /// # Returns
    ///
    /// A new `PhysAddr` instance wrapping the provided address.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub const fn val(&self) -> u64 {
        self.0
    }

    /// Returns the address with the block offset bits cleared.
    ///
    /// Two requests target the same memory block exactly when their aligned
    /// addresses compare equal; admission coalescing uses this comparison.
    ///
    /// # Arguments
    ///
    /// * `block_bits` - Number of low offset bits covered by one block.
    #[inline]
    pub const fn block_aligned(&self, block_bits: u32) -> Self {
        Self(self.0 >> block_bits << block_bits)
    }
}

impl std::fmt::Display for PhysAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl std::fmt::Display for VirtAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
