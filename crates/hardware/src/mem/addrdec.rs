//! DRAM address decoder.
//!
//! This module maps physical addresses onto the DRAM topology. It provides:
//! 1. **Decoding:** Pure extraction of channel/rank/bank/row/column indices from an address.
//! 2. **Encoding:** The exact inverse, used by tests and synthetic drivers.
//! 3. **Validation:** Fatal rejection of geometries that cannot partition the address.
//!
//! The interleave order is fixed, low bits to high:
//! block offset → channel → bank → column → rank → row.
//! Consecutive blocks therefore stripe across channels first, then across
//! banks within a channel, which is what gives independent requests their
//! bank-level parallelism. Re-encoding the five fields always reproduces the
//! original address modulo bits above the row field.

use crate::common::{ConfigError, PhysAddr};
use crate::config::GeometryConfig;

/// A physical address decomposed into DRAM topology indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DramAddress {
    /// Channel index.
    pub channel: u64,
    /// Rank index within the channel.
    pub rank: u64,
    /// Bank index within the rank.
    pub bank: u64,
    /// Row index within the bank.
    pub row: u64,
    /// Column index within the row.
    pub column: u64,
}

/// Pure, deterministic address decoder for a fixed geometry.
///
/// Constructed once per controller; decoding is branch-free shift/mask work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressDecoder {
    offset_bits: u32,
    channel_bits: u32,
    bank_bits: u32,
    column_bits: u32,
    rank_bits: u32,
    row_bits: u32,
    banks_per_rank: u64,
}

impl AddressDecoder {
    /// Builds a decoder for the given geometry.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when any geometry count is not a nonzero
    /// power of two or when the combined field widths exceed 64 bits. A
    /// mapping that cannot exactly partition the address space would silently
    /// alias rows, so this fails fast at initialization.
    pub fn new(geometry: &GeometryConfig) -> Result<Self, ConfigError> {
        let fields = [
            ("channels", geometry.channels),
            ("ranks", geometry.ranks),
            ("banks", geometry.banks),
            ("rows", geometry.rows),
            ("columns", geometry.columns),
            ("block_bytes", geometry.block_bytes),
        ];
        for (field, value) in fields {
            if value == 0 || !value.is_power_of_two() {
                return Err(ConfigError::NotPowerOfTwo { field, value });
            }
        }

        let decoder = Self {
            offset_bits: geometry.block_bytes.ilog2(),
            channel_bits: geometry.channels.ilog2(),
            bank_bits: geometry.banks.ilog2(),
            column_bits: geometry.columns.ilog2(),
            rank_bits: geometry.ranks.ilog2(),
            row_bits: geometry.rows.ilog2(),
            banks_per_rank: geometry.banks,
        };

        let required = decoder.offset_bits
            + decoder.channel_bits
            + decoder.bank_bits
            + decoder.column_bits
            + decoder.rank_bits
            + decoder.row_bits;
        if required > 64 {
            return Err(ConfigError::FieldsExceedAddress {
                required,
                available: 64,
            });
        }

        Ok(decoder)
    }

    /// Extracts the channel index.
    #[inline]
    pub const fn channel(&self, addr: PhysAddr) -> u64 {
        Self::field(addr.val(), self.offset_bits, self.channel_bits)
    }

    /// Extracts the bank index within the rank.
    #[inline]
    pub const fn bank(&self, addr: PhysAddr) -> u64 {
        Self::field(
            addr.val(),
            self.offset_bits + self.channel_bits,
            self.bank_bits,
        )
    }

    /// Extracts the column index within the row.
    #[inline]
    pub const fn column(&self, addr: PhysAddr) -> u64 {
        Self::field(
            addr.val(),
            self.offset_bits + self.channel_bits + self.bank_bits,
            self.column_bits,
        )
    }

    /// Extracts the rank index within the channel.
    #[inline]
    pub const fn rank(&self, addr: PhysAddr) -> u64 {
        Self::field(
            addr.val(),
            self.offset_bits + self.channel_bits + self.bank_bits + self.column_bits,
            self.rank_bits,
        )
    }

    /// Extracts the row index within the bank.
    #[inline]
    pub const fn row(&self, addr: PhysAddr) -> u64 {
        Self::field(
            addr.val(),
            self.offset_bits
                + self.channel_bits
                + self.bank_bits
                + self.column_bits
                + self.rank_bits,
            self.row_bits,
        )
    }

    /// Decodes an address into all five topology indices.
    pub const fn decode(&self, addr: PhysAddr) -> DramAddress {
        DramAddress {
            channel: self.channel(addr),
            rank: self.rank(addr),
            bank: self.bank(addr),
            row: self.row(addr),
            column: self.column(addr),
        }
    }

    /// Recombines topology indices into a block-aligned physical address.
    ///
    /// The inverse of [`decode`](Self::decode) up to the block offset and any
    /// bits above the row field, both of which carry no topology information.
    pub const fn encode(&self, dram: DramAddress) -> PhysAddr {
        let mut addr = dram.channel << self.offset_bits;
        let mut shift = self.offset_bits + self.channel_bits;
        addr |= dram.bank << shift;
        shift += self.bank_bits;
        addr |= dram.column << shift;
        shift += self.column_bits;
        addr |= dram.rank << shift;
        shift += self.rank_bits;
        addr |= dram.row << shift;
        PhysAddr::new(addr)
    }

    /// Flattened bank index (`rank * banks_per_rank + bank`) for the
    /// per-channel bank-state array.
    #[inline]
    pub const fn flat_bank(&self, addr: PhysAddr) -> usize {
        (self.rank(addr) * self.banks_per_rank + self.bank(addr)) as usize
    }

    /// Number of block offset bits covered by the burst size.
    #[inline]
    pub const fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    /// Total address bits carrying topology information (offset included).
    #[inline]
    pub const fn mapped_bits(&self) -> u32 {
        self.offset_bits
            + self.channel_bits
            + self.bank_bits
            + self.column_bits
            + self.rank_bits
            + self.row_bits
    }

    /// Extracts `bits` wide field starting at `shift`.
    #[inline]
    const fn field(addr: u64, shift: u32, bits: u32) -> u64 {
        if bits == 0 {
            return 0;
        }
        (addr >> shift) & ((1 << bits) - 1)
    }
}
