//! Configuration system for the DRAM timing model.
//!
//! This module defines all configuration structures used to parameterize the
//! memory controller. It provides:
//! 1. **Defaults:** Baseline hardware constants (geometry, timings, queue depths).
//! 2. **Structures:** Hierarchical config for general, geometry, timing, and queues.
//! 3. **Validation:** The fatal initialization gate for address-mapping mistakes.
//!
//! Configuration is supplied via JSON (`serde_json`) or use `Config::default()`.

use serde::Deserialize;

use crate::common::ConfigError;

/// Default configuration constants for the memory model.
///
/// These values define the baseline hardware configuration when not
/// explicitly overridden in a JSON configuration.
mod defaults {
    /// Number of independent DRAM channels.
    pub const CHANNELS: u64 = 1;

    /// Number of ranks per channel.
    pub const RANKS: u64 = 1;

    /// Number of banks per rank.
    pub const BANKS: u64 = 8;

    /// Number of rows per bank.
    pub const ROWS: u64 = 65_536;

    /// Number of columns per row.
    pub const COLUMNS: u64 = 128;

    /// Memory block (burst) size in bytes.
    ///
    /// Matches the cache line size of the upstream hierarchy; one request
    /// transfers exactly one block.
    pub const BLOCK_BYTES: u64 = 64;

    /// Row precharge latency (tRP) in controller cycles.
    pub const T_RP: u64 = 12;

    /// Row-to-column (activate) latency (tRCD) in controller cycles.
    pub const T_RCD: u64 = 12;

    /// Column access latency (tCAS) in controller cycles.
    pub const T_CAS: u64 = 12;

    /// Data-bus direction turnaround penalty in controller cycles.
    ///
    /// Charged whenever consecutive bus grants change direction
    /// (read-to-write or write-to-read).
    pub const DBUS_TURNAROUND: u64 = 8;

    /// Data-bus occupancy per transfer in controller cycles.
    ///
    /// One block at the configured bus width; the bus is held for this long
    /// on every grant.
    pub const DBUS_RETURN: u64 = 4;

    /// Read queue capacity per channel.
    pub const RQ_SIZE: usize = 64;

    /// Write queue capacity per channel.
    pub const WQ_SIZE: usize = 64;

    /// Controller clock scale relative to the driving simulator clock.
    pub const CLOCK_SCALE: f64 = 1.0;
}

/// Root configuration structure containing all memory-model settings.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use dram_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.queues.rq_size, 64);
/// config.validate().unwrap();
/// ```
///
/// Deserializing from JSON:
///
/// ```
/// use dram_core::config::Config;
///
/// let json = r#"{
///     "general": { "clock_scale": 1.5, "idle_memory": false },
///     "geometry": {
///         "channels": 2,
///         "ranks": 2,
///         "banks": 8,
///         "rows": 32768,
///         "columns": 128,
///         "block_bytes": 64
///     },
///     "timing": {
///         "t_rp": 14,
///         "t_rcd": 14,
///         "t_cas": 14,
///         "dbus_turnaround": 8,
///         "dbus_return": 4
///     },
///     "queues": { "rq_size": 64, "wq_size": 64 }
/// }"#;
///
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.geometry.channels, 2);
/// assert_eq!(config.timing.t_cas, 14);
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General model settings (clock scale, idle-memory shortcut).
    #[serde(default)]
    pub general: GeneralConfig,
    /// DRAM topology: channels, ranks, banks, rows, columns, block size.
    #[serde(default)]
    pub geometry: GeometryConfig,
    /// Latency parameters in controller cycles.
    #[serde(default)]
    pub timing: TimingConfig,
    /// Admission queue capacities.
    #[serde(default)]
    pub queues: QueueConfig,
}

impl Config {
    /// Checks that the configuration describes a usable memory device.
    ///
    /// A mapping whose field widths do not fit the address space would
    /// silently alias addresses at runtime; this is treated as a fatal
    /// initialization error, never a runtime one.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any geometry count is not a nonzero power
    /// of two, if the combined field widths exceed 64 bits, if a queue has
    /// zero capacity, or if the clock scale is not positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("channels", self.geometry.channels),
            ("ranks", self.geometry.ranks),
            ("banks", self.geometry.banks),
            ("rows", self.geometry.rows),
            ("columns", self.geometry.columns),
            ("block_bytes", self.geometry.block_bytes),
        ];
        for (field, value) in fields {
            if value == 0 || !value.is_power_of_two() {
                return Err(ConfigError::NotPowerOfTwo { field, value });
            }
        }

        let required: u32 = fields.iter().map(|(_, v)| v.ilog2()).sum();
        if required > 64 {
            return Err(ConfigError::FieldsExceedAddress {
                required,
                available: 64,
            });
        }

        if self.queues.rq_size == 0 {
            return Err(ConfigError::EmptyQueue { queue: "rq" });
        }
        if self.queues.wq_size == 0 {
            return Err(ConfigError::EmptyQueue { queue: "wq" });
        }

        if !self.general.clock_scale.is_finite() || self.general.clock_scale <= 0.0 {
            return Err(ConfigError::NonPositiveClockScale(
                self.general.clock_scale,
            ));
        }

        Ok(())
    }
}

/// General model settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Controller clock scale relative to the driving simulator clock.
    ///
    /// A scale of 1.5 means the controller ticks three times for every two
    /// driver ticks; fractional progress is accumulated by the driver.
    #[serde(default = "GeneralConfig::default_clock_scale")]
    pub clock_scale: f64,

    /// Idle-memory shortcut.
    ///
    /// When set, a request scheduled while no other queue slot in its channel
    /// is occupied is charged the row-hit path only, modeling an idealized
    /// idle device. Contended behavior is unchanged.
    #[serde(default)]
    pub idle_memory: bool,
}

impl GeneralConfig {
    /// Returns the default controller clock scale.
    fn default_clock_scale() -> f64 {
        defaults::CLOCK_SCALE
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            clock_scale: defaults::CLOCK_SCALE,
            idle_memory: false,
        }
    }
}

/// DRAM topology configuration.
///
/// All counts must be nonzero powers of two; [`Config::validate`] enforces
/// this before any channel state is built.
#[derive(Debug, Clone, Deserialize)]
pub struct GeometryConfig {
    /// Number of independent channels, each with its own queues and bus.
    #[serde(default = "GeometryConfig::default_channels")]
    pub channels: u64,

    /// Ranks per channel.
    #[serde(default = "GeometryConfig::default_ranks")]
    pub ranks: u64,

    /// Banks per rank.
    #[serde(default = "GeometryConfig::default_banks")]
    pub banks: u64,

    /// Rows per bank.
    #[serde(default = "GeometryConfig::default_rows")]
    pub rows: u64,

    /// Columns per row.
    #[serde(default = "GeometryConfig::default_columns")]
    pub columns: u64,

    /// Block (burst) size in bytes.
    #[serde(default = "GeometryConfig::default_block_bytes")]
    pub block_bytes: u64,
}

impl GeometryConfig {
    /// Returns the default channel count.
    fn default_channels() -> u64 {
        defaults::CHANNELS
    }

    /// Returns the default rank count per channel.
    fn default_ranks() -> u64 {
        defaults::RANKS
    }

    /// Returns the default bank count per rank.
    fn default_banks() -> u64 {
        defaults::BANKS
    }

    /// Returns the default row count per bank.
    fn default_rows() -> u64 {
        defaults::ROWS
    }

    /// Returns the default column count per row.
    fn default_columns() -> u64 {
        defaults::COLUMNS
    }

    /// Returns the default block size in bytes.
    fn default_block_bytes() -> u64 {
        defaults::BLOCK_BYTES
    }
}

impl Default for GeometryConfig {
    /// Creates a default geometry: one channel, one rank, eight banks.
    fn default() -> Self {
        Self {
            channels: defaults::CHANNELS,
            ranks: defaults::RANKS,
            banks: defaults::BANKS,
            rows: defaults::ROWS,
            columns: defaults::COLUMNS,
            block_bytes: defaults::BLOCK_BYTES,
        }
    }
}

/// Latency parameters, all in controller cycles.
#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    /// Row precharge latency (tRP).
    #[serde(default = "TimingConfig::default_t_rp")]
    pub t_rp: u64,

    /// Row-to-column delay (tRCD).
    #[serde(default = "TimingConfig::default_t_rcd")]
    pub t_rcd: u64,

    /// Column access latency (tCAS).
    #[serde(default = "TimingConfig::default_t_cas")]
    pub t_cas: u64,

    /// Bus direction turnaround penalty.
    #[serde(default = "TimingConfig::default_dbus_turnaround")]
    pub dbus_turnaround: u64,

    /// Bus occupancy per block transfer.
    #[serde(default = "TimingConfig::default_dbus_return")]
    pub dbus_return: u64,
}

impl TimingConfig {
    /// Returns the default row precharge latency.
    fn default_t_rp() -> u64 {
        defaults::T_RP
    }

    /// Returns the default row-to-column delay.
    fn default_t_rcd() -> u64 {
        defaults::T_RCD
    }

    /// Returns the default column access latency.
    fn default_t_cas() -> u64 {
        defaults::T_CAS
    }

    /// Returns the default bus turnaround penalty.
    fn default_dbus_turnaround() -> u64 {
        defaults::DBUS_TURNAROUND
    }

    /// Returns the default bus occupancy per transfer.
    fn default_dbus_return() -> u64 {
        defaults::DBUS_RETURN
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            t_rp: defaults::T_RP,
            t_rcd: defaults::T_RCD,
            t_cas: defaults::T_CAS,
            dbus_turnaround: defaults::DBUS_TURNAROUND,
            dbus_return: defaults::DBUS_RETURN,
        }
    }
}

/// Admission queue capacities.
///
/// Capacities are fixed at construction and never resized; the bank scheduler
/// holds stable slot indices into these queues while requests are in flight.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// Read queue capacity per channel.
    #[serde(default = "QueueConfig::default_rq_size")]
    pub rq_size: usize,

    /// Write queue capacity per channel.
    #[serde(default = "QueueConfig::default_wq_size")]
    pub wq_size: usize,
}

impl QueueConfig {
    /// Returns the default read queue capacity.
    fn default_rq_size() -> usize {
        defaults::RQ_SIZE
    }

    /// Returns the default write queue capacity.
    fn default_wq_size() -> usize {
        defaults::WQ_SIZE
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            rq_size: defaults::RQ_SIZE,
            wq_size: defaults::WQ_SIZE,
        }
    }
}
