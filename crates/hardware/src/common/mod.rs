//! Common types shared across the emulator.
//!
//! This module collects the vocabulary types used by every subsystem:
//! 1. **Access widths:** Byte/halfword/word granularity for bus and device transfers.
//! 2. **Faults and traps:** Bus faults, memory faults, device faults, and CPU trap causes.

/// Fault and trap definitions.
pub mod error;

pub use error::{BusFault, DeviceFault, LoaderError, MemFault, Trap};

/// Size of one instruction word in bytes.
pub const WORD_SIZE: u32 = 4;

/// Transfer granularity of a single bus or device access.
///
/// Matches the three access widths of the RV32I load/store instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessWidth {
    /// 8-bit access (LB/LBU/SB).
    Byte,
    /// 16-bit access (LH/LHU/SH).
    Half,
    /// 32-bit access (LW/SW and instruction fetch).
    #[default]
    Word,
}

impl AccessWidth {
    /// Returns the width in bytes (1, 2, or 4).
    #[inline]
    pub fn bytes(self) -> u32 {
        match self {
            Self::Byte => 1,
            Self::Half => 2,
            Self::Word => 4,
        }
    }

    /// Returns whether `addr` satisfies this width's alignment requirement.
    #[inline]
    pub fn is_aligned(self, addr: u32) -> bool {
        addr & (self.bytes() - 1) == 0
    }

    /// Masks `value` to the low bits covered by this width.
    #[inline]
    pub fn mask(self, value: u32) -> u32 {
        match self {
            Self::Byte => value & 0xff,
            Self::Half => value & 0xffff,
            Self::Word => value,
        }
    }
}
