//! RISC-V General-Purpose Register File.
//!
//! This module implements the General-Purpose Register (GPR) file. It performs
//! the following:
//! 1. **Storage:** Maintains 32 integer registers (`x0`-`x31`).
//! 2. **Invariant Enforcement:** Ensures that register `x0` is hardwired to zero.
//! 3. **Snapshots:** Provides whole-file copy in/out for trap entry and exit.

/// General-Purpose Register file.
///
/// Contains 32 general-purpose registers used for integer operations.
/// Register `x0` is hardwired to zero and cannot be modified.
#[derive(Clone, Debug, Default)]
pub struct Gpr {
    regs: [u32; 32],
}

impl Gpr {
    /// Creates a new register file with all registers initialized to zero.
    pub fn new() -> Self {
        Self { regs: [0; 32] }
    }

    /// Reads a general-purpose register value.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    ///
    /// # Returns
    ///
    /// The 32-bit value stored in the register. Register `x0` always returns 0.
    pub fn read(&self, idx: usize) -> u32 {
        if idx == 0 { 0 } else { self.regs[idx] }
    }

    /// Writes a value to a general-purpose register.
    ///
    /// Writes to `x0` are discarded.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    /// * `val` - The 32-bit value to write.
    pub fn write(&mut self, idx: usize, val: u32) {
        if idx != 0 {
            self.regs[idx] = val;
        }
    }

    /// Returns a copy of the whole register file.
    ///
    /// Used by trap entry to snapshot guest state before the handler runs.
    pub fn snapshot(&self) -> [u32; 32] {
        self.regs
    }

    /// Replaces the whole register file from a snapshot.
    ///
    /// Slot 0 in the snapshot is ignored so the `x0` invariant survives a
    /// corrupted snapshot.
    pub fn restore(&mut self, snapshot: &[u32; 32]) {
        self.regs = *snapshot;
        self.regs[0] = 0;
    }
}
