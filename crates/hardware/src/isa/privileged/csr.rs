//! RISC-V Control and Status Register (CSR) Addresses.
//!
//! Defines the 12-bit addresses of the machine-mode CSRs the emulator
//! implements, plus their architectural reset values.

/// Machine status register.
pub const MSTATUS: u32 = 0x300;
/// Machine ISA register (read-only in this implementation).
pub const MISA: u32 = 0x301;
/// Machine interrupt-enable register.
pub const MIE: u32 = 0x304;
/// Machine trap-handler base address.
pub const MTVEC: u32 = 0x305;
/// Machine scratch register.
pub const MSCRATCH: u32 = 0x340;
/// Machine exception program counter.
pub const MEPC: u32 = 0x341;
/// Machine trap cause.
pub const MCAUSE: u32 = 0x342;
/// Machine bad address or instruction.
pub const MTVAL: u32 = 0x343;
/// Machine interrupt-pending register.
pub const MIP: u32 = 0x344;
/// Machine vendor ID (read-only).
pub const MVENDORID: u32 = 0xF11;
/// Machine architecture ID (read-only).
pub const MARCHID: u32 = 0xF12;
/// Machine implementation ID (read-only).
pub const MIMPID: u32 = 0xF13;
/// Hardware thread ID (read-only).
pub const MHARTID: u32 = 0xF14;

/// Reset value of `misa`: MXL=1 (32-bit) with the I extension bit set.
pub const MISA_RV32I: u32 = (1 << 30) | (1 << 8);

/// Reset value of `mie`: machine software, timer, and external interrupt
/// enables set. Interrupts are never delivered, so this is data only.
pub const MIE_RESET: u32 = 0x888;
