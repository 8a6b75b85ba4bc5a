//! RISC-V Privileged Architecture Opcodes.
//!
//! Defines opcodes and full-word encodings for system instructions:
//! environment calls, breakpoints, trap returns, and CSR accesses.

/// System instruction opcode (0b1110011).
/// Used for ECALL, EBREAK, MRET, and the Zicsr instructions.
pub const OP_SYSTEM: u32 = 0b1110011;

/// CSR atomic read/write (CSRRW) funct3 value.
pub const FUNCT3_CSRRW: u32 = 0b001;

/// CSR atomic read and set bits (CSRRS) funct3 value.
pub const FUNCT3_CSRRS: u32 = 0b010;

/// CSR atomic read and clear bits (CSRRC) funct3 value.
pub const FUNCT3_CSRRC: u32 = 0b011;

/// CSRRW with a 5-bit immediate source (CSRRWI) funct3 value.
pub const FUNCT3_CSRRWI: u32 = 0b101;

/// CSRRS with a 5-bit immediate source (CSRRSI) funct3 value.
pub const FUNCT3_CSRRSI: u32 = 0b110;

/// CSRRC with a 5-bit immediate source (CSRRCI) funct3 value.
pub const FUNCT3_CSRRCI: u32 = 0b111;

/// Environment Call (ECALL) funct12 value.
/// Traps to the machine-mode handler.
pub const FUNCT12_ECALL: u32 = 0x000;

/// Environment Break (EBREAK) funct12 value.
/// Used by debuggers to cause a breakpoint trap.
pub const FUNCT12_EBREAK: u32 = 0x001;

/// Machine Return (MRET) funct12 value.
/// Returns from the M-mode trap handler.
pub const FUNCT12_MRET: u32 = 0x302;
