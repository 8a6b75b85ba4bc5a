//! RISC-V Privileged Architecture Definitions.
//!
//! Covers the machine-mode slice of the privileged specification the emulator
//! implements: system instruction encodings and CSR addresses.

/// Control and Status Register (CSR) address definitions.
pub mod csr;

/// System instruction opcodes and encodings.
pub mod opcodes;
