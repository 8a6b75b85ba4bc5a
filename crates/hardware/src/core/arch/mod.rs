//! Architectural State.
//!
//! Core-local register state: the general-purpose register file and the
//! machine-mode CSR file. Both are owned exclusively by one core and never
//! touched from another thread.

/// Control and Status Register file.
pub mod csr;

/// General-purpose register file.
pub mod gpr;

pub use csr::Csrs;
pub use gpr::Gpr;
