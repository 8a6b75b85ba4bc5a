//! Multi-core RV32I emulator library.
//!
//! This crate implements a cycle-stepped multi-core RISC-V RV32I emulator
//! with the following:
//! 1. **Core:** A five-stage instruction cycle (fetch, decode, execute,
//!    memory, writeback) modeled as an explicit state machine, with a trap
//!    sub-machine and machine-mode CSRs.
//! 2. **Memory:** Byte-granular permissions (read/write/exec plus
//!    read-before-write tracking), dirty-page bookkeeping, and a bump
//!    allocator backing `brk`.
//! 3. **SoC:** An address-routed bus serializing all cores' traffic behind
//!    one lock, with RAM, ROM, mapped-register, and framebuffer devices.
//! 4. **ISA:** Bit-exact RV32I decoding and the machine-mode slice of the
//!    privileged architecture.
//! 5. **Simulation:** ELF32 loading, a guest syscall bridge, and a
//!    one-thread-per-core run loop.

/// Common types (access widths, faults, traps).
pub mod common;
/// Machine configuration (defaults, serde structures).
pub mod config;
/// Emulated core (pipeline stages, registers, CSRs, traps).
pub mod core;
/// Instruction set (decode, instruction fields, ABI, RV32I, privileged).
pub mod isa;
/// Simulation (loader, syscall bridge, run loop).
pub mod sim;
/// System-on-chip (bus, devices, permission-tracked memory).
pub mod soc;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// One emulated hardware thread.
pub use crate::core::Core;
/// Top-level machine; construct with `Simulator::new`.
pub use crate::sim::Simulator;
/// The shared system bus.
pub use crate::soc::Bus;
