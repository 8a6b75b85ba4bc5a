//! Simulation Orchestration.
//!
//! Everything above the hardware model: loading guest images, bridging
//! environment calls to the host, and running N cores against one bus.
//!
//! # Structure
//!
//! - `loader`: ELF32 program-image loading into guest memory.
//! - `syscall`: The trap handler translating guest ECALLs to host operations.
//! - `simulator`: Machine construction and the multi-core run loop.

/// ELF program-image loader.
pub mod loader;

/// Machine construction and run loop.
pub mod simulator;

/// Guest system call bridge.
pub mod syscall;

pub use simulator::Simulator;
pub use syscall::SyscallBridge;
