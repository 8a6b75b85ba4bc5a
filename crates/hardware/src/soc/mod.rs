//! System-on-Chip (SoC) Components.
//!
//! Contains the shared memory subsystem of the emulated machine: the
//! permission-tracked memory, the device abstraction, the concrete devices,
//! and the bus that routes core accesses to them.
//!
//! # Structure
//!
//! - `memory`: Byte-granular permission-tracked backing store.
//! - `traits`: The `Device` trait all bus-attached components implement.
//! - `devices`: Concrete devices (RAM, ROM, mapped registers, video).
//! - `interconnect`: The bus routing addresses to devices under one lock.

/// Concrete memory-mapped devices.
pub mod devices;

/// System bus connecting cores and devices.
pub mod interconnect;

/// Permission-tracked backing memory.
pub mod memory;

/// The device trait for bus-attached components.
pub mod traits;

pub use interconnect::Bus;
pub use memory::MemoryUnit;
pub use traits::Device;
