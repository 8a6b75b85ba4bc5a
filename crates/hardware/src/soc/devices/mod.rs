//! Memory-Mapped Devices.
//!
//! Concrete implementations of the [`Device`](crate::soc::traits::Device)
//! trait:
//!
//! - `ram`: General-purpose memory with per-byte permissions.
//! - `rom`: Read-only memory for the boot image.
//! - `mapped_register`: A single word-sized register with access hooks.
//! - `video`: A framebuffer with dirty-region presentation.

/// Word-sized register device with read/write hooks.
pub mod mapped_register;

/// General-purpose RAM device.
pub mod ram;

/// Read-only memory device.
pub mod rom;

/// Framebuffer device.
pub mod video;

pub use mapped_register::MappedRegisterDevice;
pub use ram::RamDevice;
pub use rom::RomDevice;
pub use video::VideoDevice;
