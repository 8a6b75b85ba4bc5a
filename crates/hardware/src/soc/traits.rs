//! Device trait for memory-mapped I/O.
//!
//! This module defines the `Device` trait implemented by all bus-attached
//! components. It provides:
//! 1. **Identification:** `name` and `address_range` for bus routing.
//! 2. **Access:** Width-parameterized read/write/fetch at device-relative
//!    offsets, plus vectorized multi-unit transfers reporting how much they
//!    moved.
//! 3. **Coarse permissions:** A device-level permission mask checked by the
//!    bus before any access is delegated, independent of the per-byte map a
//!    RAM-backed device may keep.
//! 4. **Downcasting:** An optional cast to `MemoryUnit` so the loader and the
//!    `brk` system call can reach RAM's permission map and allocator.
//!
//! All implementors must be `Send` so the shared bus can be used from one
//! hart thread per core.

use crate::common::{AccessWidth, DeviceFault};
use crate::soc::memory::{MemoryUnit, PERM_EXEC, PERM_READ, PERM_WRITE};

/// Trait for memory-mapped I/O devices attached to the system bus.
///
/// Devices provide a name, an address range, and fallible read/write methods.
/// All offsets are device-relative; the bus performs the address-to-device
/// translation and alignment checks before calling in. Construction doubles
/// as initialization: a device handed to the bus is ready for traffic.
pub trait Device: Send {
    /// Returns a short name for this device (e.g., `"RAM0"`, `"ROM"`).
    fn name(&self) -> &str;

    /// Returns (base_address, size_in_bytes) for this device's region.
    fn address_range(&self) -> (u32, u32);

    /// Returns the device-level permission mask.
    ///
    /// The bus checks the relevant bit before delegating an access, so a
    /// read-only or non-executable device rejects traffic without per-byte
    /// bookkeeping. Per-byte maps can only narrow this further.
    fn permissions(&self) -> u8 {
        PERM_READ | PERM_WRITE | PERM_EXEC
    }

    /// Reads a value of the given width at the device-relative offset.
    fn read(&mut self, offset: u32, width: AccessWidth) -> Result<u32, DeviceFault>;

    /// Writes a value of the given width at the device-relative offset.
    ///
    /// Only the low bits covered by `width` are significant.
    fn write(&mut self, offset: u32, width: AccessWidth, value: u32) -> Result<(), DeviceFault>;

    /// Reads one instruction word for fetch.
    ///
    /// Devices backed by permission-tracked memory enforce execute permission
    /// here; the default treats fetch like an ordinary word read.
    fn fetch(&mut self, offset: u32) -> Result<u32, DeviceFault> {
        self.read(offset, AccessWidth::Word)
    }

    /// Reads up to `buf.len()` bytes starting at `offset`.
    ///
    /// Stops at the first byte that faults and returns the number of bytes
    /// transferred before it; a fault on the very first byte is returned as
    /// an error instead.
    fn read_multi(&mut self, offset: u32, buf: &mut [u8]) -> Result<u32, DeviceFault> {
        for (i, slot) in buf.iter_mut().enumerate() {
            match self.read(offset + i as u32, AccessWidth::Byte) {
                Ok(value) => *slot = value as u8,
                Err(fault) if i == 0 => return Err(fault),
                Err(_) => return Ok(i as u32),
            }
        }
        Ok(buf.len() as u32)
    }

    /// Writes up to `data.len()` bytes starting at `offset`.
    ///
    /// Same partial-transfer contract as [`read_multi`](Self::read_multi):
    /// the count of bytes written before the first fault, or an error when
    /// nothing could be written.
    fn write_multi(&mut self, offset: u32, data: &[u8]) -> Result<u32, DeviceFault> {
        for (i, byte) in data.iter().enumerate() {
            match self.write(offset + i as u32, AccessWidth::Byte, u32::from(*byte)) {
                Ok(()) => {}
                Err(fault) if i == 0 => return Err(fault),
                Err(_) => return Ok(i as u32),
            }
        }
        Ok(data.len() as u32)
    }

    /// Fetches up to `words.len()` consecutive instruction words.
    ///
    /// Same partial-transfer contract as the byte transfers, counted in
    /// words. Backs the core's prefetch refill.
    fn fetch_multi(&mut self, offset: u32, words: &mut [u32]) -> Result<u32, DeviceFault> {
        for (i, slot) in words.iter_mut().enumerate() {
            match self.fetch(offset + (i as u32) * 4) {
                Ok(word) => *slot = word,
                Err(fault) if i == 0 => return Err(fault),
                Err(_) => return Ok(i as u32),
            }
        }
        Ok(words.len() as u32)
    }

    /// Returns the backing `MemoryUnit` if this device is RAM; otherwise `None`.
    fn as_memory_mut(&mut self) -> Option<&mut MemoryUnit> {
        None
    }
}
