//! General-Purpose RAM Device.
//!
//! Wraps a [`MemoryUnit`] and maps it at a guest base address. All accesses
//! are little-endian and permission-checked by the backing memory.

use crate::common::{AccessWidth, DeviceFault};
use crate::soc::memory::MemoryUnit;
use crate::soc::traits::Device;

/// A RAM region backed by permission-tracked memory.
pub struct RamDevice {
    name: String,
    base: u32,
    memory: MemoryUnit,
}

impl RamDevice {
    /// Creates a RAM device of `size` bytes mapped at `base`.
    ///
    /// All bytes start writable with read-before-write tracking armed; the
    /// loader reshapes regions as it places segments, and the allocator
    /// arms heap blocks on demand.
    pub fn new(name: impl Into<String>, base: u32, size: u32) -> Self {
        Self {
            name: name.into(),
            base,
            memory: MemoryUnit::new(size),
        }
    }
}

impl Device for RamDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn address_range(&self) -> (u32, u32) {
        (self.base, self.memory.len())
    }

    fn read(&mut self, offset: u32, width: AccessWidth) -> Result<u32, DeviceFault> {
        let mut buf = [0u8; 4];
        let n = width.bytes() as usize;
        self.memory.read(offset, &mut buf[..n])?;
        Ok(u32::from_le_bytes(buf))
    }

    fn write(&mut self, offset: u32, width: AccessWidth, value: u32) -> Result<(), DeviceFault> {
        let bytes = value.to_le_bytes();
        let n = width.bytes() as usize;
        self.memory.write(offset, &bytes[..n])?;
        Ok(())
    }

    fn fetch(&mut self, offset: u32) -> Result<u32, DeviceFault> {
        let mut buf = [0u8; 4];
        self.memory.fetch(offset, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn as_memory_mut(&mut self) -> Option<&mut MemoryUnit> {
        Some(&mut self.memory)
    }
}
