//! Read-Only Memory Device.
//!
//! Holds the boot image. The device rejects all writes at the device level,
//! before any per-byte bookkeeping, so the backing bytes never need a
//! permission map: everything is readable and executable, nothing is
//! writable.

use crate::common::{AccessWidth, DeviceFault, MemFault};
use crate::soc::memory::{PERM_EXEC, PERM_READ};
use crate::soc::traits::Device;

/// A read-only region mapped at a guest base address.
pub struct RomDevice {
    name: String,
    base: u32,
    data: Vec<u8>,
}

impl RomDevice {
    /// Creates a ROM device at `base` containing `image`, padded with zeros
    /// up to `size` bytes.
    ///
    /// If the image is longer than `size` it is truncated.
    pub fn new(name: impl Into<String>, base: u32, size: u32, image: &[u8]) -> Self {
        let mut data = vec![0u8; size as usize];
        let n = image.len().min(data.len());
        data[..n].copy_from_slice(&image[..n]);
        Self {
            name: name.into(),
            base,
            data,
        }
    }

    fn read_bytes(&self, offset: u32, n: usize) -> Result<u32, DeviceFault> {
        let size = self.data.len() as u32;
        if offset.checked_add(n as u32).is_none_or(|end| end > size) {
            return Err(DeviceFault::Memory(MemFault::OutOfBounds { offset, size }));
        }
        let mut buf = [0u8; 4];
        buf[..n].copy_from_slice(&self.data[offset as usize..offset as usize + n]);
        Ok(u32::from_le_bytes(buf))
    }
}

impl Device for RomDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn address_range(&self) -> (u32, u32) {
        (self.base, self.data.len() as u32)
    }

    fn permissions(&self) -> u8 {
        PERM_READ | PERM_EXEC
    }

    fn read(&mut self, offset: u32, width: AccessWidth) -> Result<u32, DeviceFault> {
        self.read_bytes(offset, width.bytes() as usize)
    }

    fn write(&mut self, offset: u32, _width: AccessWidth, _value: u32) -> Result<(), DeviceFault> {
        Err(DeviceFault::Rejected { offset })
    }
}
