//! Framebuffer Device.
//!
//! A guest-writable pixel buffer backed by permission-tracked memory. The
//! guest writes pixels like ordinary RAM; the host side polls
//! [`VideoDevice::take_updates`] and redraws only the pages the guest
//! touched since the last frame.

use crate::common::{AccessWidth, DeviceFault};
use crate::soc::memory::{MemoryUnit, DIRTY_PAGE_SIZE, PERM_READ, PERM_WRITE};
use crate::soc::traits::Device;

/// A region of the framebuffer that changed since the last presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameUpdate {
    /// Byte offset of the region within the framebuffer.
    pub offset: u32,
    /// The region's current contents.
    pub bytes: Vec<u8>,
}

/// A memory-mapped framebuffer.
pub struct VideoDevice {
    name: String,
    base: u32,
    /// Frame width in bytes per scanline.
    width: u32,
    /// Number of scanlines.
    height: u32,
    memory: MemoryUnit,
}

impl VideoDevice {
    /// Creates a framebuffer of `width * height` bytes mapped at `base`.
    ///
    /// The whole buffer starts readable and writable and zeroed (a black
    /// frame), so the guest may read back pixels it never wrote.
    pub fn new(name: impl Into<String>, base: u32, width: u32, height: u32) -> Self {
        let mut memory = MemoryUnit::new(width * height);
        // Cannot fail: the range is exactly the unit's size.
        let _ = memory.set_permissions(0, width * height, PERM_READ | PERM_WRITE);
        Self {
            name: name.into(),
            base,
            width,
            height,
            memory,
        }
    }

    /// Returns (width_in_bytes, height) of the frame.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the regions written since the last call and resets tracking.
    pub fn take_updates(&mut self) -> Vec<FrameUpdate> {
        self.memory
            .take_dirty_pages()
            .into_iter()
            .map(|page| FrameUpdate {
                offset: page as u32 * DIRTY_PAGE_SIZE,
                bytes: self.memory.page_bytes(page).to_vec(),
            })
            .collect()
    }
}

impl Device for VideoDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn address_range(&self) -> (u32, u32) {
        (self.base, self.width * self.height)
    }

    fn permissions(&self) -> u8 {
        PERM_READ | PERM_WRITE
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
}
