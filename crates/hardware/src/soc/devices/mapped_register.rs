//! Memory-Mapped Register Device.
//!
//! A single word-sized register exposed to the guest at a fixed address,
//! with optional host-side hooks observing each access. Used for small
//! control/status windows that do not warrant a full device model.

use crate::common::{AccessWidth, DeviceFault};
use crate::soc::memory::{PERM_READ, PERM_WRITE};
use crate::soc::traits::Device;

/// Hook invoked when the guest writes the register.
pub type WriteHook = Box<dyn FnMut(u32) + Send>;

/// A single memory-mapped 32-bit register.
///
/// The register only accepts naturally aligned word accesses; byte or
/// halfword pokes are rejected rather than given partial-register semantics.
pub struct MappedRegisterDevice {
    name: String,
    base: u32,
    value: u32,
    on_write: Option<WriteHook>,
}

impl MappedRegisterDevice {
    /// Creates a register at `base` holding `initial`.
    pub fn new(name: impl Into<String>, base: u32, initial: u32) -> Self {
        Self {
            name: name.into(),
            base,
            value: initial,
            on_write: None,
        }
    }

    /// Attaches a hook called with the new value after every guest write.
    pub fn with_write_hook(mut self, hook: WriteHook) -> Self {
        self.on_write = Some(hook);
        self
    }

    /// Returns the current register value.
    pub fn value(&self) -> u32 {
        self.value
    }
}

impl Device for MappedRegisterDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn address_range(&self) -> (u32, u32) {
        (self.base, 4)
    }

    fn permissions(&self) -> u8 {
        PERM_READ | PERM_WRITE
    }

    fn read(&mut self, offset: u32, width: AccessWidth) -> Result<u32, DeviceFault> {
        if offset != 0 || width != AccessWidth::Word {
            return Err(DeviceFault::Rejected { offset });
        }
        Ok(self.value)
    }

    fn write(&mut self, offset: u32, width: AccessWidth, value: u32) -> Result<(), DeviceFault> {
        if offset != 0 || width != AccessWidth::Word {
            return Err(DeviceFault::Rejected { offset });
        }
        self.value = value;
        if let Some(hook) = &mut self.on_write {
            hook(value);
        }
        Ok(())
    }
}
