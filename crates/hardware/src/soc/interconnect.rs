//! System interconnect (bus) for memory and MMIO access.
//!
//! This module implements the bus that routes guest address accesses to
//! devices. It provides:
//! 1. **Device registration:** Devices are added in priority order; the first
//!    device whose range contains an address wins.
//! 2. **Atomic transactions:** One lock guards the find-then-access sequence,
//!    so address resolution and the access it authorizes are a single unit
//!    visible to all cores.
//! 3. **Structured outcomes:** Every operation returns a `Result` carrying a
//!    [`BusFault`] on failure; nothing on a guest-triggered path panics.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::common::{AccessWidth, BusFault, DeviceFault, MemFault};
use crate::soc::memory::{PERM_EXEC, PERM_READ, PERM_WRITE};
use crate::soc::traits::Device;

/// System bus connecting cores and devices; routes accesses by guest address.
///
/// The device list is guarded by a single mutex shared by all read and write
/// traffic from all cores. This deliberately gives up access concurrency for
/// a simple invariant: for any two transactions, one fully precedes the
/// other, and no partial interleaving of a single access is observable.
pub struct Bus {
    devices: Mutex<Vec<Box<dyn Device>>>,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    /// Creates an empty bus with no devices.
    pub fn new() -> Self {
        Self {
            devices: Mutex::new(Vec::new()),
        }
    }

    /// Registers a device on the bus.
    ///
    /// Insertion order is routing priority: when ranges overlap, the device
    /// added first claims the address.
    pub fn add_device(&self, dev: Box<dyn Device>) {
        let (base, size) = dev.address_range();
        trace!(name = dev.name(), base = format_args!("{base:#010x}"), size, "device attached");
        self.lock().push(dev);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Box<dyn Device>>> {
        // A panic while holding the lock is a host bug; the device table
        // itself is still structurally valid, so recover the guard.
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reads a value of the given width from `addr`.
    ///
    /// The device-level permission mask is checked before the access is
    /// delegated, independent of any per-byte permissions the device keeps.
    pub fn read(&self, addr: u32, width: AccessWidth) -> Result<u32, BusFault> {
        if !width.is_aligned(addr) {
            return Err(BusFault::ReadMisaligned { addr });
        }
        let mut devices = self.lock();
        let (dev, offset) = find_device(&mut devices, addr)?;
        if dev.permissions() & PERM_READ == 0 {
            return Err(BusFault::AccessDenied { addr, write: false });
        }
        dev.read(offset, width)
            .map_err(|fault| map_fault(addr, false, fault))
    }

    /// Writes a value of the given width to `addr`.
    pub fn write(&self, addr: u32, width: AccessWidth, value: u32) -> Result<(), BusFault> {
        if !width.is_aligned(addr) {
            return Err(BusFault::WriteMisaligned { addr });
        }
        let mut devices = self.lock();
        let (dev, offset) = find_device(&mut devices, addr)?;
        if dev.permissions() & PERM_WRITE == 0 {
            return Err(BusFault::AccessDenied { addr, write: true });
        }
        dev.write(offset, width, value)
            .map_err(|fault| map_fault(addr, true, fault))
    }

    /// Fetches one instruction word at `addr`, requiring execute permission.
    pub fn fetch(&self, addr: u32) -> Result<u32, BusFault> {
        if !AccessWidth::Word.is_aligned(addr) {
            return Err(BusFault::ReadMisaligned { addr });
        }
        let mut devices = self.lock();
        let (dev, offset) = find_device(&mut devices, addr)?;
        if dev.permissions() & PERM_EXEC == 0 {
            return Err(BusFault::AccessDenied { addr, write: false });
        }
        dev.fetch(offset)
            .map_err(|fault| map_fault(addr, false, fault))
    }

    /// Fetches up to `count` consecutive instruction words starting at `addr`
    /// in a single bus transaction.
    ///
    /// Returns at least one word or a fault. Words past the first that fault
    /// (end of segment, permission boundary) are simply not returned; they
    /// will fault for real if the core ever fetches them directly.
    pub fn fetch_block(&self, addr: u32, count: u32) -> Result<Vec<u32>, BusFault> {
        if !AccessWidth::Word.is_aligned(addr) {
            return Err(BusFault::ReadMisaligned { addr });
        }
        let mut devices = self.lock();
        let (dev, offset) = find_device(&mut devices, addr)?;
        if dev.permissions() & PERM_EXEC == 0 {
            return Err(BusFault::AccessDenied { addr, write: false });
        }
        let mut words = vec![0u32; count.max(1) as usize];
        let fetched = dev
            .fetch_multi(offset, &mut words)
            .map_err(|fault| map_fault(addr, false, fault))?;
        words.truncate(fetched as usize);
        Ok(words)
    }

    /// Reads `buf.len()` bytes starting at `addr` into `buf`.
    ///
    /// The whole range must be claimed by a single device; a short transfer
    /// is reported as a fault at the first byte that did not move. Used by
    /// the syscall bridge to move guest buffers.
    pub fn read_bytes(&self, addr: u32, buf: &mut [u8]) -> Result<(), BusFault> {
        let mut devices = self.lock();
        let (dev, offset) = find_device(&mut devices, addr)?;
        if dev.permissions() & PERM_READ == 0 {
            return Err(BusFault::AccessDenied { addr, write: false });
        }
        let moved = dev
            .read_multi(offset, buf)
            .map_err(|fault| map_fault(addr, false, fault))?;
        if (moved as usize) < buf.len() {
            return Err(BusFault::AccessDenied {
                addr: addr + moved,
                write: false,
            });
        }
        Ok(())
    }

    /// Writes `data` starting at `addr`.
    ///
    /// The whole range must be claimed by a single writable device; a short
    /// transfer is reported as a fault at the first byte that did not move.
    pub fn write_bytes(&self, addr: u32, data: &[u8]) -> Result<(), BusFault> {
        let mut devices = self.lock();
        let (dev, offset) = find_device(&mut devices, addr)?;
        if dev.permissions() & PERM_WRITE == 0 {
            return Err(BusFault::AccessDenied { addr, write: true });
        }
        let moved = dev
            .write_multi(offset, data)
            .map_err(|fault| map_fault(addr, true, fault))?;
        if (moved as usize) < data.len() {
            return Err(BusFault::AccessDenied {
                addr: addr + moved,
                write: true,
            });
        }
        Ok(())
    }

    /// Verifies that `len` bytes starting at `addr` are claimed by a single
    /// device, without touching any data.
    ///
    /// Lets callers size host-side buffers from guest-supplied lengths
    /// before committing to them.
    pub fn check_range(&self, addr: u32, len: u32) -> Result<(), BusFault> {
        let mut devices = self.lock();
        let (dev, offset) = find_device(&mut devices, addr)?;
        let (_, size) = dev.address_range();
        if len > size - offset {
            return Err(BusFault::AddressNotFound {
                addr: addr + (size - offset),
            });
        }
        Ok(())
    }

    /// Allocates `size` bytes from the first RAM device's bump allocator.
    ///
    /// Backs the guest `brk` system call. Returns the guest address of the
    /// new block.
    pub fn allocate(&self, size: u32) -> Result<u32, BusFault> {
        let mut devices = self.lock();
        for dev in devices.iter_mut() {
            let (base, _) = dev.address_range();
            if let Some(memory) = dev.as_memory_mut() {
                let offset = memory.allocate(size).map_err(|fault| {
                    map_fault(base, true, DeviceFault::Memory(fault))
                })?;
                return Ok(base + offset);
            }
        }
        Err(BusFault::AddressNotFound { addr: 0 })
    }

    /// Places a program segment at `addr` with the given per-byte permissions.
    ///
    /// Loader path: bypasses guest write permissions, since the bytes are
    /// image content rather than guest stores. The target must be a
    /// permission-tracked memory device.
    pub fn load_segment(&self, addr: u32, data: &[u8], perms: u8) -> Result<(), BusFault> {
        let mut devices = self.lock();
        let (dev, offset) = find_device(&mut devices, addr)?;
        let memory = dev
            .as_memory_mut()
            .ok_or(BusFault::AccessDenied { addr, write: true })?;
        memory
            .place(offset, data, perms)
            .map_err(|fault| map_fault(addr, true, DeviceFault::Memory(fault)))
    }

    /// Grants `perms` to the `len` bytes starting at `addr` without writing
    /// any data.
    ///
    /// Loader path for zero-sized regions (BSS, stacks). The target must be
    /// a permission-tracked memory device.
    pub fn map_region(&self, addr: u32, len: u32, perms: u8) -> Result<(), BusFault> {
        let mut devices = self.lock();
        let (dev, offset) = find_device(&mut devices, addr)?;
        let memory = dev
            .as_memory_mut()
            .ok_or(BusFault::AccessDenied { addr, write: true })?;
        memory
            .set_permissions(offset, len, perms)
            .map_err(|fault| map_fault(addr, true, DeviceFault::Memory(fault)))
    }

    /// Grows the first permission-tracked memory device so that it covers
    /// `size` bytes at `addr`, granting `perms` to the new range.
    ///
    /// Machine-construction path: lets a host attach extra RAM behind an
    /// already-mapped device after the bus is built. `addr` must fall at or
    /// past the device's base.
    pub fn add_memory(&self, addr: u32, size: u32, perms: u8) -> Result<(), BusFault> {
        let mut devices = self.lock();
        for dev in devices.iter_mut() {
            let (base, _) = dev.address_range();
            if addr < base {
                continue;
            }
            if let Some(memory) = dev.as_memory_mut() {
                return memory
                    .add_memory(addr - base, size, perms)
                    .map_err(|fault| map_fault(addr, true, DeviceFault::Memory(fault)));
            }
        }
        Err(BusFault::AddressNotFound { addr })
    }

    /// Returns the current program break: the first RAM device's base plus
    /// its allocator high-water mark.
    pub fn current_break(&self) -> Result<u32, BusFault> {
        let mut devices = self.lock();
        for dev in devices.iter_mut() {
            let (base, _) = dev.address_range();
            if let Some(memory) = dev.as_memory_mut() {
                return Ok(base + memory.alloc_cursor());
            }
        }
        Err(BusFault::AddressNotFound { addr: 0 })
    }
}

/// Resolves `addr` to the first device whose range contains it.
///
/// Returns the device and the device-relative offset.
fn find_device<'a>(
    devices: &'a mut [Box<dyn Device>],
    addr: u32,
) -> Result<(&'a mut Box<dyn Device>, u32), BusFault> {
    for dev in devices.iter_mut() {
        let (base, size) = dev.address_range();
        if addr >= base && addr - base < size {
            return Ok((dev, addr - base));
        }
    }
    Err(BusFault::AddressNotFound { addr })
}

/// Maps a device-level fault to a bus fault at the absolute address.
fn map_fault(addr: u32, write: bool, fault: DeviceFault) -> BusFault {
    match fault {
        DeviceFault::Memory(MemFault::AccessDenied { .. } | MemFault::UninitializedRead { .. }) => {
            BusFault::AccessDenied { addr, write }
        }
        other => BusFault::DeviceFailure { addr, fault: other },
    }
}
