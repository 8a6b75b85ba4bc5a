//! Permission-Tracked Memory.
//!
//! This module provides the backing store used by RAM-like devices. Every byte
//! carries its own permission bits, so the memory can catch out-of-bounds,
//! permission-violating, and read-before-write accesses at byte granularity.
//! It also provides:
//! 1. **Dirty tracking:** Writes mark fixed-size pages dirty, so consumers
//!    (e.g., the video device) can scan only what changed.
//! 2. **Bump allocation:** A simple high-water-mark allocator backing the
//!    guest `brk` system call.

use crate::common::MemFault;

/// Permission bit: the byte may be executed as part of an instruction.
pub const PERM_EXEC: u8 = 1 << 0;
/// Permission bit: the byte may be written.
pub const PERM_WRITE: u8 = 1 << 1;
/// Permission bit: the byte may be read.
pub const PERM_READ: u8 = 1 << 2;
/// Permission bit: the byte has not been written since allocation.
///
/// A byte with this bit set faults on read even when `PERM_READ` is held.
/// The first write clears it, which is how read-before-write bugs in guest
/// programs surface as faults instead of silent garbage.
pub const PERM_RAW: u8 = 1 << 3;

/// Size of a dirty-tracking page in bytes.
pub const DIRTY_PAGE_SIZE: u32 = 64;

/// Alignment of blocks returned by the bump allocator.
const ALLOC_ALIGN: u32 = 16;

/// A byte-addressed memory with per-byte permissions.
///
/// All offsets are relative to the start of the unit. Mapping the unit at a
/// guest base address is the enclosing device's job.
pub struct MemoryUnit {
    data: Vec<u8>,
    perms: Vec<u8>,
    dirty: Vec<bool>,
    /// High-water mark for the bump allocator, always 16-byte aligned.
    alloc_cursor: u32,
}

impl MemoryUnit {
    /// Creates a zero-filled memory unit of `size` bytes.
    ///
    /// Every byte starts writable with read-before-write tracking armed:
    /// the guest may store anywhere, but a load from a byte it never wrote
    /// faults. The loader tightens or widens regions through
    /// [`set_permissions`](Self::set_permissions) as it places segments.
    pub fn new(size: u32) -> Self {
        let pages = size.div_ceil(DIRTY_PAGE_SIZE) as usize;
        Self {
            data: vec![0; size as usize],
            perms: vec![PERM_WRITE | PERM_RAW; size as usize],
            dirty: vec![false; pages],
            alloc_cursor: 0,
        }
    }

    /// Returns the size of the unit in bytes.
    pub fn len(&self) -> u32 {
        self.data.len() as u32
    }

    /// Returns whether the unit has zero capacity.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn check_bounds(&self, offset: u32, len: u32) -> Result<(), MemFault> {
        let size = self.len();
        if offset.checked_add(len).is_none_or(|end| end > size) {
            return Err(MemFault::OutOfBounds { offset, size });
        }
        Ok(())
    }

    /// Reads `buf.len()` bytes starting at `offset`, checking each byte for
    /// read permission.
    ///
    /// A byte still carrying [`PERM_RAW`] faults with
    /// [`MemFault::UninitializedRead`] even when readable, since it has never
    /// been written.
    pub fn read(&self, offset: u32, buf: &mut [u8]) -> Result<(), MemFault> {
        self.check_bounds(offset, buf.len() as u32)?;
        let base = offset as usize;
        for i in 0..buf.len() {
            let held = self.perms[base + i];
            if held & PERM_READ == 0 {
                return Err(MemFault::AccessDenied {
                    offset: offset + i as u32,
                    needed: PERM_READ,
                    held,
                });
            }
            if held & PERM_RAW != 0 {
                return Err(MemFault::UninitializedRead {
                    offset: offset + i as u32,
                });
            }
        }
        buf.copy_from_slice(&self.data[base..base + buf.len()]);
        Ok(())
    }

    /// Writes `buf` starting at `offset`, checking each byte for write
    /// permission.
    ///
    /// The first write to a byte clears [`PERM_RAW`] and grants [`PERM_READ`],
    /// preserving any execute permission the byte held. The check runs over
    /// the whole range before any byte is modified, so a failed write leaves
    /// the unit untouched.
    pub fn write(&mut self, offset: u32, buf: &[u8]) -> Result<(), MemFault> {
        self.check_bounds(offset, buf.len() as u32)?;
        let base = offset as usize;
        for i in 0..buf.len() {
            let held = self.perms[base + i];
            if held & PERM_WRITE == 0 {
                return Err(MemFault::AccessDenied {
                    offset: offset + i as u32,
                    needed: PERM_WRITE,
                    held,
                });
            }
        }
        for i in 0..buf.len() {
            let held = self.perms[base + i];
            self.perms[base + i] = (held & PERM_EXEC) | PERM_READ | PERM_WRITE;
        }
        self.data[base..base + buf.len()].copy_from_slice(buf);
        self.mark_dirty(offset, buf.len() as u32);
        Ok(())
    }

    /// Reads bytes for instruction fetch, requiring execute permission.
    pub fn fetch(&self, offset: u32, buf: &mut [u8]) -> Result<(), MemFault> {
        self.check_bounds(offset, buf.len() as u32)?;
        let base = offset as usize;
        for i in 0..buf.len() {
            let held = self.perms[base + i];
            if held & PERM_EXEC == 0 {
                return Err(MemFault::AccessDenied {
                    offset: offset + i as u32,
                    needed: PERM_EXEC,
                    held,
                });
            }
        }
        buf.copy_from_slice(&self.data[base..base + buf.len()]);
        Ok(())
    }

    /// Sets the permission bits for every byte in `offset..offset + len`.
    ///
    /// Also advances the bump allocator past the region, so later allocations
    /// never hand out memory that overlaps an explicitly mapped range.
    pub fn set_permissions(&mut self, offset: u32, len: u32, perms: u8) -> Result<(), MemFault> {
        self.check_bounds(offset, len)?;
        let base = offset as usize;
        for p in &mut self.perms[base..base + len as usize] {
            *p = perms;
        }
        let end = (offset + len).next_multiple_of(ALLOC_ALIGN);
        self.alloc_cursor = self.alloc_cursor.max(end);
        Ok(())
    }

    /// Copies `data` into the unit without permission checks and makes the
    /// region hold `perms`.
    ///
    /// This is the loader's path for placing program segments: the bytes are
    /// image content, not guest stores, so they bypass write permissions and
    /// do not count as initializing writes unless `perms` says so.
    pub fn place(&mut self, offset: u32, data: &[u8], perms: u8) -> Result<(), MemFault> {
        self.check_bounds(offset, data.len() as u32)?;
        let base = offset as usize;
        self.data[base..base + data.len()].copy_from_slice(data);
        self.set_permissions(offset, data.len() as u32, perms)
    }

    /// Grows the unit so that `offset + size` fits, then grants `perms` to
    /// the `size` bytes at `offset`.
    ///
    /// Newly created bytes outside the region start like fresh memory
    /// (writable, read-before-write armed). Shrinking is not supported; a
    /// region already inside the unit only has its permissions set.
    pub fn add_memory(&mut self, offset: u32, size: u32, perms: u8) -> Result<(), MemFault> {
        let end = offset
            .checked_add(size)
            .ok_or(MemFault::OutOfMemory { requested: size })?;
        if end > self.len() {
            let new_len = end as usize;
            self.data.resize(new_len, 0);
            self.perms.resize(new_len, PERM_WRITE | PERM_RAW);
            self.dirty
                .resize(end.div_ceil(DIRTY_PAGE_SIZE) as usize, false);
        }
        self.set_permissions(offset, size, perms)
    }

    /// Allocates `size` bytes from the high-water mark, aligned to 16 bytes.
    ///
    /// The new block is readable and writable with read-before-write tracking
    /// armed. Returns the offset of the block.
    pub fn allocate(&mut self, size: u32) -> Result<u32, MemFault> {
        let offset = self.alloc_cursor;
        let end = offset
            .checked_add(size)
            .ok_or(MemFault::OutOfMemory { requested: size })?;
        if end > self.len() {
            return Err(MemFault::OutOfMemory { requested: size });
        }
        let base = offset as usize;
        for p in &mut self.perms[base..base + size as usize] {
            *p = PERM_READ | PERM_WRITE | PERM_RAW;
        }
        self.alloc_cursor = end.next_multiple_of(ALLOC_ALIGN);
        Ok(offset)
    }

    /// Returns the current high-water mark of the bump allocator.
    pub fn alloc_cursor(&self) -> u32 {
        self.alloc_cursor
    }

    fn mark_dirty(&mut self, offset: u32, len: u32) {
        let first = (offset / DIRTY_PAGE_SIZE) as usize;
        let last = ((offset + len.saturating_sub(1)) / DIRTY_PAGE_SIZE) as usize;
        let last = last.min(self.dirty.len().saturating_sub(1));
        for page in &mut self.dirty[first..=last] {
            *page = true;
        }
    }

    /// Returns the indices of all dirty pages and clears the dirty set.
    ///
    /// Page `i` covers bytes `i * DIRTY_PAGE_SIZE .. (i + 1) * DIRTY_PAGE_SIZE`.
    pub fn take_dirty_pages(&mut self) -> Vec<usize> {
        let mut pages = Vec::new();
        for (i, flag) in self.dirty.iter_mut().enumerate() {
            if *flag {
                pages.push(i);
                *flag = false;
            }
        }
        pages
    }

    /// Returns the raw bytes of a page regardless of permissions.
    ///
    /// Used by presentation-side consumers that scan dirty pages; guest
    /// accesses never come through here.
    pub fn page_bytes(&self, page: usize) -> &[u8] {
        let start = page * DIRTY_PAGE_SIZE as usize;
        let end = (start + DIRTY_PAGE_SIZE as usize).min(self.data.len());
        &self.data[start..end]
    }

    /// Returns the permission bits held by the byte at `offset`.
    pub fn permissions_at(&self, offset: u32) -> Result<u8, MemFault> {
        self.check_bounds(offset, 1)?;
        Ok(self.perms[offset as usize])
    }
}
