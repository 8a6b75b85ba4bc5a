//! ELF Program-Image Loader.
//!
//! This module places a guest program into the machine's memory. It performs:
//! 1. **Validation:** The image must be a 32-bit little-endian RISC-V ELF.
//! 2. **Segment placement:** Each loadable segment's file bytes are copied
//!    into RAM with per-byte permissions derived from the segment flags.
//! 3. **BSS arming:** The zero-initialized tail of a segment gets its
//!    permissions with read-before-write tracking armed instead of eager
//!    zero fill, so guest reads of never-written BSS bytes fault.
//!
//! The loader returns the entry-point address; the caller must not start any
//! core before loading succeeds.

use object::{Architecture, Object, ObjectSegment, SegmentFlags};
use tracing::{debug, info};

use crate::common::LoaderError;
use crate::soc::memory::{PERM_EXEC, PERM_RAW, PERM_READ, PERM_WRITE};
use crate::soc::Bus;

/// ELF segment flag: executable.
const PF_X: u32 = 1 << 0;
/// ELF segment flag: writable.
const PF_W: u32 = 1 << 1;
/// ELF segment flag: readable.
const PF_R: u32 = 1 << 2;

/// Translates ELF segment flags into per-byte permission bits.
fn segment_perms(p_flags: u32) -> u8 {
    let mut perms = 0;
    if p_flags & PF_R != 0 {
        perms |= PERM_READ;
    }
    if p_flags & PF_W != 0 {
        perms |= PERM_WRITE;
    }
    if p_flags & PF_X != 0 {
        perms |= PERM_EXEC;
    }
    perms
}

/// Loads an ELF image into guest memory and returns its entry point.
///
/// # Arguments
///
/// * `bus` - The bus of the machine being populated.
/// * `image` - Raw bytes of the ELF file.
///
/// # Returns
///
/// The guest entry-point address on success.
pub fn load_elf(bus: &Bus, image: &[u8]) -> Result<u32, LoaderError> {
    let file = object::File::parse(image)?;

    if file.architecture() != Architecture::Riscv32 {
        return Err(LoaderError::Unsupported("not a 32-bit RISC-V image"));
    }
    if !file.is_little_endian() {
        return Err(LoaderError::Unsupported("not little-endian"));
    }

    for segment in file.segments() {
        let addr = segment.address() as u32;
        let mem_size = segment.size() as u32;
        if mem_size == 0 {
            continue;
        }
        let data = segment.data()?;
        let perms = match segment.flags() {
            SegmentFlags::Elf { p_flags } => segment_perms(p_flags),
            _ => PERM_READ | PERM_WRITE,
        };

        debug!(
            addr = format_args!("{addr:#010x}"),
            file_size = data.len(),
            mem_size,
            perms = format_args!("{perms:#x}"),
            "placing segment"
        );

        if !data.is_empty() {
            bus.load_segment(addr, data, perms)
                .map_err(|fault| LoaderError::Placement { addr, fault })?;
        }

        // BSS tail: no file bytes; readable only once the guest writes.
        let file_size = data.len() as u32;
        if mem_size > file_size {
            let tail = addr + file_size;
            bus.map_region(tail, mem_size - file_size, perms | PERM_RAW)
                .map_err(|fault| LoaderError::Placement { addr: tail, fault })?;
        }
    }

    let entry = file.entry() as u32;
    info!(entry = format_args!("{entry:#010x}"), "image loaded");
    Ok(entry)
}
