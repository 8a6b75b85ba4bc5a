//! Fault and trap types for the emulator.
//!
//! Failures are layered the way the hardware is: devices report
//! [`DeviceFault`]s, backing memory reports [`MemFault`]s, the interconnect
//! folds both into a [`BusFault`], and the core translates bus faults into
//! architectural [`Trap`]s with the causes defined by the privileged
//! specification.

use thiserror::Error;

/// An architectural trap raised by a core.
///
/// Each variant carries the value that the handler entry sequence writes to
/// `mtval` (the faulting address or the offending instruction word).
/// Discriminants are the `mcause` exception codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Trap {
    /// Fetch from an address that is not four-byte aligned.
    #[error("instruction address misaligned at {0:#010x}")]
    InstructionAddressMisaligned(u32),
    /// Fetch from memory without EXEC permission or outside any device.
    #[error("instruction access fault at {0:#010x}")]
    InstructionAccessFault(u32),
    /// Undecodable or unsupported instruction word.
    #[error("illegal instruction {0:#010x}")]
    IllegalInstruction(u32),
    /// EBREAK.
    #[error("breakpoint at {0:#010x}")]
    Breakpoint(u32),
    /// Load from an address misaligned for its width.
    #[error("load address misaligned at {0:#010x}")]
    LoadAddressMisaligned(u32),
    /// Load denied by permissions, RAW tracking, or unmapped address.
    #[error("load access fault at {0:#010x}")]
    LoadAccessFault(u32),
    /// Store to an address misaligned for its width.
    #[error("store address misaligned at {0:#010x}")]
    StoreAddressMisaligned(u32),
    /// Store denied by permissions or unmapped address.
    #[error("store access fault at {0:#010x}")]
    StoreAccessFault(u32),
    /// ECALL from user mode.
    #[error("environment call")]
    EnvironmentCall,
}

impl Trap {
    /// The exception code written to `mcause` when this trap is taken.
    pub fn cause(self) -> u32 {
        match self {
            Self::InstructionAddressMisaligned(_) => 0,
            Self::InstructionAccessFault(_) => 1,
            Self::IllegalInstruction(_) => 2,
            Self::Breakpoint(_) => 3,
            Self::LoadAddressMisaligned(_) => 4,
            Self::LoadAccessFault(_) => 5,
            Self::StoreAddressMisaligned(_) => 6,
            Self::StoreAccessFault(_) => 7,
            Self::EnvironmentCall => 8,
        }
    }

    /// The value written to `mtval` when this trap is taken.
    pub fn value(self) -> u32 {
        match self {
            Self::InstructionAddressMisaligned(v)
            | Self::InstructionAccessFault(v)
            | Self::IllegalInstruction(v)
            | Self::Breakpoint(v)
            | Self::LoadAddressMisaligned(v)
            | Self::LoadAccessFault(v)
            | Self::StoreAddressMisaligned(v)
            | Self::StoreAccessFault(v) => v,
            Self::EnvironmentCall => 0,
        }
    }
}

/// A failure inside a device's backing memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemFault {
    /// Offset past the end of the backing buffer.
    #[error("offset {offset:#x} out of bounds (size {size:#x})")]
    OutOfBounds {
        /// The offending offset.
        offset: u32,
        /// The size of the buffer.
        size: u32,
    },
    /// Access denied by per-byte permission bits.
    #[error("permission denied at offset {offset:#x} (need {needed:#x}, have {held:#x})")]
    AccessDenied {
        /// The offending offset.
        offset: u32,
        /// The permission bits the access required.
        needed: u8,
        /// The permission bits the byte actually held.
        held: u8,
    },
    /// Read from a byte that has never been written.
    #[error("read of uninitialized memory at offset {offset:#x}")]
    UninitializedRead {
        /// The offending offset.
        offset: u32,
    },
    /// The bump allocator has no room for the requested block.
    #[error("out of memory allocating {requested:#x} bytes")]
    OutOfMemory {
        /// The requested allocation size.
        requested: u32,
    },
}

/// A failure reported by a device implementation itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeviceFault {
    /// The device rejected the access (wrong width, read-only register, ...).
    #[error("device rejected access at offset {offset:#x}")]
    Rejected {
        /// Offset within the device's window.
        offset: u32,
    },
    /// The device's backing memory faulted.
    #[error(transparent)]
    Memory(#[from] MemFault),
}

/// A failure of a full bus transaction.
///
/// Every variant carries the absolute guest address, so the core can convert
/// the fault directly into a trap with the right `mtval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BusFault {
    /// No device claims the address.
    #[error("no device mapped at {addr:#010x}")]
    AddressNotFound {
        /// The unclaimed guest address.
        addr: u32,
    },
    /// Read address not aligned to the access width.
    #[error("misaligned read at {addr:#010x}")]
    ReadMisaligned {
        /// The misaligned guest address.
        addr: u32,
    },
    /// Write address not aligned to the access width.
    #[error("misaligned write at {addr:#010x}")]
    WriteMisaligned {
        /// The misaligned guest address.
        addr: u32,
    },
    /// Access denied by device or per-byte permissions.
    #[error("access denied at {addr:#010x}")]
    AccessDenied {
        /// The denied guest address.
        addr: u32,
        /// Whether the failed access was a write.
        write: bool,
    },
    /// The device claimed the address but failed internally.
    #[error("device failure at {addr:#010x}: {fault}")]
    DeviceFailure {
        /// The guest address of the failed access.
        addr: u32,
        /// The underlying device fault.
        fault: DeviceFault,
    },
}

impl BusFault {
    /// The absolute guest address the fault occurred at.
    pub fn addr(self) -> u32 {
        match self {
            Self::AddressNotFound { addr }
            | Self::ReadMisaligned { addr }
            | Self::WriteMisaligned { addr }
            | Self::AccessDenied { addr, .. }
            | Self::DeviceFailure { addr, .. } => addr,
        }
    }

    /// Converts this fault into the trap a load at `addr` would raise.
    pub fn into_load_trap(self) -> Trap {
        match self {
            Self::ReadMisaligned { addr } | Self::WriteMisaligned { addr } => {
                Trap::LoadAddressMisaligned(addr)
            }
            other => Trap::LoadAccessFault(other.addr()),
        }
    }

    /// Converts this fault into the trap a store at `addr` would raise.
    pub fn into_store_trap(self) -> Trap {
        match self {
            Self::ReadMisaligned { addr } | Self::WriteMisaligned { addr } => {
                Trap::StoreAddressMisaligned(addr)
            }
            other => Trap::StoreAccessFault(other.addr()),
        }
    }

    /// Converts this fault into the trap an instruction fetch would raise.
    pub fn into_fetch_trap(self) -> Trap {
        match self {
            Self::ReadMisaligned { addr } | Self::WriteMisaligned { addr } => {
                Trap::InstructionAddressMisaligned(addr)
            }
            other => Trap::InstructionAccessFault(other.addr()),
        }
    }
}

/// A failure while loading a guest program image.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The file could not be read from the host filesystem.
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not a parseable ELF object.
    #[error("failed to parse ELF: {0}")]
    Parse(#[from] object::Error),
    /// The image is an ELF but not a 32-bit little-endian RISC-V executable.
    #[error("unsupported image: {0}")]
    Unsupported(&'static str),
    /// The machine configuration cannot hold the reservations it describes.
    #[error("invalid machine configuration: {0}")]
    Config(&'static str),
    /// A segment could not be copied into guest memory.
    #[error("failed to place segment at {addr:#010x}: {fault}")]
    Placement {
        /// Guest address of the segment.
        addr: u32,
        /// The bus fault raised while writing the segment.
        fault: BusFault,
    },
}
