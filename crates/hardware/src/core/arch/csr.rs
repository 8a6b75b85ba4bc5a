//! Machine-Mode Control and Status Registers.
//!
//! The emulator implements the small machine-mode CSR set the trap machinery
//! and the syscall bridge need: trap vector, cause, EPC, and the identity
//! registers. Interrupt enable/pending registers exist as data but are not
//! wired to any delivery mechanism.

use crate::isa::privileged::csr as addr;

/// Machine-mode CSR file for one hart.
#[derive(Clone, Debug)]
pub struct Csrs {
    /// Machine status.
    pub mstatus: u32,
    /// Trap-handler base address. A single vector: every cause enters here.
    pub mtvec: u32,
    /// Interrupt enables. Data only; delivery is not implemented.
    pub mie: u32,
    /// Interrupt pending bits. Data only.
    pub mip: u32,
    /// Scratch register for the handler.
    pub mscratch: u32,
    /// PC of the instruction that trapped.
    pub mepc: u32,
    /// Exception code of the most recent trap.
    pub mcause: u32,
    /// Faulting address or instruction word of the most recent trap.
    pub mtval: u32,
    hartid: u32,
}

impl Csrs {
    /// Creates the CSR file for hart `hartid` with architectural reset values.
    pub fn new(hartid: u32) -> Self {
        Self {
            mstatus: 0,
            mtvec: 0,
            mie: addr::MIE_RESET,
            mip: 0,
            mscratch: 0,
            mepc: 0,
            mcause: 0,
            mtval: 0,
            hartid,
        }
    }

    /// Reads a CSR by its 12-bit address.
    ///
    /// Returns `None` for unimplemented addresses; the caller decides whether
    /// that is an illegal access.
    pub fn read(&self, csr: u32) -> Option<u32> {
        match csr {
            addr::MSTATUS => Some(self.mstatus),
            addr::MISA => Some(addr::MISA_RV32I),
            addr::MIE => Some(self.mie),
            addr::MTVEC => Some(self.mtvec),
            addr::MSCRATCH => Some(self.mscratch),
            addr::MEPC => Some(self.mepc),
            addr::MCAUSE => Some(self.mcause),
            addr::MTVAL => Some(self.mtval),
            addr::MIP => Some(self.mip),
            addr::MVENDORID | addr::MARCHID | addr::MIMPID => Some(0),
            addr::MHARTID => Some(self.hartid),
            _ => None,
        }
    }

    /// Writes a CSR by its 12-bit address.
    ///
    /// Read-only addresses and unimplemented addresses return `false`.
    pub fn write(&mut self, csr: u32, value: u32) -> bool {
        match csr {
            addr::MSTATUS => self.mstatus = value,
            addr::MIE => self.mie = value,
            addr::MTVEC => self.mtvec = value,
            addr::MSCRATCH => self.mscratch = value,
            addr::MEPC => self.mepc = value,
            addr::MCAUSE => self.mcause = value,
            addr::MTVAL => self.mtval = value,
            addr::MIP => self.mip = value,
            _ => return false,
        }
        true
    }
}
