//! Instruction encoding and decoding utilities.
//!
//! Provides bit extraction functions and structures for decoding
//! RV32I instruction fields from 32-bit instruction encodings.

/// Bit mask for extracting the opcode field (bits 0-6).
pub const OPCODE_MASK: u32 = 0x7F;
/// Bit mask for extracting the destination register field (bits 7-11).
pub const RD_MASK: u32 = 0x1F;
/// Bit mask for extracting the first source register field (bits 15-19).
pub const RS1_MASK: u32 = 0x1F;
/// Bit mask for extracting the second source register field (bits 20-24).
pub const RS2_MASK: u32 = 0x1F;
/// Bit mask for extracting the funct3 field (bits 12-14).
pub const FUNCT3_MASK: u32 = 0x7;
/// Bit mask for extracting the funct7 field (bits 25-31).
pub const FUNCT7_MASK: u32 = 0x7F;
/// Bit mask for extracting the funct12/CSR address field (bits 20-31).
pub const FUNCT12_MASK: u32 = 0xFFF;

/// Trait for extracting instruction fields from encoded instructions.
///
/// Provides methods to extract all standard RV32I instruction fields
/// from a 32-bit instruction encoding.
pub trait InstructionBits {
    /// Extracts the opcode field (bits 0-6).
    ///
    /// The opcode determines the instruction format and operation category.
    /// Returns the 7-bit opcode value.
    fn opcode(&self) -> u32;

    /// Extracts the destination register field (bits 7-11).
    ///
    /// Returns the 5-bit register index (0-31) for the destination register.
    /// Register 0 (x0) is hardwired to zero and writes are ignored.
    fn rd(&self) -> usize;

    /// Extracts the first source register field (bits 15-19).
    ///
    /// Returns the 5-bit register index (0-31) for the first source operand.
    fn rs1(&self) -> usize;

    /// Extracts the second source register field (bits 20-24).
    ///
    /// Returns the 5-bit register index (0-31) for the second source operand.
    fn rs2(&self) -> usize;

    /// Extracts the funct3 field (bits 12-14).
    ///
    /// Used to distinguish between different operations within the same opcode.
    /// Returns the 3-bit funct3 value.
    fn funct3(&self) -> u32;

    /// Extracts the funct7 field (bits 25-31).
    ///
    /// Used to distinguish between standard and alternate encodings
    /// (e.g., ADD vs SUB, SRL vs SRA). Returns the 7-bit funct7 value.
    fn funct7(&self) -> u32;

    /// Extracts the funct12 field (bits 20-31).
    ///
    /// Distinguishes SYSTEM instructions (ECALL, EBREAK, MRET) and doubles
    /// as the CSR address field for Zicsr encodings.
    fn funct12(&self) -> u32;
}

impl InstructionBits for u32 {
    #[inline(always)]
    fn opcode(&self) -> u32 {
        self & OPCODE_MASK
    }

    #[inline(always)]
    fn rd(&self) -> usize {
        ((self >> 7) & RD_MASK) as usize
    }

    #[inline(always)]
    fn rs1(&self) -> usize {
        ((self >> 15) & RS1_MASK) as usize
    }

    #[inline(always)]
    fn rs2(&self) -> usize {
        ((self >> 20) & RS2_MASK) as usize
    }

    #[inline(always)]
    fn funct3(&self) -> u32 {
        (self >> 12) & FUNCT3_MASK
    }

    #[inline(always)]
    fn funct7(&self) -> u32 {
        (self >> 25) & FUNCT7_MASK
    }

    #[inline(always)]
    fn funct12(&self) -> u32 {
        (self >> 20) & FUNCT12_MASK
    }
}

/// Operation-type tag derived from the major opcode.
///
/// Each RV32I major opcode maps to exactly one encoding format; opcodes
/// without a mapping are illegal and trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Register-register arithmetic.
    R,
    /// Immediate arithmetic, loads, and JALR.
    I,
    /// Stores.
    S,
    /// Conditional branches.
    B,
    /// LUI and AUIPC.
    U,
    /// JAL.
    J,
    /// ECALL, EBREAK, MRET.
    System,
    /// FENCE.
    Fence,
}

/// Maps a 7-bit major opcode to its encoding format.
///
/// Returns `None` for opcodes outside the implemented set; such instructions
/// must raise an illegal-instruction trap, never abort.
pub fn format_of(opcode: u32) -> Option<Format> {
    use crate::isa::privileged::opcodes::OP_SYSTEM;
    use crate::isa::rv32i::opcodes;

    match opcode {
        opcodes::OP_REG => Some(Format::R),
        opcodes::OP_IMM | opcodes::OP_LOAD | opcodes::OP_JALR => Some(Format::I),
        opcodes::OP_STORE => Some(Format::S),
        opcodes::OP_BRANCH => Some(Format::B),
        opcodes::OP_LUI | opcodes::OP_AUIPC => Some(Format::U),
        opcodes::OP_JAL => Some(Format::J),
        OP_SYSTEM => Some(Format::System),
        opcodes::OP_MISC_MEM => Some(Format::Fence),
        _ => None,
    }
}

/// Decoded instruction structure containing all extracted fields.
///
/// Filled in by the decode stage and consumed by the execute, memory, and
/// writeback stages. Fields irrelevant to a given format hold the raw bits
/// that happen to occupy their positions and are simply ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct Decoded {
    /// Raw 32-bit instruction encoding.
    pub raw: u32,
    /// Extracted opcode field.
    pub opcode: u32,
    /// Destination register index.
    pub rd: usize,
    /// First source register index.
    pub rs1: usize,
    /// Second source register index.
    pub rs2: usize,
    /// Function code field 3.
    pub funct3: u32,
    /// Function code field 7.
    pub funct7: u32,
    /// Sign-extended immediate value.
    pub imm: i32,
}
