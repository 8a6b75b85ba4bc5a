//! RV32I instruction decoder.
//!
//! Splits a 32-bit encoding into its fields and reassembles the immediate
//! for whichever of the six base formats (R, I, S, B, U, J) the opcode
//! selects. Decoding is purely structural: register indices and function
//! codes are extracted for every word, and a well-formed encoding with an
//! unsupported opcode/funct combination is only rejected later, by the
//! execute stage.

use crate::isa::instruction::{Decoded, InstructionBits};
use crate::isa::rv32i::opcodes;

/// Width of a base instruction word.
const WORD_BITS: u32 = 32;

/// I-type immediates are the contiguous top 12 bits.
const I_IMM_SHIFT: u32 = 20;

/// U-type immediates arrive already left-aligned; the low 12 bits belong
/// to rd and the opcode.
const U_IMM_MASK: u32 = 0xFFFF_F000;

/// S-type immediates carry 12 significant bits split across two fields.
const S_IMM_BITS: u32 = 12;

/// B-type immediates carry 13 significant bits (bit 0 is implicitly zero).
const B_IMM_BITS: u32 = 13;

/// J-type immediates carry 21 significant bits (bit 0 is implicitly zero).
const J_IMM_BITS: u32 = 21;

/// Decodes one instruction word into its component fields.
///
/// The immediate is sign-extended (or left-aligned for U-type) according
/// to the format implied by the opcode; opcodes with no immediate get 0.
pub fn decode(inst: u32) -> Decoded {
    let opcode = inst.opcode();

    let imm = match opcode {
        opcodes::OP_IMM | opcodes::OP_LOAD | opcodes::OP_JALR => i_type_imm(inst),
        opcodes::OP_STORE => s_type_imm(inst),
        opcodes::OP_BRANCH => b_type_imm(inst),
        opcodes::OP_LUI | opcodes::OP_AUIPC => u_type_imm(inst),
        opcodes::OP_JAL => j_type_imm(inst),
        _ => 0,
    };

    Decoded {
        raw: inst,
        opcode,
        rd: InstructionBits::rd(&inst),
        rs1: InstructionBits::rs1(&inst),
        rs2: InstructionBits::rs2(&inst),
        funct3: InstructionBits::funct3(&inst),
        funct7: InstructionBits::funct7(&inst),
        imm,
    }
}

/// Extracts `count` bits of `inst` starting at `from`, repositioned to
/// `to` within a reassembled immediate.
fn slice(inst: u32, from: u32, count: u32, to: u32) -> u32 {
    ((inst >> from) & ((1 << count) - 1)) << to
}

/// `imm[11:0] | rs1 | funct3 | rd | opcode` (loads, JALR, ALU immediates).
///
/// The arithmetic right shift performs the sign extension.
fn i_type_imm(inst: u32) -> i32 {
    (inst as i32) >> I_IMM_SHIFT
}

/// `imm[11:5] | rs2 | rs1 | funct3 | imm[4:0] | opcode` (stores).
fn s_type_imm(inst: u32) -> i32 {
    let combined = slice(inst, 25, 7, 5) | slice(inst, 7, 5, 0);
    sign_extend(combined, S_IMM_BITS)
}

/// `imm[12|10:5] | rs2 | rs1 | funct3 | imm[4:1|11] | opcode` (branches).
///
/// Branch offsets are even, so bit 0 of the immediate has no encoding
/// slot; the sign bit lands at position 12.
fn b_type_imm(inst: u32) -> i32 {
    let combined = slice(inst, 31, 1, 12)
        | slice(inst, 7, 1, 11)
        | slice(inst, 25, 6, 5)
        | slice(inst, 8, 4, 1);
    sign_extend(combined, B_IMM_BITS)
}

/// `imm[31:12] | rd | opcode` (LUI, AUIPC).
fn u_type_imm(inst: u32) -> i32 {
    (inst & U_IMM_MASK) as i32
}

/// `imm[20|10:1|11|19:12] | rd | opcode` (JAL).
///
/// Like branches, jump offsets are even and omit bit 0; the sign bit
/// lands at position 20.
fn j_type_imm(inst: u32) -> i32 {
    let combined = slice(inst, 31, 1, 20)
        | slice(inst, 12, 8, 12)
        | slice(inst, 20, 1, 11)
        | slice(inst, 21, 10, 1);
    sign_extend(combined, J_IMM_BITS)
}

/// Sign-extends the low `bits` bits of `val` to a full word.
fn sign_extend(val: u32, bits: u32) -> i32 {
    let shift = WORD_BITS - bits;
    ((val as i32) << shift) >> shift
}
