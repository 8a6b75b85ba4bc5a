//! Execute (EX) Stage.
//!
//! This module implements the third stage of the instruction cycle. It
//! performs the following:
//! 1. **Arithmetic Execution:** ALU operations for R- and I-type
//!    instructions, with two's-complement wraparound and RV32 shift-amount
//!    masking.
//! 2. **Branch Resolution:** Evaluates branch conditions and computes jump
//!    targets.
//! 3. **Address Generation:** Computes effective addresses for loads and
//!    stores, deferred to the memory stage.
//! 4. **System Execution:** ECALL, EBREAK, MRET, and the Zicsr register
//!    accesses.
//!
//! Every undecodable opcode/funct combination raises an
//! illegal-instruction trap; nothing on this path aborts the process.

use crate::common::Trap;
use crate::core::{Core, PipelineState};
use crate::isa::instruction::InstructionBits;
use crate::isa::privileged::opcodes as sys_ops;
use crate::isa::rv32i::{funct3, funct7, opcodes};

/// Bit mask to clear the lowest bit of `JALR` target addresses.
const JALR_ALIGNMENT_MASK: u32 = !1;

/// Mask restricting shift amounts to 0-31.
const SHIFT_AMOUNT_MASK: u32 = 31;

/// Executes the instruction execute stage.
///
/// Consumes the decoded record, computes results and control-flow decisions
/// into the in-flight record, and advances to the memory stage (or diverts
/// to TRAP for system instructions and illegal encodings).
///
/// # Arguments
///
/// * `core` - The core to advance.
pub fn execute_stage(core: &mut Core) {
    let d = core.inflight.decoded;
    let rs1 = core.inflight.rs1_val;
    let rs2 = core.inflight.rs2_val;
    let imm = d.imm;
    let pc = core.pc;

    match d.opcode {
        opcodes::OP_LUI => {
            core.inflight.result = imm as u32;
            core.inflight.write_rd = true;
        }
        opcodes::OP_AUIPC => {
            core.inflight.result = pc.wrapping_add(imm as u32);
            core.inflight.write_rd = true;
        }
        opcodes::OP_JAL => {
            core.inflight.result = pc.wrapping_add(4);
            core.inflight.write_rd = true;
            core.inflight.is_jump = true;
            core.inflight.jump_target = pc.wrapping_add(imm as u32);
        }
        opcodes::OP_JALR => {
            if d.funct3 != 0 {
                core.raise(Trap::IllegalInstruction(d.raw));
                return;
            }
            core.inflight.result = pc.wrapping_add(4);
            core.inflight.write_rd = true;
            core.inflight.is_jump = true;
            core.inflight.jump_target = rs1.wrapping_add(imm as u32) & JALR_ALIGNMENT_MASK;
        }
        opcodes::OP_BRANCH => {
            let taken = match d.funct3 {
                funct3::BEQ => rs1 == rs2,
                funct3::BNE => rs1 != rs2,
                funct3::BLT => (rs1 as i32) < (rs2 as i32),
                funct3::BGE => (rs1 as i32) >= (rs2 as i32),
                funct3::BLTU => rs1 < rs2,
                funct3::BGEU => rs1 >= rs2,
                _ => {
                    core.raise(Trap::IllegalInstruction(d.raw));
                    return;
                }
            };
            core.inflight.is_jump = taken;
            core.inflight.jump_target = pc.wrapping_add(imm as u32);
        }
        opcodes::OP_LOAD => {
            if !matches!(
                d.funct3,
                funct3::LB | funct3::LH | funct3::LW | funct3::LBU | funct3::LHU
            ) {
                core.raise(Trap::IllegalInstruction(d.raw));
                return;
            }
            core.inflight.mem_addr = rs1.wrapping_add(imm as u32);
            core.inflight.read_mem = true;
            core.inflight.write_rd = true;
        }
        opcodes::OP_STORE => {
            if !matches!(d.funct3, funct3::SB | funct3::SH | funct3::SW) {
                core.raise(Trap::IllegalInstruction(d.raw));
                return;
            }
            core.inflight.mem_addr = rs1.wrapping_add(imm as u32);
            core.inflight.write_mem = true;
        }
        opcodes::OP_IMM => {
            let result = match d.funct3 {
                funct3::ADD_SUB => rs1.wrapping_add(imm as u32),
                funct3::SLT => u32::from((rs1 as i32) < imm),
                funct3::SLTU => u32::from(rs1 < imm as u32),
                funct3::XOR => rs1 ^ imm as u32,
                funct3::OR => rs1 | imm as u32,
                funct3::AND => rs1 & imm as u32,
                funct3::SLL => {
                    if d.funct7 != funct7::DEFAULT {
                        core.raise(Trap::IllegalInstruction(d.raw));
                        return;
                    }
                    // The shift amount is the rs2 field of the encoding.
                    rs1 << (d.rs2 as u32 & SHIFT_AMOUNT_MASK)
                }
                funct3::SRL_SRA => match d.funct7 {
                    funct7::DEFAULT => rs1 >> (d.rs2 as u32 & SHIFT_AMOUNT_MASK),
                    funct7::SRA => ((rs1 as i32) >> (d.rs2 as u32 & SHIFT_AMOUNT_MASK)) as u32,
                    _ => {
                        core.raise(Trap::IllegalInstruction(d.raw));
                        return;
                    }
                },
                _ => {
                    core.raise(Trap::IllegalInstruction(d.raw));
                    return;
                }
            };
            core.inflight.result = result;
            core.inflight.write_rd = true;
        }
        opcodes::OP_REG => {
            let result = match (d.funct3, d.funct7) {
                (funct3::ADD_SUB, funct7::DEFAULT) => rs1.wrapping_add(rs2),
                (funct3::ADD_SUB, funct7::SUB) => rs1.wrapping_sub(rs2),
                (funct3::SLL, funct7::DEFAULT) => rs1 << (rs2 & SHIFT_AMOUNT_MASK),
                (funct3::SLT, funct7::DEFAULT) => u32::from((rs1 as i32) < (rs2 as i32)),
                (funct3::SLTU, funct7::DEFAULT) => u32::from(rs1 < rs2),
                (funct3::XOR, funct7::DEFAULT) => rs1 ^ rs2,
                (funct3::SRL_SRA, funct7::DEFAULT) => rs1 >> (rs2 & SHIFT_AMOUNT_MASK),
                (funct3::SRL_SRA, funct7::SRA) => {
                    ((rs1 as i32) >> (rs2 & SHIFT_AMOUNT_MASK)) as u32
                }
                (funct3::OR, funct7::DEFAULT) => rs1 | rs2,
                (funct3::AND, funct7::DEFAULT) => rs1 & rs2,
                _ => {
                    core.raise(Trap::IllegalInstruction(d.raw));
                    return;
                }
            };
            core.inflight.result = result;
            core.inflight.write_rd = true;
        }
        opcodes::OP_MISC_MEM => {
            // FENCE is a no-op: the bus already serializes all traffic.
        }
        sys_ops::OP_SYSTEM => match d.funct3 {
            0 => match d.raw.funct12() {
                sys_ops::FUNCT12_ECALL => {
                    core.raise(Trap::EnvironmentCall);
                    return;
                }
                sys_ops::FUNCT12_EBREAK => {
                    core.raise(Trap::Breakpoint(pc));
                    return;
                }
                sys_ops::FUNCT12_MRET => {
                    core.inflight.is_jump = true;
                    core.inflight.jump_target = core.csrs.mepc;
                }
                _ => {
                    core.raise(Trap::IllegalInstruction(d.raw));
                    return;
                }
            },
            sys_ops::FUNCT3_CSRRW
            | sys_ops::FUNCT3_CSRRS
            | sys_ops::FUNCT3_CSRRC
            | sys_ops::FUNCT3_CSRRWI
            | sys_ops::FUNCT3_CSRRSI
            | sys_ops::FUNCT3_CSRRCI => {
                let csr = d.raw.funct12();
                // Immediate forms repurpose the rs1 field as a 5-bit
                // zero-extended source.
                let src = if d.funct3 & 0b100 != 0 {
                    d.rs1 as u32
                } else {
                    rs1
                };
                let Some(old) = core.csrs.read(csr) else {
                    core.raise(Trap::IllegalInstruction(d.raw));
                    return;
                };
                // CSRRS/CSRRC with rs1 field x0 read without writing, so
                // read-only registers stay accessible that way.
                let new = match d.funct3 & 0b011 {
                    0b01 => Some(src),
                    0b10 => (d.rs1 != 0).then_some(old | src),
                    _ => (d.rs1 != 0).then_some(old & !src),
                };
                if let Some(value) = new {
                    if !core.csrs.write(csr, value) {
                        core.raise(Trap::IllegalInstruction(d.raw));
                        return;
                    }
                }
                core.inflight.result = old;
                core.inflight.write_rd = true;
            }
            _ => {
                core.raise(Trap::IllegalInstruction(d.raw));
                return;
            }
        },
        _ => {
            core.raise(Trap::IllegalInstruction(d.raw));
            return;
        }
    }

    core.state = PipelineState::Memory;
}
