//! Fluent builder producing RV32I instruction encodings for tests.

use rv32mc_core::isa::instruction::{format_of, Format};
use rv32mc_core::isa::privileged::opcodes::OP_SYSTEM;
use rv32mc_core::isa::rv32i::opcodes::*;

pub struct InstructionBuilder {
    opcode: u32,
    rd: u32,
    funct3: u32,
    rs1: u32,
    rs2: u32,
    funct7: u32,
    imm: i32,
}

impl Default for InstructionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InstructionBuilder {
    pub fn new() -> Self {
        Self {
            opcode: 0,
            rd: 0,
            funct3: 0,
            rs1: 0,
            rs2: 0,
            funct7: 0,
            imm: 0,
        }
    }

    pub fn opcode(mut self, op: u32) -> Self {
        self.opcode = op;
        self
    }

    pub fn funct3(mut self, funct3: u32) -> Self {
        self.funct3 = funct3;
        self
    }

    // --- Helpers for Common Instructions ---

    pub fn add(mut self, rd: u32, rs1: u32, rs2: u32) -> Self {
        self.opcode = OP_REG;
        self.rd = rd;
        self.rs1 = rs1;
        self.rs2 = rs2;
        self.funct3 = 0b000;
        self.funct7 = 0b0000000;
        self
    }

    pub fn sub(mut self, rd: u32, rs1: u32, rs2: u32) -> Self {
        self.opcode = OP_REG;
        self.rd = rd;
        self.rs1 = rs1;
        self.rs2 = rs2;
        self.funct3 = 0b000;
        self.funct7 = 0b0100000;
        self
    }

    pub fn sll(mut self, rd: u32, rs1: u32, rs2: u32) -> Self {
        self.opcode = OP_REG;
        self.rd = rd;
        self.rs1 = rs1;
        self.rs2 = rs2;
        self.funct3 = 0b001;
        self.funct7 = 0b0000000;
        self
    }

    pub fn slt(mut self, rd: u32, rs1: u32, rs2: u32) -> Self {
        self.opcode = OP_REG;
        self.rd = rd;
        self.rs1 = rs1;
        self.rs2 = rs2;
        self.funct3 = 0b010;
        self.funct7 = 0b0000000;
        self
    }

    pub fn sltu(mut self, rd: u32, rs1: u32, rs2: u32) -> Self {
        self.opcode = OP_REG;
        self.rd = rd;
        self.rs1 = rs1;
        self.rs2 = rs2;
        self.funct3 = 0b011;
        self.funct7 = 0b0000000;
        self
    }

    pub fn sra(mut self, rd: u32, rs1: u32, rs2: u32) -> Self {
        self.opcode = OP_REG;
        self.rd = rd;
        self.rs1 = rs1;
        self.rs2 = rs2;
        self.funct3 = 0b101;
        self.funct7 = 0b0100000;
        self
    }

    pub fn addi(mut self, rd: u32, rs1: u32, imm: i32) -> Self {
        self.opcode = OP_IMM;
        self.rd = rd;
        self.rs1 = rs1;
        self.funct3 = 0b000;
        self.imm = imm;
        self
    }

    pub fn xori(mut self, rd: u32, rs1: u32, imm: i32) -> Self {
        self.opcode = OP_IMM;
        self.rd = rd;
        self.rs1 = rs1;
        self.funct3 = 0b100;
        self.imm = imm;
        self
    }

    pub fn ori(mut self, rd: u32, rs1: u32, imm: i32) -> Self {
        self.opcode = OP_IMM;
        self.rd = rd;
        self.rs1 = rs1;
        self.funct3 = 0b110;
        self.imm = imm;
        self
    }

    pub fn andi(mut self, rd: u32, rs1: u32, imm: i32) -> Self {
        self.opcode = OP_IMM;
        self.rd = rd;
        self.rs1 = rs1;
        self.funct3 = 0b111;
        self.imm = imm;
        self
    }

    pub fn slli(mut self, rd: u32, rs1: u32, shamt: u32) -> Self {
        self.opcode = OP_IMM;
        self.rd = rd;
        self.rs1 = rs1;
        self.funct3 = 0b001;
        self.imm = shamt as i32;
        self
    }

    pub fn srai(mut self, rd: u32, rs1: u32, shamt: u32) -> Self {
        self.opcode = OP_IMM;
        self.rd = rd;
        self.rs1 = rs1;
        self.funct3 = 0b101;
        self.imm = ((0b0100000 << 5) | shamt) as i32;
        self
    }

    pub fn lui(mut self, rd: u32, imm: i32) -> Self {
        self.opcode = OP_LUI;
        self.rd = rd;
        self.imm = imm;
        self
    }

    pub fn auipc(mut self, rd: u32, imm: i32) -> Self {
        self.opcode = OP_AUIPC;
        self.rd = rd;
        self.imm = imm;
        self
    }

    pub fn lw(mut self, rd: u32, rs1: u32, imm: i32) -> Self {
        self.opcode = OP_LOAD;
        self.rd = rd;
        self.rs1 = rs1;
        self.funct3 = 0b010;
        self.imm = imm;
        self
    }

    pub fn lb(mut self, rd: u32, rs1: u32, imm: i32) -> Self {
        self.opcode = OP_LOAD;
        self.rd = rd;
        self.rs1 = rs1;
        self.funct3 = 0b000;
        self.imm = imm;
        self
    }

    pub fn lbu(mut self, rd: u32, rs1: u32, imm: i32) -> Self {
        self.opcode = OP_LOAD;
        self.rd = rd;
        self.rs1 = rs1;
        self.funct3 = 0b100;
        self.imm = imm;
        self
    }

    pub fn sw(mut self, rs1: u32, rs2: u32, imm: i32) -> Self {
        self.opcode = OP_STORE;
        self.rs1 = rs1;
        self.rs2 = rs2;
        self.funct3 = 0b010;
        self.imm = imm;
        self
    }

    pub fn sb(mut self, rs1: u32, rs2: u32, imm: i32) -> Self {
        self.opcode = OP_STORE;
        self.rs1 = rs1;
        self.rs2 = rs2;
        self.funct3 = 0b000;
        self.imm = imm;
        self
    }

    pub fn beq(mut self, rs1: u32, rs2: u32, imm: i32) -> Self {
        self.opcode = OP_BRANCH;
        self.rs1 = rs1;
        self.rs2 = rs2;
        self.funct3 = 0b000;
        self.imm = imm;
        self
    }

    pub fn bne(mut self, rs1: u32, rs2: u32, imm: i32) -> Self {
        self.opcode = OP_BRANCH;
        self.rs1 = rs1;
        self.rs2 = rs2;
        self.funct3 = 0b001;
        self.imm = imm;
        self
    }

    pub fn bge(mut self, rs1: u32, rs2: u32, imm: i32) -> Self {
        self.opcode = OP_BRANCH;
        self.rs1 = rs1;
        self.rs2 = rs2;
        self.funct3 = 0b101;
        self.imm = imm;
        self
    }

    pub fn jal(mut self, rd: u32, imm: i32) -> Self {
        self.opcode = OP_JAL;
        self.rd = rd;
        self.imm = imm;
        self
    }

    pub fn jalr(mut self, rd: u32, rs1: u32, imm: i32) -> Self {
        self.opcode = OP_JALR;
        self.rd = rd;
        self.rs1 = rs1;
        self.funct3 = 0b000;
        self.imm = imm;
        self
    }

    pub fn ecall(mut self) -> Self {
        self.opcode = OP_SYSTEM;
        self.funct3 = 0;
        self.imm = 0;
        self
    }

    pub fn ebreak(mut self) -> Self {
        self.opcode = OP_SYSTEM;
        self.funct3 = 0;
        self.imm = 1;
        self
    }

    pub fn csrrw(mut self, rd: u32, csr: u32, rs1: u32) -> Self {
        self.opcode = OP_SYSTEM;
        self.rd = rd;
        self.rs1 = rs1;
        self.funct3 = 0b001;
        self.imm = csr as i32;
        self
    }

    pub fn csrrs(mut self, rd: u32, csr: u32, rs1: u32) -> Self {
        self.opcode = OP_SYSTEM;
        self.rd = rd;
        self.rs1 = rs1;
        self.funct3 = 0b010;
        self.imm = csr as i32;
        self
    }

    pub fn csrrc(mut self, rd: u32, csr: u32, rs1: u32) -> Self {
        self.opcode = OP_SYSTEM;
        self.rd = rd;
        self.rs1 = rs1;
        self.funct3 = 0b011;
        self.imm = csr as i32;
        self
    }

    /// CSRRWI: the rs1 field carries the 5-bit immediate source.
    pub fn csrrwi(mut self, rd: u32, csr: u32, uimm: u32) -> Self {
        self.opcode = OP_SYSTEM;
        self.rd = rd;
        self.rs1 = uimm & 0x1F;
        self.funct3 = 0b101;
        self.imm = csr as i32;
        self
    }

    pub fn csrrci(mut self, rd: u32, csr: u32, uimm: u32) -> Self {
        self.opcode = OP_SYSTEM;
        self.rd = rd;
        self.rs1 = uimm & 0x1F;
        self.funct3 = 0b111;
        self.imm = csr as i32;
        self
    }

    /// Assembles the instruction word per the opcode's encoding format.
    pub fn build(self) -> u32 {
        let imm = self.imm as u32;
        match format_of(self.opcode) {
            Some(Format::R) => {
                self.opcode
                    | (self.rd << 7)
                    | (self.funct3 << 12)
                    | (self.rs1 << 15)
                    | (self.rs2 << 20)
                    | (self.funct7 << 25)
            }
            Some(Format::I) | Some(Format::System) | Some(Format::Fence) => {
                self.opcode
                    | (self.rd << 7)
                    | (self.funct3 << 12)
                    | (self.rs1 << 15)
                    | ((imm & 0xFFF) << 20)
            }
            Some(Format::S) => {
                self.opcode
                    | ((imm & 0x1F) << 7)
                    | (self.funct3 << 12)
                    | (self.rs1 << 15)
                    | (self.rs2 << 20)
                    | (((imm >> 5) & 0x7F) << 25)
            }
            Some(Format::B) => {
                self.opcode
                    | (((imm >> 11) & 1) << 7)
                    | (((imm >> 1) & 0xF) << 8)
                    | (self.funct3 << 12)
                    | (self.rs1 << 15)
                    | (self.rs2 << 20)
                    | (((imm >> 5) & 0x3F) << 25)
                    | (((imm >> 12) & 1) << 31)
            }
            Some(Format::U) => self.opcode | (self.rd << 7) | (imm & 0xFFFF_F000),
            Some(Format::J) => {
                self.opcode
                    | (self.rd << 7)
                    | (((imm >> 12) & 0xFF) << 12)
                    | (((imm >> 11) & 1) << 20)
                    | (((imm >> 1) & 0x3FF) << 21)
                    | (((imm >> 20) & 1) << 31)
            }
            None => self.opcode,
        }
    }
}
