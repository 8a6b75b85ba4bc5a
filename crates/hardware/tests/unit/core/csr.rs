//! Zicsr instruction tests: read/write, set/clear, and immediate forms.

use pretty_assertions::assert_eq;
use rv32mc_core::common::Trap;
use rv32mc_core::core::Core;
use rv32mc_core::isa::privileged::csr;

use crate::common::builder::instruction::InstructionBuilder;
use crate::common::harness::{TestContext, RAM_BASE};

#[test]
fn csrrs_with_x0_reads_the_hart_id() {
    let prog = [InstructionBuilder::new().csrrs(5, csr::MHARTID, 0).build()];
    let mut ctx = TestContext::new().load_program(RAM_BASE, &prog);
    // Same machine, but the core under test is hart 3.
    ctx.core = Core::new(3, RAM_BASE, 4);

    ctx.run_instructions(1);

    assert!(!ctx.core.halted());
    assert_eq!(ctx.get_reg(5), 3);
}

#[test]
fn csrrw_returns_the_old_value_and_installs_the_new() {
    let prog = [
        InstructionBuilder::new().csrrw(5, csr::MSCRATCH, 1).build(),
        InstructionBuilder::new().csrrs(6, csr::MSCRATCH, 0).build(),
    ];
    let mut ctx = TestContext::new().load_program(RAM_BASE, &prog);
    ctx.set_reg(1, 0xABCD);

    ctx.run_instructions(2);

    assert!(!ctx.core.halted());
    assert_eq!(ctx.get_reg(5), 0, "mscratch resets to zero");
    assert_eq!(ctx.get_reg(6), 0xABCD);
    assert_eq!(ctx.core.csrs.mscratch, 0xABCD);
}

#[test]
fn immediate_forms_write_and_clear_bits() {
    let prog = [
        InstructionBuilder::new().csrrwi(0, csr::MSCRATCH, 0x1F).build(),
        InstructionBuilder::new().csrrci(5, csr::MSCRATCH, 0x0A).build(),
        InstructionBuilder::new().csrrs(6, csr::MSCRATCH, 0).build(),
    ];
    let mut ctx = TestContext::new().load_program(RAM_BASE, &prog);

    ctx.run_instructions(3);

    assert!(!ctx.core.halted());
    assert_eq!(ctx.get_reg(5), 0x1F, "old value before the clear");
    assert_eq!(ctx.get_reg(6), 0x15);
}

#[test]
fn csrrc_clears_only_the_masked_bits() {
    let prog = [
        InstructionBuilder::new().csrrw(0, csr::MSCRATCH, 1).build(),
        InstructionBuilder::new().csrrc(5, csr::MSCRATCH, 2).build(),
        InstructionBuilder::new().csrrs(6, csr::MSCRATCH, 0).build(),
    ];
    let mut ctx = TestContext::new().load_program(RAM_BASE, &prog);
    ctx.set_reg(1, 0xF0F0);
    ctx.set_reg(2, 0x00F0);

    ctx.run_instructions(3);

    assert!(!ctx.core.halted());
    assert_eq!(ctx.get_reg(5), 0xF0F0);
    assert_eq!(ctx.get_reg(6), 0xF000);
}

#[test]
fn misa_advertises_a_32_bit_base_with_i() {
    let prog = [InstructionBuilder::new().csrrs(5, csr::MISA, 0).build()];
    let mut ctx = TestContext::new().load_program(RAM_BASE, &prog);

    ctx.run_instructions(1);

    assert!(!ctx.core.halted());
    assert_eq!(ctx.get_reg(5), csr::MISA_RV32I);
}

#[test]
fn access_to_an_unimplemented_csr_traps() {
    let inst = InstructionBuilder::new().csrrs(5, 0x7C0, 0).build();
    let mut ctx = TestContext::new().load_program(RAM_BASE, &[inst]);

    ctx.run_instructions(1);
    ctx.assert_trapped(Trap::IllegalInstruction(inst));
}

#[test]
fn write_to_a_read_only_csr_traps() {
    let inst = InstructionBuilder::new().csrrw(5, csr::MHARTID, 1).build();
    let mut ctx = TestContext::new().load_program(RAM_BASE, &[inst]);
    ctx.set_reg(1, 9);

    ctx.run_instructions(1);
    ctx.assert_trapped(Trap::IllegalInstruction(inst));
}
