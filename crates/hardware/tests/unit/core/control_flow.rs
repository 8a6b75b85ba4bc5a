//! Branches, jumps, and PC management, including the prefetch buffer's
//! behavior across redirects.

use pretty_assertions::assert_eq;

use crate::common::builder::instruction::InstructionBuilder;
use crate::common::harness::{TestContext, RAM_BASE};

fn nop() -> u32 {
    InstructionBuilder::new().addi(0, 0, 0).build()
}

#[test]
fn taken_branch_skips_the_fallthrough() {
    let prog = [
        InstructionBuilder::new().beq(1, 2, 8).build(),
        InstructionBuilder::new().addi(3, 0, 1).build(),
        InstructionBuilder::new().addi(4, 0, 2).build(),
    ];
    let mut ctx = TestContext::new().load_program(RAM_BASE, &prog);
    ctx.set_reg(1, 5);
    ctx.set_reg(2, 5);

    ctx.run_instructions(2);
    assert_eq!(ctx.get_reg(3), 0, "skipped instruction must not execute");
    assert_eq!(ctx.get_reg(4), 2);
}

#[test]
fn untaken_branch_falls_through() {
    let prog = [
        InstructionBuilder::new().bne(1, 2, 8).build(),
        InstructionBuilder::new().addi(3, 0, 1).build(),
    ];
    let mut ctx = TestContext::new().load_program(RAM_BASE, &prog);
    ctx.set_reg(1, 5);
    ctx.set_reg(2, 5);

    ctx.run_instructions(2);
    assert_eq!(ctx.get_reg(3), 1);
    assert_eq!(ctx.core.pc, RAM_BASE + 8);
}

#[test]
fn bge_takes_on_equal_operands() {
    let prog = [
        InstructionBuilder::new().bge(1, 2, 8).build(),
        InstructionBuilder::new().addi(3, 0, 1).build(),
        InstructionBuilder::new().addi(4, 0, 2).build(),
    ];
    let mut ctx = TestContext::new().load_program(RAM_BASE, &prog);
    ctx.set_reg(1, 7);
    ctx.set_reg(2, 7);

    ctx.run_instructions(2);
    assert_eq!(ctx.get_reg(3), 0);
    assert_eq!(ctx.get_reg(4), 2);
}

#[test]
fn jal_links_and_redirects() {
    let prog = [
        InstructionBuilder::new().jal(1, 12).build(),
        nop(),
        nop(),
        InstructionBuilder::new().addi(5, 0, 9).build(),
    ];
    let mut ctx = TestContext::new().load_program(RAM_BASE, &prog);

    ctx.run_instructions(1);
    assert_eq!(ctx.get_reg(1), RAM_BASE + 4);
    assert_eq!(ctx.core.pc, RAM_BASE + 12);

    // The words prefetched past the jump must not leak into execution.
    ctx.run_instructions(1);
    assert_eq!(ctx.get_reg(5), 9);
}

#[test]
fn jalr_clears_the_low_target_bit() {
    let prog = [
        InstructionBuilder::new().jalr(2, 1, 0).build(),
        nop(),
        InstructionBuilder::new().addi(3, 0, 4).build(),
    ];
    let mut ctx = TestContext::new().load_program(RAM_BASE, &prog);
    ctx.set_reg(1, RAM_BASE + 9);

    ctx.run_instructions(2);
    assert_eq!(ctx.get_reg(2), RAM_BASE + 4);
    assert_eq!(ctx.get_reg(3), 4);
}

#[test]
fn backward_branch_loops_to_completion() {
    let prog = [
        InstructionBuilder::new().addi(1, 0, 3).build(),
        InstructionBuilder::new().addi(1, 1, -1).build(),
        InstructionBuilder::new().bne(1, 0, -4).build(),
    ];
    let mut ctx = TestContext::new().load_program(RAM_BASE, &prog);

    // 1 setup + 3 iterations of (decrement, branch).
    ctx.run_instructions(7);
    assert_eq!(ctx.get_reg(1), 0);
    assert_eq!(ctx.core.pc, RAM_BASE + 12);
}
