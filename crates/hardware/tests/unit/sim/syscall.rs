//! Syscall bridge tests driven by guest ECALL programs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use rv32mc_core::isa::abi;
use rv32mc_core::sim::syscall::{numbers, SyscallBridge, NO_EXIT};

use crate::common::builder::instruction::InstructionBuilder;
use crate::common::harness::{TestContext, DATA_BASE, RAM_BASE};

fn bridge() -> (SyscallBridge, Arc<AtomicU64>) {
    let exit = Arc::new(AtomicU64::new(NO_EXIT));
    (SyscallBridge::new(Arc::clone(&exit)), exit)
}

#[test]
fn brk_query_reports_the_current_break() {
    let prog = [InstructionBuilder::new().ecall().build()];
    let mut ctx = TestContext::new().load_program(RAM_BASE, &prog);
    ctx.set_reg(abi::REG_A7, numbers::BRK);
    ctx.set_reg(abi::REG_A0, 0);

    let expected = ctx.bus.current_break().expect("break");
    let (mut bridge, _exit) = bridge();
    ctx.run_with_handler(&mut bridge, 1);

    assert!(!ctx.core.halted());
    assert_eq!(ctx.get_reg(abi::REG_A0), expected);
}

#[test]
fn brk_grows_guest_memory() {
    let prog = [InstructionBuilder::new().ecall().build()];
    let mut ctx = TestContext::new().load_program(RAM_BASE, &prog);

    let before = ctx.bus.current_break().expect("break");
    ctx.set_reg(abi::REG_A7, numbers::BRK);
    ctx.set_reg(abi::REG_A0, before + 1024);

    let (mut bridge, _exit) = bridge();
    ctx.run_with_handler(&mut bridge, 1);

    let after = ctx.bus.current_break().expect("break");
    assert!(after >= before + 1024);
    assert_eq!(ctx.get_reg(abi::REG_A0), after);
}

#[test]
fn exit_halts_the_core_and_publishes_the_code() {
    let prog = [
        InstructionBuilder::new().ecall().build(),
        // Must never run.
        InstructionBuilder::new().addi(5, 0, 1).build(),
    ];
    let mut ctx = TestContext::new().load_program(RAM_BASE, &prog);
    ctx.set_reg(abi::REG_A7, numbers::EXIT);
    ctx.set_reg(abi::REG_A0, 7);

    let (mut bridge, exit) = bridge();
    ctx.run_with_handler(&mut bridge, 2);

    assert!(ctx.core.halted());
    assert_eq!(exit.load(Ordering::SeqCst), 7);
    assert_eq!(ctx.get_reg(5), 0);
}

#[test]
fn unknown_syscall_returns_enosys() {
    let prog = [InstructionBuilder::new().ecall().build()];
    let mut ctx = TestContext::new().load_program(RAM_BASE, &prog);
    ctx.set_reg(abi::REG_A7, 9999);

    let (mut bridge, _exit) = bridge();
    ctx.run_with_handler(&mut bridge, 1);

    assert!(!ctx.core.halted());
    assert_eq!(ctx.get_reg(abi::REG_A0), -(libc::ENOSYS) as u32);
}

#[test]
fn write_to_stdout_returns_the_byte_count() {
    let prog = [InstructionBuilder::new().ecall().build()];
    let mut ctx = TestContext::new()
        .load_program(RAM_BASE, &prog)
        .map_data(DATA_BASE, 64);
    ctx.bus
        .write_bytes(DATA_BASE, b"hello\n")
        .expect("guest buffer");
    ctx.set_reg(abi::REG_A7, numbers::WRITE);
    ctx.set_reg(abi::REG_A0, 1);
    ctx.set_reg(abi::REG_A1, DATA_BASE);
    ctx.set_reg(abi::REG_A2, 6);

    let (mut bridge, _exit) = bridge();
    ctx.run_with_handler(&mut bridge, 1);

    assert_eq!(ctx.get_reg(abi::REG_A0), 6);
}

#[test]
fn oversized_write_is_rejected_before_any_transfer() {
    let prog = [InstructionBuilder::new().ecall().build()];
    let mut ctx = TestContext::new()
        .load_program(RAM_BASE, &prog)
        .map_data(DATA_BASE, 64);
    ctx.set_reg(abi::REG_A7, numbers::WRITE);
    ctx.set_reg(abi::REG_A0, 1);
    ctx.set_reg(abi::REG_A1, DATA_BASE);
    // A length no device on this machine could back.
    ctx.set_reg(abi::REG_A2, 0x4000_0000);

    let (mut bridge, _exit) = bridge();
    ctx.run_with_handler(&mut bridge, 1);

    assert_eq!(ctx.get_reg(abi::REG_A0), (-1i32) as u32);
}

#[test]
fn open_of_a_missing_file_fails() {
    let prog = [InstructionBuilder::new().ecall().build()];
    let mut ctx = TestContext::new()
        .load_program(RAM_BASE, &prog)
        .map_data(DATA_BASE, 64);
    ctx.bus
        .write_bytes(DATA_BASE, b"/definitely/not/here\0")
        .expect("guest path");
    ctx.set_reg(abi::REG_A7, numbers::OPEN);
    ctx.set_reg(abi::REG_A0, DATA_BASE);
    ctx.set_reg(abi::REG_A1, 0);

    let (mut bridge, _exit) = bridge();
    ctx.run_with_handler(&mut bridge, 1);

    assert_eq!(ctx.get_reg(abi::REG_A0), (-1i32) as u32);
}
