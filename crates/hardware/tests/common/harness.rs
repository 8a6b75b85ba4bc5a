//! Test harness: one core against a RAM-backed bus.

use std::sync::Arc;

use rv32mc_core::common::Trap;
use rv32mc_core::core::trap::{HaltOnTrap, TrapHandler};
use rv32mc_core::core::{Core, PipelineState};
use rv32mc_core::soc::devices::RamDevice;
use rv32mc_core::soc::memory::{PERM_EXEC, PERM_READ, PERM_WRITE};
use rv32mc_core::soc::Bus;

/// Base of the test machine's RAM.
pub const RAM_BASE: u32 = 0x2000_0000;
/// Size of the test machine's RAM.
pub const RAM_SIZE: u32 = 4 * 1024 * 1024;
/// A convenient read-write data region away from test code.
pub const DATA_BASE: u32 = 0x2020_0000;

/// One core, one RAM, one bus.
pub struct TestContext {
    pub bus: Arc<Bus>,
    pub core: Core,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let bus = Arc::new(Bus::new());
        bus.add_device(Box::new(RamDevice::new("RAM0", RAM_BASE, RAM_SIZE)));
        let core = Core::new(0, RAM_BASE, 4);
        Self { bus, core }
    }

    /// Loads instruction words at `addr` (readable and executable) and
    /// points the PC there.
    pub fn load_program(self, addr: u32, instructions: &[u32]) -> Self {
        let bytes: Vec<u8> = instructions
            .iter()
            .flat_map(|word| word.to_le_bytes())
            .collect();
        self.bus
            .load_segment(addr, &bytes, PERM_READ | PERM_EXEC)
            .expect("program placement");
        let mut ctx = self;
        ctx.core.pc = addr;
        ctx
    }

    /// Makes `len` bytes at `addr` readable and writable.
    pub fn map_data(self, addr: u32, len: u32) -> Self {
        self.bus
            .map_region(addr, len, PERM_READ | PERM_WRITE)
            .expect("data mapping");
        self
    }

    /// Sets a general-purpose register value.
    pub fn set_reg(&mut self, reg: usize, val: u32) {
        self.core.gpr.write(reg, val);
    }

    /// Reads a general-purpose register value.
    pub fn get_reg(&self, reg: usize) -> u32 {
        self.core.gpr.read(reg)
    }

    /// Runs `count` whole instructions; any trap halts the core.
    pub fn run_instructions(&mut self, count: usize) {
        let mut handler = HaltOnTrap;
        for _ in 0..count {
            if self.core.halted() {
                break;
            }
            self.core.step_instruction(&self.bus, &mut handler);
        }
    }

    /// Runs whole instructions through `handler` until the core halts or
    /// `max` instructions have retired.
    pub fn run_with_handler(&mut self, handler: &mut dyn TrapHandler, max: usize) {
        for _ in 0..max {
            if self.core.halted() {
                break;
            }
            self.core.step_instruction(&self.bus, handler);
        }
    }

    /// The cause of the most recent trap, if the core is (or halted while)
    /// servicing one.
    pub fn trap_cause(&self) -> Option<Trap> {
        self.core.trap_frame().cause
    }

    /// Asserts the core halted on the given trap cause.
    pub fn assert_trapped(&self, expected: Trap) {
        assert!(self.core.halted(), "core still running");
        assert_eq!(self.trap_cause(), Some(expected));
    }

    /// Steps single stages until the next instruction boundary.
    pub fn finish_instruction(&mut self) {
        let mut handler = HaltOnTrap;
        while !self.core.halted() && self.core.state() != PipelineState::Fetch {
            self.core.step(&self.bus, &mut handler);
        }
    }
}
