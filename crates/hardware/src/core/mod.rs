//! Emulated Processor Core.
//!
//! This module implements one hardware thread as a cycle-stepped state
//! machine. Each call to [`Core::step`] advances exactly one pipeline stage:
//!
//! ```text
//! FETCH -> DECODE -> EXECUTE -> MEMORY -> WRITEBACK -> (FETCH | TRAP)
//! ```
//!
//! Any stage that detects an illegal condition transitions to TRAP, which
//! runs its own enter/handle/exit sub-machine (see [`trap`]). Registers, CSRs
//! and the prefetch buffer are core-local; all shared state is reached
//! through the [`Bus`].

use std::collections::VecDeque;

use crate::common::Trap;
use crate::core::arch::{Csrs, Gpr};
use crate::core::trap::{TrapFrame, TrapHandler, TrapState};
use crate::isa::instruction::Decoded;
use crate::soc::Bus;

/// Architectural register state.
pub mod arch;

/// Pipeline stage implementations.
pub mod stages;

/// Trap entry/handle/exit machinery.
pub mod trap;

/// The pipeline stage a core is about to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    /// Fetch the next instruction word.
    #[default]
    Fetch,
    /// Decode the fetched word and read source registers.
    Decode,
    /// Compute ALU results, branch conditions, and memory addresses.
    Execute,
    /// Perform the load or store, if the instruction has one.
    Memory,
    /// Commit register results and advance the PC.
    Writeback,
    /// Run the trap sub-machine.
    Trap,
}

/// The record an instruction accumulates as it traverses the pipeline.
///
/// Valid only between DECODE and WRITEBACK of the same instruction; each
/// FETCH effectively begins a fresh record.
#[derive(Debug, Clone, Copy, Default)]
pub struct InFlight {
    /// Structural fields extracted by the decoder.
    pub decoded: Decoded,
    /// Value of `rs1` read at decode time.
    pub rs1_val: u32,
    /// Value of `rs2` read at decode time.
    pub rs2_val: u32,
    /// ALU result, link address, or loaded value destined for `rd`.
    pub result: u32,
    /// Effective address for a load or store.
    pub mem_addr: u32,
    /// Target PC if `is_jump` is set.
    pub jump_target: u32,
    /// Whether writeback redirects the PC to `jump_target`.
    pub is_jump: bool,
    /// Whether writeback commits `result` to `rd`.
    pub write_rd: bool,
    /// Whether the memory stage performs a load.
    pub read_mem: bool,
    /// Whether the memory stage performs a store.
    pub write_mem: bool,
}

/// One emulated hardware thread.
///
/// A core owns its registers, CSRs, pipeline state, and prefetch buffer.
/// It is mutated only by its own thread; cores interact exclusively through
/// the shared bus.
pub struct Core {
    /// Hart ID, also visible to the guest through `mhartid`.
    pub id: u32,
    /// Program counter.
    pub pc: u32,
    /// General-purpose registers.
    pub gpr: Gpr,
    /// Machine-mode CSRs.
    pub csrs: Csrs,
    /// Cycles executed so far (one per stage step).
    pub cycles: u64,
    pub(crate) state: PipelineState,
    /// Raw instruction word produced by the fetch stage.
    pub(crate) fetched: u32,
    pub(crate) inflight: InFlight,
    /// Instruction words fetched ahead, in PC order.
    pub(crate) prefetch: VecDeque<u32>,
    /// Guest address of the word at the front of `prefetch`.
    pub(crate) prefetch_pc: u32,
    prefetch_depth: u32,
    pub(crate) trap: TrapFrame,
    halted: bool,
}

impl Core {
    /// Creates core `id` with the PC at `entry` and a prefetch buffer of
    /// `prefetch_depth` words.
    pub fn new(id: u32, entry: u32, prefetch_depth: u32) -> Self {
        Self {
            id,
            pc: entry,
            gpr: Gpr::new(),
            csrs: Csrs::new(id),
            cycles: 0,
            state: PipelineState::Fetch,
            fetched: 0,
            inflight: InFlight::default(),
            prefetch: VecDeque::new(),
            prefetch_pc: entry,
            prefetch_depth: prefetch_depth.max(1),
            trap: TrapFrame::default(),
            halted: false,
        }
    }

    /// Returns the stage the core will execute on its next step.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Returns whether the core has stopped for good.
    pub fn halted(&self) -> bool {
        self.halted
    }

    /// Permanently stops the core.
    pub fn halt(&mut self) {
        self.halted = true;
    }

    /// Returns the register/PC snapshot of the active trap, if any.
    pub fn trap_frame(&self) -> &TrapFrame {
        &self.trap
    }

    /// Returns the active trap's snapshot mutably.
    ///
    /// The syscall bridge writes its result into the snapshot's `a0` slot;
    /// trap exit then restores it into the live register file.
    pub fn trap_frame_mut(&mut self) -> &mut TrapFrame {
        &mut self.trap
    }

    /// Configured prefetch depth in words.
    pub(crate) fn prefetch_depth(&self) -> u32 {
        self.prefetch_depth
    }

    /// Diverts the pipeline into the trap sub-machine.
    ///
    /// Snapshots registers and the PC, records the cause in the CSRs, and
    /// discards prefetched words (the trap vector is a different stream).
    pub(crate) fn raise(&mut self, cause: Trap) {
        self.trap = TrapFrame {
            state: TrapState::Enter,
            regs: self.gpr.snapshot(),
            pc: self.pc,
            cause: Some(cause),
        };
        self.csrs.mepc = self.pc;
        self.csrs.mcause = cause.cause();
        self.csrs.mtval = cause.value();
        self.prefetch.clear();
        self.state = PipelineState::Trap;
    }

    /// Advances the core by exactly one pipeline stage.
    ///
    /// Does nothing once the core has halted.
    pub fn step(&mut self, bus: &Bus, handler: &mut dyn TrapHandler) {
        if self.halted {
            return;
        }
        self.cycles += 1;
        match self.state {
            PipelineState::Fetch => stages::fetch::fetch_stage(self, bus),
            PipelineState::Decode => stages::decode::decode_stage(self),
            PipelineState::Execute => stages::execute::execute_stage(self),
            PipelineState::Memory => stages::memory::memory_stage(self, bus),
            PipelineState::Writeback => stages::writeback::writeback_stage(self),
            PipelineState::Trap => trap::trap_stage(self, bus, handler),
        }
    }

    /// Steps the core through one whole instruction (until the next FETCH
    /// or until it halts).
    ///
    /// Trap servicing that ends in a resumed guest counts toward the same
    /// call.
    pub fn step_instruction(&mut self, bus: &Bus, handler: &mut dyn TrapHandler) {
        self.step(bus, handler);
        while !self.halted && self.state != PipelineState::Fetch {
            self.step(bus, handler);
        }
    }
}
