//! Instruction Fetch (IF) Stage.
//!
//! This module implements the first stage of the instruction cycle. It is
//! responsible for producing the next instruction word, using a small
//! prefetch buffer to amortize bus transactions: when the buffer is empty
//! (or the PC no longer matches its front), one multi-word bus transaction
//! refills it, and subsequent sequential fetches pop from it without
//! touching the bus.
//!
//! Misaligned, unmapped, and non-executable fetch addresses divert to the
//! trap sub-machine instead of crashing.

use crate::core::{Core, InFlight, PipelineState};
use crate::soc::Bus;

/// Executes the instruction fetch stage.
///
/// Pops the next word from the prefetch buffer when it still tracks the PC;
/// otherwise refills the buffer with one `fetch_block` bus transaction at
/// the current PC. On any bus fault the core transitions to TRAP with the
/// corresponding fetch cause.
///
/// # Arguments
///
/// * `core` - The core to advance.
/// * `bus` - The shared system bus.
pub fn fetch_stage(core: &mut Core, bus: &Bus) {
    if core.prefetch.is_empty() || core.prefetch_pc != core.pc {
        core.prefetch.clear();
        match bus.fetch_block(core.pc, core.prefetch_depth()) {
            Ok(words) => {
                core.prefetch.extend(words);
                core.prefetch_pc = core.pc;
            }
            Err(fault) => {
                core.raise(fault.into_fetch_trap());
                return;
            }
        }
    }

    // The buffer holds at least one word after a successful refill.
    let Some(word) = core.prefetch.pop_front() else {
        core.raise(crate::common::Trap::InstructionAccessFault(core.pc));
        return;
    };
    core.prefetch_pc = core.pc.wrapping_add(4);
    core.fetched = word;
    core.inflight = InFlight::default();
    core.state = PipelineState::Decode;
}
