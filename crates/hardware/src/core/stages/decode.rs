//! Instruction Decode (ID) Stage.
//!
//! This module implements the second stage of the instruction cycle. It:
//! 1. **Classifies:** Maps the major opcode to its encoding format; opcodes
//!    with no mapping raise an illegal-instruction trap.
//! 2. **Extracts:** Delegates field and immediate extraction to the ISA
//!    decoder.
//! 3. **Reads operands:** Captures `rs1`/`rs2` values at decode time
//!    (register `x0` always reads as zero).

use crate::common::Trap;
use crate::core::{Core, PipelineState};
use crate::isa::decode::decode;
use crate::isa::instruction::format_of;

/// Executes the instruction decode stage.
///
/// # Arguments
///
/// * `core` - The core to advance.
pub fn decode_stage(core: &mut Core) {
    let raw = core.fetched;
    if format_of(raw & 0x7F).is_none() {
        core.raise(Trap::IllegalInstruction(raw));
        return;
    }

    let decoded = decode(raw);
    core.inflight.rs1_val = core.gpr.read(decoded.rs1);
    core.inflight.rs2_val = core.gpr.read(decoded.rs2);
    core.inflight.decoded = decoded;
    core.state = PipelineState::Execute;
}
