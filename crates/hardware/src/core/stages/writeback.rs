//! Writeback (WB) Stage.
//!
//! This module implements the final stage of the instruction cycle. It
//! commits the in-flight result to the destination register, advances the
//! PC (sequentially or to a resolved jump target), and returns the pipeline
//! to fetch. Taken jumps discard the prefetch buffer since its words belong
//! to the not-taken path.

use crate::core::{Core, PipelineState};

/// Executes the writeback stage.
///
/// # Arguments
///
/// * `core` - The core to advance.
pub fn writeback_stage(core: &mut Core) {
    if core.inflight.write_rd {
        core.gpr.write(core.inflight.decoded.rd, core.inflight.result);
    }

    if core.inflight.is_jump {
        core.pc = core.inflight.jump_target;
        core.prefetch.clear();
    } else {
        core.pc = core.pc.wrapping_add(4);
    }

    core.state = PipelineState::Fetch;
}
