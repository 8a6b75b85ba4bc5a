//! Memory Access (MEM) Stage.
//!
//! This module implements the fourth stage of the instruction cycle. It
//! issues the load or store the execute stage prepared, converts bus faults
//! into the corresponding load/store traps, and applies load sign extension
//! per the access width.

use crate::common::AccessWidth;
use crate::core::{Core, PipelineState};
use crate::isa::rv32i::funct3;
use crate::soc::Bus;

/// Executes the memory access stage.
///
/// Instructions without a memory operation pass straight through to
/// writeback.
///
/// # Arguments
///
/// * `core` - The core to advance.
/// * `bus` - The shared system bus.
pub fn memory_stage(core: &mut Core, bus: &Bus) {
    let d = core.inflight.decoded;
    let addr = core.inflight.mem_addr;

    if core.inflight.read_mem {
        let width = load_width(d.funct3);
        match bus.read(addr, width) {
            Ok(raw) => core.inflight.result = extend_load(d.funct3, raw),
            Err(fault) => {
                core.raise(fault.into_load_trap());
                return;
            }
        }
    } else if core.inflight.write_mem {
        let width = store_width(d.funct3);
        let value = width.mask(core.inflight.rs2_val);
        if let Err(fault) = bus.write(addr, width, value) {
            core.raise(fault.into_store_trap());
            return;
        }
    }

    core.state = PipelineState::Writeback;
}

fn load_width(f3: u32) -> AccessWidth {
    match f3 {
        funct3::LB | funct3::LBU => AccessWidth::Byte,
        funct3::LH | funct3::LHU => AccessWidth::Half,
        _ => AccessWidth::Word,
    }
}

fn store_width(f3: u32) -> AccessWidth {
    match f3 {
        funct3::SB => AccessWidth::Byte,
        funct3::SH => AccessWidth::Half,
        _ => AccessWidth::Word,
    }
}

/// Sign- or zero-extends a loaded value to the register width.
fn extend_load(f3: u32, raw: u32) -> u32 {
    match f3 {
        funct3::LB => raw as u8 as i8 as i32 as u32,
        funct3::LH => raw as u16 as i16 as i32 as u32,
        funct3::LBU => raw & 0xFF,
        funct3::LHU => raw & 0xFFFF,
        _ => raw,
    }
}
