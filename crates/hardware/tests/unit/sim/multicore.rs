//! Two cores sharing one bus from separate OS threads.
//!
//! Both cores run the same store loop against disjoint words, hammering the
//! bus mutex concurrently. Each word must end up holding exactly its owner's
//! value: transactions from different cores may interleave, but no single
//! access may tear.

use std::sync::Arc;
use std::thread;

use pretty_assertions::assert_eq;
use rv32mc_core::common::{AccessWidth, Trap};
use rv32mc_core::core::trap::HaltOnTrap;
use rv32mc_core::core::Core;
use rv32mc_core::soc::devices::RamDevice;
use rv32mc_core::soc::memory::{PERM_EXEC, PERM_READ, PERM_WRITE};
use rv32mc_core::soc::Bus;

use crate::common::builder::instruction::InstructionBuilder;

const RAM_BASE: u32 = 0x2000_0000;
const DATA: u32 = RAM_BASE + 0x1000;

/// Upper bound on pipeline steps per core; the loop finishes well within it.
const STEP_LIMIT: usize = 10_000;

/// x1 holds the core's slot address, x2 its marker value. The loop stores
/// the marker 64 times, then hits EBREAK.
fn store_loop() -> Vec<u32> {
    vec![
        InstructionBuilder::new().addi(3, 0, 64).build(),
        InstructionBuilder::new().sw(1, 2, 0).build(),
        InstructionBuilder::new().addi(3, 3, -1).build(),
        InstructionBuilder::new().bne(3, 0, -8).build(),
        InstructionBuilder::new().ebreak().build(),
    ]
}

#[test]
fn cores_on_threads_keep_disjoint_stores_isolated() {
    let bus = Arc::new(Bus::new());
    bus.add_device(Box::new(RamDevice::new("RAM0", RAM_BASE, 1024 * 1024)));

    let program: Vec<u8> = store_loop()
        .iter()
        .flat_map(|word| word.to_le_bytes())
        .collect();
    bus.load_segment(RAM_BASE, &program, PERM_READ | PERM_EXEC)
        .expect("program placement");
    bus.map_region(DATA, 64, PERM_READ | PERM_WRITE)
        .expect("data mapping");

    let markers = [0x1111_2222u32, 0x3333_4444];
    let mut cores = Vec::new();
    for (id, marker) in markers.iter().enumerate() {
        let mut core = Core::new(id as u32, RAM_BASE, 4);
        core.gpr.write(1, DATA + 4 * id as u32);
        core.gpr.write(2, *marker);
        cores.push(core);
    }

    let finished: Vec<Core> = thread::scope(|scope| {
        let handles: Vec<_> = cores
            .into_iter()
            .map(|mut core| {
                let bus = Arc::clone(&bus);
                scope.spawn(move || {
                    let mut handler = HaltOnTrap;
                    for _ in 0..STEP_LIMIT {
                        if core.halted() {
                            break;
                        }
                        core.step_instruction(&bus, &mut handler);
                    }
                    core
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("core thread"))
            .collect()
    });

    for core in &finished {
        assert!(core.halted(), "core {} did not finish", core.id);
        assert_eq!(
            core.trap_frame().cause,
            Some(Trap::Breakpoint(RAM_BASE + 16))
        );
    }

    for (id, marker) in markers.iter().enumerate() {
        let word = bus
            .read(DATA + 4 * id as u32, AccessWidth::Word)
            .expect("result word");
        assert_eq!(word, *marker, "core {id} slot corrupted");
    }
}
