//! Trap Handling Logic.
//!
//! This module implements the trap sub-machine entered whenever a pipeline
//! stage detects an illegal condition or an environment call. It performs the
//! following:
//! 1. **Entry:** The register file and PC were snapshotted by
//!    [`Core::raise`]; entry redirects the PC to the single trap vector
//!    (`mtvec`).
//! 2. **Handling:** An external [`TrapHandler`] (in practice the syscall
//!    bridge) inspects the cause via the CSRs and the snapshot, and may
//!    mutate the snapshot's `a0` slot to return a value.
//! 3. **Exit:** The snapshot is restored and the guest resumes at the
//!    instruction after the one that trapped.

use tracing::debug;

use crate::common::Trap;
use crate::core::{Core, PipelineState};
use crate::soc::Bus;

/// Sub-state of the trap machinery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrapState {
    /// No trap in flight.
    #[default]
    None,
    /// Snapshot taken; redirect to the trap vector next.
    Enter,
    /// The external handler runs next.
    Handle,
    /// Restore the snapshot and resume.
    Exit,
}

/// Saved guest context for one trap.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrapFrame {
    /// Where the sub-machine currently is.
    pub state: TrapState,
    /// Register file at the moment the trap was raised.
    ///
    /// Trap exit restores this wholesale, so a handler that wants to return
    /// a value writes it into slot 10 (`a0`) here, not into the live file.
    pub regs: [u32; 32],
    /// PC of the trapping instruction. The guest resumes at `pc + 4`.
    pub pc: u32,
    /// Cause of the trap, `None` when no trap is in flight.
    pub cause: Option<Trap>,
}

/// External collaborator servicing traps.
///
/// Invoked exactly once per trap, during the HANDLE state. Returning `false`
/// halts the core; `true` resumes the guest after the trapping instruction.
pub trait TrapHandler {
    /// Services the trap currently recorded in `core.trap_frame()`.
    fn handle(&mut self, core: &mut Core, bus: &Bus) -> bool;
}

/// A handler that services nothing: every trap halts the core.
///
/// Useful for tests and for running bare programs that must not trap.
pub struct HaltOnTrap;

impl TrapHandler for HaltOnTrap {
    fn handle(&mut self, _core: &mut Core, _bus: &Bus) -> bool {
        false
    }
}

/// Advances the trap sub-machine by one cycle.
pub(crate) fn trap_stage(core: &mut Core, bus: &Bus, handler: &mut dyn TrapHandler) {
    match core.trap.state {
        TrapState::None => {
            // Reachable only through a state-machine bug; recover by
            // resuming fetch rather than wedging the core.
            core.state = PipelineState::Fetch;
        }
        TrapState::Enter => {
            debug!(
                core = core.id,
                cause = ?core.trap.cause,
                epc = format_args!("{:#010x}", core.trap.pc),
                "trap entered"
            );
            // The low two bits of mtvec encode the vectoring mode; the
            // handler base itself is 4-byte aligned.
            core.pc = core.csrs.mtvec & !3;
            core.trap.state = TrapState::Handle;
        }
        TrapState::Handle => {
            let resume = handler.handle(core, bus);
            if resume {
                core.trap.state = TrapState::Exit;
            } else {
                debug!(core = core.id, "trap handler requested halt");
                core.halt();
            }
        }
        TrapState::Exit => {
            let regs = core.trap.regs;
            core.gpr.restore(&regs);
            core.pc = core.trap.pc.wrapping_add(4);
            core.trap = TrapFrame::default();
            core.state = PipelineState::Fetch;
        }
    }
}
