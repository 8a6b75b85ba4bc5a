//! Machine Construction and Run Loop.
//!
//! This module assembles the machine from configuration and drives it:
//! 1. **Construction:** Builds the bus, attaches ROM, RAM, and the optional
//!    framebuffer, and reserves per-core stacks at the top of RAM.
//! 2. **Loading:** Places a guest ELF image and records its entry point.
//! 3. **Execution:** Starts one free-running thread per core. Cores are
//!    symmetric and uncoordinated except through the shared bus; the run
//!    ends when every core halts or any core requests exit.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use tracing::{debug, info};

use crate::common::LoaderError;
use crate::config::Config;
use crate::core::Core;
use crate::isa::abi;
use crate::isa::privileged::opcodes as sys_ops;
use crate::sim::loader;
use crate::sim::syscall::{SyscallBridge, NO_EXIT};
use crate::soc::devices::{RamDevice, RomDevice, VideoDevice};
use crate::soc::memory::PERM_READ;
use crate::soc::memory::PERM_WRITE;
use crate::soc::Bus;

/// Encoding of `MRET`, placed at the trap vector in ROM.
///
/// Traps are serviced host-side before the guest ever executes at the
/// vector, so this is a placeholder a curious guest could still fetch.
const TRAP_VECTOR_STUB: u32 = (sys_ops::FUNCT12_MRET << 20) | sys_ops::OP_SYSTEM;

/// A fully constructed machine ready to load and run guest programs.
pub struct Simulator {
    bus: Arc<Bus>,
    exit_request: Arc<AtomicU64>,
    config: Config,
    entry: Option<u32>,
}

impl Simulator {
    /// Builds the machine described by `config`.
    ///
    /// Device routing priority: ROM, then RAM, then the framebuffer.
    pub fn new(config: Config) -> Self {
        let bus = Arc::new(Bus::new());

        bus.add_device(Box::new(RomDevice::new(
            "ROM",
            config.rom_base,
            config.rom_size,
            &TRAP_VECTOR_STUB.to_le_bytes(),
        )));
        bus.add_device(Box::new(RamDevice::new(
            "RAM0",
            config.ram_base,
            config.ram_size,
        )));
        if config.video.enabled {
            bus.add_device(Box::new(VideoDevice::new(
                "VIDEO",
                config.video.base,
                config.video.width,
                config.video.height,
            )));
        }

        Self {
            bus,
            exit_request: Arc::new(AtomicU64::new(NO_EXIT)),
            config,
            entry: None,
        }
    }

    /// The machine's bus, shared with all cores.
    pub fn bus(&self) -> &Arc<Bus> {
        &self.bus
    }

    /// Loads a guest ELF image and reserves the per-core stacks.
    ///
    /// Stack reservations are validated against the RAM window before the
    /// image touches guest memory, so a bad configuration fails cleanly.
    pub fn load(&mut self, image: &[u8]) -> Result<u32, LoaderError> {
        let stacks = self
            .config
            .stack_size
            .checked_mul(self.config.cores)
            .filter(|total| *total <= self.config.ram_size)
            .ok_or(LoaderError::Config("per-core stacks do not fit in RAM"))?;
        let ram_end = self
            .config
            .ram_base
            .checked_add(self.config.ram_size)
            .ok_or(LoaderError::Config("RAM window wraps the address space"))?;
        let stacks_base = ram_end - stacks;

        let entry = loader::load_elf(&self.bus, image)?;
        self.bus
            .map_region(stacks_base, stacks, PERM_READ | PERM_WRITE)
            .map_err(|fault| LoaderError::Placement {
                addr: stacks_base,
                fault,
            })?;

        self.entry = Some(entry);
        Ok(entry)
    }

    /// Initial stack pointer for core `id`: stacks grow down from the top
    /// of RAM, one disjoint region per core.
    fn stack_top(&self, id: u32) -> u32 {
        self.config.ram_base + self.config.ram_size - id * self.config.stack_size
    }

    /// Creates and initializes the core with hart ID `id`.
    fn build_core(&self, id: u32, entry: u32) -> Core {
        let mut core = Core::new(id, entry, self.config.prefetch_depth);
        core.gpr.write(abi::REG_SP, self.stack_top(id));
        core.csrs.mtvec = self.config.rom_base;
        core
    }

    /// Runs every core to completion and returns the guest exit code.
    ///
    /// Each core free-runs on its own OS thread with its own syscall bridge;
    /// the first `exit`/`exit_group` stops all cores. A machine whose cores
    /// all halt without an explicit exit returns 0.
    ///
    /// # Panics
    ///
    /// Panics if called before [`load`](Self::load) succeeded.
    pub fn run(&self) -> i32 {
        let entry = self
            .entry
            .unwrap_or_else(|| panic!("no image loaded"));

        info!(cores = self.config.cores, entry = format_args!("{entry:#010x}"), "starting cores");

        thread::scope(|scope| {
            for id in 0..self.config.cores {
                let mut core = self.build_core(id, entry);
                let bus = Arc::clone(&self.bus);
                let exit_request = Arc::clone(&self.exit_request);
                scope.spawn(move || {
                    let mut bridge = SyscallBridge::new(Arc::clone(&exit_request));
                    while !core.halted() && exit_request.load(Ordering::SeqCst) == NO_EXIT {
                        core.step_instruction(&bus, &mut bridge);
                    }
                    debug!(core = id, cycles = core.cycles, "core stopped");
                });
            }
        });

        match self.exit_request.load(Ordering::SeqCst) {
            NO_EXIT => 0,
            code => code as i32,
        }
    }
}
