//! Guest System Call Bridge.
//!
//! This module services the ENTER/HANDLE/EXIT trap cycle for environment
//! calls. The guest raises an ECALL with the syscall number in `a7` and up to
//! five arguments in `a0..a4`; the bridge translates the call to the host,
//! then writes the result into the `a0` slot of the trap snapshot so trap
//! exit restores it into the live register file.
//!
//! One bridge instance exists per core thread, so host file descriptors are
//! core-local. Exit requests are shared through an atomic so one core's
//! `exit` stops the whole machine.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, error, trace};

use crate::common::Trap;
use crate::core::trap::TrapHandler;
use crate::core::Core;
use crate::isa::abi;
use crate::soc::Bus;

/// Recognized guest system call numbers (Linux RV32 ABI).
pub mod numbers {
    /// Terminate the calling thread.
    pub const EXIT: u32 = 93;
    /// Terminate all threads.
    pub const EXIT_GROUP: u32 = 94;
    /// Grow the program break.
    pub const BRK: u32 = 214;
    /// Read from a file descriptor into guest memory.
    pub const READ: u32 = 63;
    /// Write guest memory to a file descriptor.
    pub const WRITE: u32 = 64;
    /// Open a host file.
    pub const OPEN: u32 = 1024;
    /// Close a file descriptor.
    pub const CLOSE: u32 = 57;
    /// Reposition a file offset.
    pub const LSEEK: u32 = 62;
    /// Stat an open file descriptor.
    pub const FSTAT: u32 = 80;
}

/// Generic failure result (-1).
const ERR: u32 = -1i32 as u32;
/// Result for unrecognized syscall numbers (-ENOSYS).
const ENOSYS: u32 = -(libc::ENOSYS) as u32;

/// Sentinel meaning "no exit requested yet" in the shared exit slot.
pub const NO_EXIT: u64 = u64::MAX;

/// Longest guest path string the bridge will read.
const PATH_MAX: u32 = 4096;

/// Size of the asm-generic `struct stat` written by `fstat`.
const STAT_SIZE: usize = 104;

/// Trap handler translating guest environment calls to host operations.
pub struct SyscallBridge {
    exit_request: Arc<AtomicU64>,
    files: HashMap<u32, File>,
    next_fd: u32,
}

impl SyscallBridge {
    /// Creates a bridge sharing `exit_request` with the rest of the machine.
    pub fn new(exit_request: Arc<AtomicU64>) -> Self {
        Self {
            exit_request,
            files: HashMap::new(),
            // 0..2 are the host's stdio.
            next_fd: 3,
        }
    }

    fn dispatch(&mut self, core: &mut Core, bus: &Bus) -> Option<u32> {
        let frame = core.trap_frame();
        let nr = frame.regs[abi::REG_A7];
        let args = [
            frame.regs[abi::REG_A0],
            frame.regs[abi::REG_A1],
            frame.regs[abi::REG_A2],
            frame.regs[abi::REG_A3],
            frame.regs[abi::REG_A4],
        ];
        trace!(core = core.id, nr, ?args, "ecall");

        match nr {
            numbers::EXIT | numbers::EXIT_GROUP => {
                debug!(core = core.id, code = args[0], "guest exit");
                // First exit wins; later cores just observe it.
                let _ = self.exit_request.compare_exchange(
                    NO_EXIT,
                    u64::from(args[0]),
                    Ordering::SeqCst,
                    Ordering::SeqCst,
                );
                None
            }
            numbers::BRK => Some(self.sys_brk(bus, args[0])),
            numbers::READ => Some(self.sys_read(bus, args[0], args[1], args[2])),
            numbers::WRITE => Some(self.sys_write(bus, args[0], args[1], args[2])),
            numbers::OPEN => Some(self.sys_open(bus, args[0], args[1])),
            numbers::CLOSE => Some(self.sys_close(args[0])),
            numbers::LSEEK => Some(self.sys_lseek(args[0], args[1], args[2])),
            numbers::FSTAT => Some(self.sys_fstat(bus, args[0], args[1])),
            _ => {
                debug!(core = core.id, nr, "unrecognized syscall");
                Some(ENOSYS)
            }
        }
    }

    /// `brk(addr)`: grows guest memory up to `addr` via the bus allocator.
    ///
    /// Returns the new break on success; like Linux, a failed grow returns
    /// the unchanged break.
    fn sys_brk(&mut self, bus: &Bus, addr: u32) -> u32 {
        let Ok(current) = bus.current_break() else {
            return ERR;
        };
        if addr <= current {
            return current;
        }
        match bus.allocate(addr - current) {
            Ok(_) => bus.current_break().unwrap_or(current),
            Err(_) => current,
        }
    }

    fn sys_read(&mut self, bus: &Bus, fd: u32, buf: u32, count: u32) -> u32 {
        // The guest controls `count`; make sure the range exists before
        // sizing a host buffer from it.
        if bus.check_range(buf, count).is_err() {
            return ERR;
        }
        let mut data = vec![0u8; count as usize];
        let n = match fd {
            0 => match std::io::stdin().read(&mut data) {
                Ok(n) => n,
                Err(_) => return ERR,
            },
            fd => match self.files.get_mut(&fd) {
                Some(file) => match file.read(&mut data) {
                    Ok(n) => n,
                    Err(_) => return ERR,
                },
                None => return ERR,
            },
        };
        if bus.write_bytes(buf, &data[..n]).is_err() {
            return ERR;
        }
        n as u32
    }

    fn sys_write(&mut self, bus: &Bus, fd: u32, buf: u32, count: u32) -> u32 {
        if bus.check_range(buf, count).is_err() {
            return ERR;
        }
        let mut data = vec![0u8; count as usize];
        if bus.read_bytes(buf, &mut data).is_err() {
            return ERR;
        }
        let written = match fd {
            1 => std::io::stdout().write(&data),
            2 => std::io::stderr().write(&data),
            fd => match self.files.get_mut(&fd) {
                Some(file) => file.write(&data),
                None => return ERR,
            },
        };
        match written {
            Ok(n) => n as u32,
            Err(_) => ERR,
        }
    }

    fn sys_open(&mut self, bus: &Bus, path_ptr: u32, flags: u32) -> u32 {
        let Some(path) = read_guest_string(bus, path_ptr) else {
            return ERR;
        };
        let flags = flags as i32;
        let mut options = OpenOptions::new();
        match flags & libc::O_ACCMODE {
            libc::O_WRONLY => options.write(true),
            libc::O_RDWR => options.read(true).write(true),
            _ => options.read(true),
        };
        options
            .create(flags & libc::O_CREAT != 0)
            .truncate(flags & libc::O_TRUNC != 0)
            .append(flags & libc::O_APPEND != 0);

        match options.open(&path) {
            Ok(file) => {
                let fd = self.next_fd;
                self.next_fd += 1;
                self.files.insert(fd, file);
                fd
            }
            Err(err) => {
                debug!(path, %err, "open failed");
                ERR
            }
        }
    }

    fn sys_close(&mut self, fd: u32) -> u32 {
        if self.files.remove(&fd).is_some() { 0 } else { ERR }
    }

    fn sys_lseek(&mut self, fd: u32, offset: u32, whence: u32) -> u32 {
        let Some(file) = self.files.get_mut(&fd) else {
            return ERR;
        };
        let offset = offset as i32 as i64;
        let pos = match whence {
            0 => SeekFrom::Start(offset as u64),
            1 => SeekFrom::Current(offset),
            2 => SeekFrom::End(offset),
            _ => return ERR,
        };
        match file.seek(pos) {
            Ok(new_pos) => new_pos as u32,
            Err(_) => ERR,
        }
    }

    fn sys_fstat(&mut self, bus: &Bus, fd: u32, stat_ptr: u32) -> u32 {
        let Some(file) = self.files.get(&fd) else {
            return ERR;
        };
        let Ok(meta) = file.metadata() else {
            return ERR;
        };

        // asm-generic struct stat, 32-bit layout.
        let mut stat = [0u8; STAT_SIZE];
        let mode = libc::S_IFREG | 0o644;
        stat[16..20].copy_from_slice(&mode.to_le_bytes());
        stat[20..24].copy_from_slice(&1u32.to_le_bytes());
        stat[48..56].copy_from_slice(&(meta.len() as i64).to_le_bytes());
        stat[56..60].copy_from_slice(&512i32.to_le_bytes());
        let blocks = (meta.len() as i64 + 511) / 512;
        stat[64..72].copy_from_slice(&blocks.to_le_bytes());

        if bus.write_bytes(stat_ptr, &stat).is_err() {
            return ERR;
        }
        0
    }
}

/// Reads a NUL-terminated string from guest memory, up to `PATH_MAX` bytes.
fn read_guest_string(bus: &Bus, addr: u32) -> Option<String> {
    let mut bytes = Vec::new();
    for i in 0..PATH_MAX {
        let mut byte = [0u8; 1];
        bus.read_bytes(addr + i, &mut byte).ok()?;
        if byte[0] == 0 {
            return String::from_utf8(bytes).ok();
        }
        bytes.push(byte[0]);
    }
    None
}

impl TrapHandler for SyscallBridge {
    fn handle(&mut self, core: &mut Core, bus: &Bus) -> bool {
        match core.trap_frame().cause {
            Some(Trap::EnvironmentCall) => match self.dispatch(core, bus) {
                Some(result) => {
                    core.trap_frame_mut().regs[abi::REG_A0] = result;
                    true
                }
                None => false,
            },
            Some(cause) => {
                error!(core = core.id, %cause, epc = format_args!("{:#010x}", core.trap_frame().pc), "unhandled trap");
                false
            }
            None => false,
        }
    }
}
