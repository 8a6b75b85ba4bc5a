//! Pipeline Stage Implementations.
//!
//! One module per stage. Each stage is a free function mutating the core
//! (and, where the stage touches memory, going through the bus), mirroring
//! the cycle-stepped stage order:
//! fetch, decode, execute, memory, writeback.

/// Instruction decode stage.
pub mod decode;

/// ALU, branch resolution, and system instruction stage.
pub mod execute;

/// Instruction fetch stage with prefetch.
pub mod fetch;

/// Load/store stage.
pub mod memory;

/// Register commit and PC advance stage.
pub mod writeback;
