//! Unit tests for the emulator components.

pub mod core;
pub mod isa;
