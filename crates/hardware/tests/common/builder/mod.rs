//! Builders for test inputs.

pub mod instruction;
