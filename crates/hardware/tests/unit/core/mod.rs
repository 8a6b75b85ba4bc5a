//! Core pipeline tests, grouped by instruction class.

pub mod control_flow;
pub mod csr;
