//! Thin wrappers around RISC-V instructions and CSRs used by machine-mode
//! firmware.
//!
//! On non-RISC-V targets every function panics with `unimplemented!`, so the
//! crate still builds on a development host.

#![no_std]

pub mod asm;
pub mod csr;
