//! Platform support for T-HEAD C9xx based RISC-V SoCs in machine-mode SBI
//! firmware.
//!
//! The crate provides the pieces a generic SBI implementation delegates to
//! the platform:
//!
//! * the T-HEAD flavoured PLIC driver, which maps each hart to its interrupt
//!   contexts and saves or restores them around a power-down
//!   ([`drivers::irq::plic`]),
//! * the Allwinner PPU based hart power-state device
//!   ([`platform::sunxi::hsm`]),
//! * the T-HEAD vendor SBI extensions ([`platform::c910::vendor`]),
//! * board glue for the C910/C906 ([`platform::c910`]) and the SpacemiT K1
//!   ([`platform::spacemit`]).
//!
//! All hardware access goes through the traits in [`hal`].

#![cfg_attr(not(test), no_std)]

#[macro_use]
pub mod console;
#[macro_use]
pub mod log;

pub mod drivers;
pub mod hal;
pub mod hart;
pub mod platform;
pub mod sbi;

#[cfg(test)]
mod testing;
