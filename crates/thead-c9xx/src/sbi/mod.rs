//! Device interfaces the generic SBI layer calls into.
//!
//! The generic layer owns the ecall dispatch and the hart state machine; a
//! platform plugs in behaviour by implementing these traits.

pub mod hsm;
pub mod pmu;
pub mod reset;

pub use self::{
    hsm::{HsmDevice, PowerController, SuspendOutcome, WarmBootPath, warm_boot_path},
    pmu::{HartFeatures, PmuDevice},
    reset::SystemResetDevice,
};

/// Argument registers of the trapping ecall.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrapRegs {
    pub a0: usize,
    pub a1: usize,
    pub a2: usize,
    pub a3: usize,
    pub a4: usize,
    pub a5: usize,
}

impl TrapRegs {
    #[must_use]
    pub const fn new(a0: usize, a1: usize, a2: usize) -> Self {
        Self {
            a0,
            a1,
            a2,
            a3: 0,
            a4: 0,
            a5: 0,
        }
    }
}
