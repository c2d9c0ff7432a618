//! Seams between the firmware logic and the hart it runs on.
//!
//! Everything that touches hardware goes through one of the traits below.
//! [`riscv::RiscvHal`] implements them with volatile accesses and CSR
//! instructions; tests substitute an in-memory register file.

pub mod riscv;

/// 32-bit memory-mapped register access at absolute physical addresses.
///
/// Accesses are unsynchronized. Callers are responsible for ordering and for
/// never touching the same register from two harts at once.
pub trait Mmio {
    fn read32(&self, addr: usize) -> u32;
    fn write32(&self, addr: usize, value: u32);
}

/// Access to the calling hart's control and status registers.
///
/// CSR numbers are the raw 12-bit encodings, see [`riscv_utils::csr`].
pub trait CsrFile {
    fn read(&self, csr: u16) -> usize;
    fn write(&self, csr: u16, value: usize);

    fn set(&self, csr: u16, mask: usize) {
        self.write(csr, self.read(csr) | mask);
    }

    fn clear(&self, csr: u16, mask: usize) {
        self.write(csr, self.read(csr) & !mask);
    }
}

/// Why a wait-for-interrupt returned control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum WakeReason {
    /// An interrupt was pending or arrived; execution continues after WFI.
    Interrupt,
    /// The power domain was cut while waiting.
    ///
    /// Real hardware never reports this: the hart restarts at its reset
    /// vector instead. It exists so that a simulated hart can tell the caller
    /// that nothing after the WFI would have run.
    PowerLost,
}

/// Instructions that change the control flow of the calling hart.
pub trait Processor {
    /// `mhartid` of the calling hart.
    fn hart_id(&self) -> usize;

    /// Waits for an interrupt.
    fn wait_for_interrupt(&self) -> WakeReason;

    /// Raises a breakpoint exception. Never returns to the caller.
    fn breakpoint(&self) -> !;

    /// Parks the hart forever.
    fn halt(&self) -> !;
}

/// Everything a platform driver needs from the hart it runs on.
pub trait Hal: Mmio + CsrFile + Processor {}

impl<T> Hal for T where T: Mmio + CsrFile + Processor {}

impl<T> Mmio for &T
where
    T: Mmio + ?Sized,
{
    fn read32(&self, addr: usize) -> u32 {
        (**self).read32(addr)
    }

    fn write32(&self, addr: usize, value: u32) {
        (**self).write32(addr, value);
    }
}
