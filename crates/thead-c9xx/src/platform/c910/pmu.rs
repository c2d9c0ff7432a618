use riscv_utils::csr;
use sbi_sys::pmu::HW_COUNTER_MAX;

use crate::{
    hal::CsrFile,
    sbi::{HartFeatures, PmuDevice},
};

/// Counter overflow interrupt pending bit in `mip`.
pub const MIP_MOIP: usize = 1 << 17;

/// Number of `mhpmcounter`s on C9xx cores. Not discoverable by probing.
const MHPM_COUNT: u32 = 29;
const MHPM_BITS: u32 = 64;

/// Event selectors programmed by [`set_pmu`]: `mhpmevent{n}` counts event
/// `n - 2`.
const PMU_EVENT_COUNTERS: core::ops::RangeInclusive<u16> = 3..=28;

/// Hands the PMU over to the supervisor: the overflow interrupt is
/// delegated, every counter is writable from S-mode, and the event
/// selectors get their fixed assignment.
pub fn set_pmu<C>(csrs: &C)
where
    C: CsrFile + ?Sized,
{
    csrs.set(csr::MIDELEG, MIP_MOIP);
    csrs.write(csr::MCOUNTERWEN, 0xffff_ffff);
    for n in PMU_EVENT_COUNTERS {
        csrs.write(csr::mhpmevent(n), usize::from(n - 2));
    }
}

/// Overflow interrupt control for the C9xx counters, which use dedicated
/// enable bits instead of the Sscofpmf overflow bit.
#[derive(Debug)]
pub struct C9xxPmu<'a, C> {
    csr: &'a C,
}

impl<'a, C> C9xxPmu<'a, C>
where
    C: CsrFile,
{
    pub fn new(csr: &'a C) -> Self {
        Self { csr }
    }
}

impl<C> PmuDevice for C9xxPmu<'_, C>
where
    C: CsrFile,
{
    fn enable_irq(&self, counter: u32) {
        if counter >= HW_COUNTER_MAX {
            return;
        }
        let bit = 1 << counter;

        // A pending overflow interrupt has not been handled yet; its flag
        // must survive until it is.
        if self.csr.read(csr::MIP) & MIP_MOIP == 0 {
            self.csr.clear(csr::MCOUNTEROF, bit);
        }
        self.csr.set(csr::MCOUNTERINTEN, bit);
    }

    fn disable_irq(&self, counter: u32) {
        if counter >= HW_COUNTER_MAX {
            return;
        }
        self.csr.clear(csr::MCOUNTERINTEN, 1 << counter);
    }

    fn irq_bit(&self) -> usize {
        MIP_MOIP
    }

    fn extensions_init(&self, features: &mut HartFeatures) {
        features.mhpm_count = MHPM_COUNT;
        features.mhpm_bits = MHPM_BITS;
    }
}
