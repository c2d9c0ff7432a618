//! SpacemiT K1.
//!
//! Hart power is managed by a PSCI-style coordinator that owns the cluster
//! and core power domains; this module only adapts it to [`HsmDevice`] and
//! does the few register writes the coordinator does not cover.

use riscv_utils::csr;
use sbi_sys::{
    SbiError,
    hart_state_management::{HartState, SuspendType},
};

use crate::{
    hal::{CsrFile, Mmio},
    hart::{CurrentHart, HartId},
    platform::split_u64,
    sbi::{HsmDevice, SuspendOutcome},
};

pub const CPUS_PER_CLUSTER: usize = 4;

/// Reset vector register pairs (low word, high word), one per cluster.
pub const RESET_VECTOR_REGS: [(usize, usize); 2] = [
    (0xd428_2db0, 0xd428_2db4),
    (0xd428_2eb0, 0xd428_2eb4),
];

/// Power state coordination for the K1 clusters.
pub trait Psci {
    fn cpu_on(&self, hart: HartId, start_addr: usize) -> Result<(), SbiError>;
    fn cpu_off(&self, hart: CurrentHart) -> Result<(), SbiError>;
    fn cpu_suspend(
        &self,
        hart: CurrentHart,
        suspend_type: SuspendType,
    ) -> Result<SuspendOutcome, SbiError>;
    /// Finishes a power-up on the hart that was just brought up.
    fn warmboot_entrypoint(&self, hart: CurrentHart);
}

/// Hart power-state device forwarding everything to [`Psci`].
#[derive(Debug)]
pub struct K1Hsm<'a, P: ?Sized> {
    psci: &'a P,
}

impl<'a, P> K1Hsm<'a, P>
where
    P: Psci + ?Sized,
{
    pub fn new(psci: &'a P) -> Self {
        Self { psci }
    }
}

impl<P> HsmDevice for K1Hsm<'_, P>
where
    P: Psci + ?Sized,
{
    fn name(&self) -> &'static str {
        "spacemit-hsm"
    }

    fn hart_start(&self, hart: HartId, start_addr: usize) -> Result<(), SbiError> {
        self.psci.cpu_on(hart, start_addr)
    }

    fn hart_stop(&self, hart: CurrentHart) -> Result<(), SbiError> {
        self.psci.cpu_off(hart)
    }

    fn hart_suspend(
        &self,
        hart: CurrentHart,
        suspend_type: SuspendType,
    ) -> Result<SuspendOutcome, SbiError> {
        self.psci.cpu_suspend(hart, suspend_type)
    }

    fn hart_resume(&self, hart: CurrentHart) {
        self.psci.warmboot_entrypoint(hart);
    }
}

/// Decides whether `hart` may perform the cold boot.
///
/// Every hart passing through here first enables L2 snooping for its core.
/// Only hart 0 cold boots, and not when it is coming back from suspend.
pub fn cold_boot_allowed<C>(csrs: &C, hart: HartId, state: HartState) -> bool
where
    C: CsrFile + ?Sized,
{
    csrs.set(csr::ML2SETUP, 1 << (hart.raw() % CPUS_PER_CLUSTER));
    hart.raw() == 0 && state != HartState::Suspended
}

/// Points the reset vector of both clusters at `warmboot_addr`.
pub fn set_reset_vectors<M>(mmio: &M, warmboot_addr: u64)
where
    M: Mmio + ?Sized,
{
    let [lo, hi] = split_u64(warmboot_addr);
    for (lo_reg, hi_reg) in RESET_VECTOR_REGS {
        mmio.write32(lo_reg, lo);
        mmio.write32(hi_reg, hi);
    }
}

/// Early init of the K1. The boot hart programs the reset vectors before
/// any other hart is released; other harts finish their power-up.
pub fn early_init<M, P>(
    mmio: &M,
    psci: &P,
    hart: CurrentHart,
    cold_boot: bool,
    warmboot_addr: u64,
) where
    M: Mmio + ?Sized,
    P: Psci + ?Sized,
{
    if cold_boot {
        set_reset_vectors(mmio, warmboot_addr);
        debug!("K1 reset vectors set to {warmboot_addr:#x}");
    } else {
        psci.warmboot_entrypoint(hart);
    }
}

#[cfg(test)]
mod tests {
    use std::vec::Vec;

    use spin::Mutex;

    use super::*;
    use crate::testing::{Access, FakeHal};

    #[derive(Debug, PartialEq, Eq)]
    enum Call {
        On(usize, usize),
        Off(usize),
        Suspend(usize),
        Warmboot(usize),
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Call>>);

    impl Psci for Recorder {
        fn cpu_on(&self, hart: HartId, start_addr: usize) -> Result<(), SbiError> {
            self.0.lock().push(Call::On(hart.raw(), start_addr));
            Ok(())
        }

        fn cpu_off(&self, hart: CurrentHart) -> Result<(), SbiError> {
            self.0.lock().push(Call::Off(hart.id().raw()));
            Ok(())
        }

        fn cpu_suspend(
            &self,
            hart: CurrentHart,
            _suspend_type: SuspendType,
        ) -> Result<SuspendOutcome, SbiError> {
            self.0.lock().push(Call::Suspend(hart.id().raw()));
            Ok(SuspendOutcome::Returned)
        }

        fn warmboot_entrypoint(&self, hart: CurrentHart) {
            self.0.lock().push(Call::Warmboot(hart.id().raw()));
        }
    }

    fn hart(id: usize) -> CurrentHart {
        // SAFETY: tests run on a fake hart
        unsafe { CurrentHart::assume(HartId::from_raw(id)) }
    }

    #[test]
    fn test_hsm_forwards_to_psci() {
        let psci = Recorder::default();
        let hsm = K1Hsm::new(&psci);
        assert_eq!(hsm.name(), "spacemit-hsm");
        hsm.hart_start(HartId::from_raw(5), 0x8020_0000).unwrap();
        hsm.hart_stop(hart(2)).unwrap();
        assert_eq!(
            hsm.hart_suspend(hart(3), SuspendType::NON_RETENTIVE_DEFAULT),
            Ok(SuspendOutcome::Returned)
        );
        hsm.hart_resume(hart(3));
        assert_eq!(
            *psci.0.lock(),
            [
                Call::On(5, 0x8020_0000),
                Call::Off(2),
                Call::Suspend(3),
                Call::Warmboot(3),
            ]
        );
    }

    #[test]
    fn test_cold_boot_gating() {
        let hal = FakeHal::new(0);
        assert!(cold_boot_allowed(&hal, HartId::from_raw(0), HartState::Stopped));
        assert!(!cold_boot_allowed(&hal, HartId::from_raw(0), HartState::Suspended));
        assert!(!cold_boot_allowed(&hal, HartId::from_raw(6), HartState::Stopped));
        // hart 6 is core 2 of the second cluster
        assert_eq!(hal.csr(csr::ML2SETUP), 0b101);
    }

    #[test]
    fn test_early_init() {
        let hal = FakeHal::new(0);
        let psci = Recorder::default();
        early_init(&hal, &psci, hart(0), true, 0x1_0000_0200);
        assert_eq!(
            hal.accesses(),
            [
                Access::Mmio {
                    addr: 0xd428_2db0,
                    value: 0x200
                },
                Access::Mmio {
                    addr: 0xd428_2db4,
                    value: 1
                },
                Access::Mmio {
                    addr: 0xd428_2eb0,
                    value: 0x200
                },
                Access::Mmio {
                    addr: 0xd428_2eb4,
                    value: 1
                },
            ]
        );
        assert!(psci.0.lock().is_empty());

        hal.clear_accesses();
        early_init(&hal, &psci, hart(1), false, 0x1_0000_0200);
        assert!(hal.accesses().is_empty());
        assert_eq!(*psci.0.lock(), [Call::Warmboot(1)]);
    }
}
