//! In-memory hart used by unit tests.

use std::{
    collections::BTreeMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    vec::Vec,
};

use crate::hal::{CsrFile, Mmio, Processor, WakeReason};

/// One hardware side effect, in program order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Mmio { addr: usize, value: u32 },
    Csr { csr: u16, value: usize },
    Wfi,
}

/// A sparse register file standing in for MMIO space and the CSRs of one
/// hart. Unwritten registers read as zero.
#[derive(Debug)]
pub struct FakeHal {
    hart_id: AtomicUsize,
    mmio: Mutex<BTreeMap<usize, u32>>,
    csrs: Mutex<BTreeMap<u16, usize>>,
    log: Mutex<Vec<Access>>,
    wake: Mutex<WakeReason>,
    breakpoints: AtomicUsize,
}

impl FakeHal {
    pub fn new(hart_id: usize) -> Self {
        Self {
            hart_id: AtomicUsize::new(hart_id),
            mmio: Mutex::new(BTreeMap::new()),
            csrs: Mutex::new(BTreeMap::new()),
            log: Mutex::new(Vec::new()),
            wake: Mutex::new(WakeReason::Interrupt),
            breakpoints: AtomicUsize::new(0),
        }
    }

    pub fn switch_hart(&self, hart_id: usize) {
        self.hart_id.store(hart_id, Ordering::Relaxed);
    }

    pub fn mmio(&self, addr: usize) -> u32 {
        self.mmio.lock().unwrap().get(&addr).copied().unwrap_or(0)
    }

    /// Presets a register without recording an access.
    pub fn preset_mmio(&self, addr: usize, value: u32) {
        self.mmio.lock().unwrap().insert(addr, value);
    }

    pub fn csr(&self, csr: u16) -> usize {
        self.csrs.lock().unwrap().get(&csr).copied().unwrap_or(0)
    }

    /// Presets a CSR without recording an access.
    pub fn preset_csr(&self, csr: u16, value: usize) {
        self.csrs.lock().unwrap().insert(csr, value);
    }

    pub fn set_wake_reason(&self, reason: WakeReason) {
        *self.wake.lock().unwrap() = reason;
    }

    pub fn accesses(&self) -> Vec<Access> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear_accesses(&self) {
        self.log.lock().unwrap().clear();
    }

    /// Addresses of MMIO writes, in order.
    pub fn mmio_write_addrs(&self) -> Vec<usize> {
        self.accesses()
            .into_iter()
            .filter_map(|access| match access {
                Access::Mmio { addr, .. } => Some(addr),
                _ => None,
            })
            .collect()
    }

    /// Forgets every register value, as if the power domain had been cut.
    pub fn lose_state(&self) {
        self.mmio.lock().unwrap().clear();
        self.csrs.lock().unwrap().clear();
    }

    pub fn breakpoints(&self) -> usize {
        self.breakpoints.load(Ordering::Relaxed)
    }
}

impl Mmio for FakeHal {
    fn read32(&self, addr: usize) -> u32 {
        self.mmio(addr)
    }

    fn write32(&self, addr: usize, value: u32) {
        self.mmio.lock().unwrap().insert(addr, value);
        self.log.lock().unwrap().push(Access::Mmio { addr, value });
    }
}

impl CsrFile for FakeHal {
    fn read(&self, csr: u16) -> usize {
        self.csr(csr)
    }

    fn write(&self, csr: u16, value: usize) {
        self.csrs.lock().unwrap().insert(csr, value);
        self.log.lock().unwrap().push(Access::Csr { csr, value });
    }
}

impl Processor for FakeHal {
    fn hart_id(&self) -> usize {
        self.hart_id.load(Ordering::Relaxed)
    }

    fn wait_for_interrupt(&self) -> WakeReason {
        self.log.lock().unwrap().push(Access::Wfi);
        *self.wake.lock().unwrap()
    }

    fn breakpoint(&self) -> ! {
        self.breakpoints.fetch_add(1, Ordering::Relaxed);
        panic!("breakpoint trap");
    }

    fn halt(&self) -> ! {
        panic!("hart halted");
    }
}
