use core::{hint, ptr};

use riscv_utils::{asm, csr};

use super::{CsrFile, Mmio, Processor, WakeReason};

/// The hart the firmware is running on.
#[derive(Debug)]
pub struct RiscvHal {
    _private: (),
}

impl RiscvHal {
    /// # Safety
    ///
    /// Must only be used in machine mode, and every address later passed to
    /// [`Mmio`] methods must be a device register that is safe to access with
    /// a 32-bit volatile load or store.
    #[must_use]
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl Mmio for RiscvHal {
    fn read32(&self, addr: usize) -> u32 {
        unsafe { ptr::with_exposed_provenance::<u32>(addr).read_volatile() }
    }

    fn write32(&self, addr: usize, value: u32) {
        unsafe {
            ptr::with_exposed_provenance_mut::<u32>(addr).write_volatile(value);
        }
    }
}

impl CsrFile for RiscvHal {
    fn read(&self, num: u16) -> usize {
        match csr::read(num) {
            Some(value) => value,
            None => panic!("CSR {num:#x} is not accessible"),
        }
    }

    fn write(&self, num: u16, value: usize) {
        if csr::write(num, value).is_none() {
            panic!("CSR {num:#x} is not accessible");
        }
    }

    fn set(&self, num: u16, mask: usize) {
        if csr::set(num, mask).is_none() {
            panic!("CSR {num:#x} is not accessible");
        }
    }

    fn clear(&self, num: u16, mask: usize) {
        if csr::clear(num, mask).is_none() {
            panic!("CSR {num:#x} is not accessible");
        }
    }
}

impl Processor for RiscvHal {
    fn hart_id(&self) -> usize {
        ::riscv::register::mhartid::read()
    }

    fn wait_for_interrupt(&self) -> WakeReason {
        asm::wfi();
        WakeReason::Interrupt
    }

    fn breakpoint(&self) -> ! {
        asm::ebreak();
        self.halt()
    }

    fn halt(&self) -> ! {
        loop {
            asm::wfi();
            hint::spin_loop();
        }
    }
}
