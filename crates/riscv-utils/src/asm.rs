pub fn wfi() {
    cfg_if::cfg_if! {
        if #[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))] {
            unsafe {
                core::arch::asm!("wfi", options(nomem, nostack));
            }
        } else {
            unimplemented!("unsupported architecture")
        }
    }
}

pub fn ebreak() {
    cfg_if::cfg_if! {
        if #[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))] {
            unsafe {
                core::arch::asm!("ebreak", options(nostack));
            }
        } else {
            unimplemented!("unsupported architecture")
        }
    }
}
