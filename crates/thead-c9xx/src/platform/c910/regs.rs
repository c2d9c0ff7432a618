use riscv_utils::csr;

use crate::hal::CsrFile;

/// Distance from the PLIC to the CLINT inside the C910 APB window.
pub const PLIC_CLINT_OFFSET: usize = 0x0400_0000;

/// Machine-mode configuration the boot hart inherits from the boot loader.
///
/// Secondary harts come out of reset with default values; the boot hart's
/// values are copied into them during their early init.
#[derive(Clone, Copy, PartialEq, Eq, custom_debug_derive::Debug)]
pub struct CoreRegs {
    #[debug(format = "{:#x?}")]
    pmpaddr: [usize; 8],
    #[debug(format = "{:#x}")]
    pmpcfg0: usize,
    #[debug(format = "{:#x}")]
    mcor: usize,
    #[debug(format = "{:#x}")]
    mhcr: usize,
    #[debug(format = "{:#x}")]
    mccr2: usize,
    #[debug(format = "{:#x}")]
    mhint: usize,
    #[debug(format = "{:#x}")]
    mxstatus: usize,
    #[debug(format = "{:#x}")]
    plic_base_addr: usize,
    #[debug(format = "{:#x}")]
    clint_base_addr: usize,
}

impl CoreRegs {
    pub fn capture<C>(csrs: &C) -> Self
    where
        C: CsrFile + ?Sized,
    {
        let plic_base_addr = csrs.read(csr::MAPBADDR);
        Self {
            pmpaddr: core::array::from_fn(|n| csrs.read(csr::PMPADDR0 + csr_offset(n))),
            pmpcfg0: csrs.read(csr::PMPCFG0),
            mcor: csrs.read(csr::MCOR),
            mhcr: csrs.read(csr::MHCR),
            mccr2: csrs.read(csr::MCCR2),
            mhint: csrs.read(csr::MHINT),
            mxstatus: csrs.read(csr::MXSTATUS),
            plic_base_addr,
            clint_base_addr: plic_base_addr + PLIC_CLINT_OFFSET,
        }
    }

    /// Writes the captured values into the calling hart. The L2 cache
    /// control is shared by all cores and left alone.
    pub fn apply<C>(&self, csrs: &C)
    where
        C: CsrFile + ?Sized,
    {
        for (n, &value) in self.pmpaddr.iter().enumerate() {
            csrs.write(csr::PMPADDR0 + csr_offset(n), value);
        }
        csrs.write(csr::PMPCFG0, self.pmpcfg0);

        csrs.write(csr::MCOR, self.mcor);
        csrs.write(csr::MHCR, self.mhcr);
        csrs.write(csr::MHINT, self.mhint);
        csrs.write(csr::MXSTATUS, self.mxstatus);
    }

    #[must_use]
    pub fn plic_base_addr(&self) -> usize {
        self.plic_base_addr
    }

    #[must_use]
    pub fn clint_base_addr(&self) -> usize {
        self.clint_base_addr
    }

    #[must_use]
    pub fn mccr2(&self) -> usize {
        self.mccr2
    }
}

fn csr_offset(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Access, FakeHal};

    #[test]
    fn test_capture_and_propagate() {
        let boot = FakeHal::new(0);
        for n in 0..8 {
            boot.preset_csr(csr::pmpaddr(n), 0x1000 + usize::from(n));
        }
        boot.preset_csr(csr::PMPCFG0, 0x1f);
        boot.preset_csr(csr::MCOR, 0x22);
        boot.preset_csr(csr::MHCR, 0x17f);
        boot.preset_csr(csr::MCCR2, 0xe249_0009);
        boot.preset_csr(csr::MHINT, 0x6e30c);
        boot.preset_csr(csr::MXSTATUS, 0xc063_8000);
        boot.preset_csr(csr::MAPBADDR, 0x0800_0000);

        let regs = CoreRegs::capture(&boot);
        assert_eq!(regs.plic_base_addr(), 0x0800_0000);
        assert_eq!(regs.clint_base_addr(), 0x0c00_0000);
        assert_eq!(regs.mccr2(), 0xe249_0009);
        assert!(boot.accesses().is_empty());

        let secondary = FakeHal::new(1);
        regs.apply(&secondary);
        for n in 0..8 {
            assert_eq!(secondary.csr(csr::pmpaddr(n)), 0x1000 + usize::from(n));
        }
        assert_eq!(secondary.csr(csr::PMPCFG0), 0x1f);
        assert_eq!(secondary.csr(csr::MHCR), 0x17f);
        assert_eq!(secondary.csr(csr::MXSTATUS), 0xc063_8000);
        assert!(
            !secondary
                .accesses()
                .iter()
                .any(|access| matches!(access, Access::Csr { csr: csr::MCCR2, .. }))
        );
        assert_eq!(secondary.accesses().len(), 13);
    }
}
