use riscv_utils::csr;
use sbi_sys::SbiError;

use crate::{
    hal::CsrFile,
    hart::{CurrentHart, HartId},
    sbi::PowerController,
};

/// Releases secondary C910 cores from reset.
///
/// Cores are held in reset until their bit in `mrmr` is set, and then start
/// at `mrvbr`. They cannot be put back into reset from software.
#[derive(custom_debug_derive::Debug)]
pub struct C910PowerController<'a, C> {
    #[debug(skip)]
    csrs: &'a C,
    #[debug(format = "{:#x}")]
    entry: usize,
}

impl<'a, C> C910PowerController<'a, C>
where
    C: CsrFile,
{
    /// `entry` is where released cores begin executing, normally the
    /// firmware's own text start.
    pub fn new(csrs: &'a C, entry: usize) -> Self {
        Self { csrs, entry }
    }

    pub fn release(&self, hart: HartId) -> Result<(), SbiError> {
        let bit = u32::try_from(hart.raw())
            .ok()
            .and_then(|shift| 1_usize.checked_shl(shift))
            .ok_or(SbiError::INVALID_PARAM)?;
        self.csrs.write(csr::MRVBR, self.entry);
        self.csrs.set(csr::MRMR, bit);
        Ok(())
    }
}

impl<C> PowerController for C910PowerController<'_, C>
where
    C: CsrFile,
{
    /// The supervisor start address is recorded by the generic layer; the
    /// core itself always enters through the firmware.
    fn start(&self, hart: HartId, _start_addr: usize) -> Result<(), SbiError> {
        self.release(hart)
    }

    fn stop(&self, _hart: CurrentHart) -> Result<(), SbiError> {
        Err(SbiError::NOT_SUPPORTED)
    }
}
