//! T-HEAD vendor SBI extensions.
//!
//! Each vendor call is a whole extension id of its own; the function id is
//! ignored and arguments come in `a0..=a2`. Calls that reach into other
//! subsystems (system suspend, DRAM checking) go through [`VendorServices`].

use sbi_sys::{SbiError, vendor};

use super::{pmu, power::C910PowerController};
use crate::{
    hal::Hal,
    hart::HartId,
    log::{self, LogLevel},
    sbi::TrapRegs,
};

/// System-level operations the vendor calls depend on.
pub trait VendorServices {
    /// Suspends the whole system into `state`.
    fn system_suspend(&self, state: usize) -> Result<(), SbiError>;
    /// Enables or disables `irq` as a system wakeup source.
    fn set_wakeup(&self, irq: usize, on: bool) -> Result<(), SbiError>;
    /// Selects the timer `irq` that wakes the system.
    fn set_wakeup_src_timer(&self, irq: u32) -> Result<(), SbiError>;
    fn set_dram_crc_paras(
        &self,
        enable: usize,
        src_addr: usize,
        len: usize,
    ) -> Result<(), SbiError>;
}

/// Dispatcher for the C910 vendor extension range.
pub struct C910Vendor<'a, H, S: ?Sized> {
    hal: &'a H,
    power: C910PowerController<'a, H>,
    services: &'a S,
}

impl<'a, H, S> C910Vendor<'a, H, S>
where
    H: Hal,
    S: VendorServices + ?Sized,
{
    pub fn new(hal: &'a H, fw_text_start: usize, services: &'a S) -> Self {
        Self {
            hal,
            power: C910PowerController::new(hal, fw_text_start),
            services,
        }
    }

    /// Handles one vendor call and returns the value for `a1`.
    ///
    /// Every recognized call reports success to the supervisor; arguments
    /// the firmware cannot act on and failures of the underlying services
    /// are logged instead. An unknown id inside the vendor range is a fatal
    /// supervisor bug: it is logged and the hart traps into the debugger
    /// instead of returning. Ids outside the vendor range are not ours.
    pub fn dispatch(
        &self,
        extension_id: usize,
        _function_id: usize,
        regs: &TrapRegs,
    ) -> Result<usize, SbiError> {
        if !vendor::is_vendor_extension(extension_id) {
            return Err(SbiError::NOT_SUPPORTED);
        }

        let result = match extension_id {
            vendor::C910_BOOT_OTHER_CORE => self.power.release(HartId::from_raw(regs.a0)),
            vendor::C910_SET_PMU => {
                pmu::set_pmu(self.hal);
                Ok(())
            }
            vendor::C910_SYSTEM_SUSPEND => self.services.system_suspend(regs.a0),
            vendor::C910_SET_WAKEUP => self.services.set_wakeup(regs.a0, regs.a1 != 0),
            vendor::SET_WAKEUP_TIMER => {
                // irq numbers are 32 bits wide; upper bits are dropped
                let [b0, b1, b2, b3, ..] = regs.a0.to_le_bytes();
                self.services
                    .set_wakeup_src_timer(u32::from_le_bytes([b0, b1, b2, b3]))
            }
            vendor::SET_DEBUG_LEVEL => {
                match u8::try_from(regs.a0).ok().and_then(LogLevel::from_raw) {
                    Some(level) => log::set_max_level(level),
                    None => {
                        debug!("ignoring unknown debug level {}", regs.a0);
                    }
                }
                Ok(())
            }
            vendor::SET_DEBUG_DRAM_CRC_PARAS => {
                self.services
                    .set_dram_crc_paras(regs.a0, regs.a1, regs.a2)
            }
            vendor::SET_UART_BAUDRATE => {
                debug!("ignoring baudrate change to {}", regs.a0);
                Ok(())
            }
            _ => {
                error!("Unsupported private sbi call: {extension_id:#x}");
                self.hal.breakpoint();
            }
        };
        if let Err(err) = result {
            warn!("vendor call {extension_id:#x} failed: {err:?}");
        }
        Ok(0)
    }
}
