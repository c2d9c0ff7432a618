use sbi_sys::system_reset::ResetType;

use crate::{hal::Hal, platform::config::WatchdogConfig, sbi::SystemResetDevice};

const WDOG_CFG_CONFIG_OFFSET: u32 = 0;
const WDOG_CFG_KEY_OFFSET: u32 = 16;
const WDOG_MODE_EN_OFFSET: u32 = 0;

/// Resets the system through the Allwinner watchdog.
#[derive(Debug)]
pub struct SunxiWatchdogReset<'a, H> {
    hal: &'a H,
    config: WatchdogConfig,
}

impl<'a, H> SunxiWatchdogReset<'a, H>
where
    H: Hal,
{
    pub fn new(hal: &'a H, config: WatchdogConfig) -> Self {
        Self { hal, config }
    }

    fn reboot(&self) {
        let key = self.config.key << WDOG_CFG_KEY_OFFSET;
        // reset the whole system on expiry
        self.hal.write32(
            self.config.base_addr + self.config.cfg_reg,
            (1 << WDOG_CFG_CONFIG_OFFSET) | key,
        );
        self.hal.write32(
            self.config.base_addr + self.config.mode_reg,
            (1 << WDOG_MODE_EN_OFFSET) | key,
        );
    }
}

impl<H> SystemResetDevice for SunxiWatchdogReset<'_, H>
where
    H: Hal,
{
    fn name(&self) -> &'static str {
        "thead_c910_reset"
    }

    fn system_reset(&self, reset_type: ResetType, reason: u32) {
        if reset_type == ResetType::Shutdown {
            info!("system shutdown (reason {reason})");
            self.hal.halt();
        }
        info!("system reboot ({reset_type:?}, reason {reason})");
        self.reboot();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        platform::config::SUN20I_D1,
        testing::{Access, FakeHal},
    };

    #[test]
    fn test_reboot_arms_watchdog() {
        let hal = FakeHal::new(0);
        let reset = SunxiWatchdogReset::new(&hal, SUN20I_D1.watchdog);
        assert!(reset.system_reset_check(ResetType::ColdReboot, 0));
        reset.system_reset(ResetType::ColdReboot, 0);
        assert_eq!(
            hal.accesses(),
            [
                Access::Mmio {
                    addr: 0x0205_00b4,
                    value: 0x16aa_0001
                },
                Access::Mmio {
                    addr: 0x0205_00b8,
                    value: 0x16aa_0001
                },
            ]
        );
    }

    #[test]
    fn test_vendor_reset_type_reboots() {
        let hal = FakeHal::new(0);
        let reset = SunxiWatchdogReset::new(&hal, SUN20I_D1.watchdog);
        reset.system_reset(ResetType::from_raw(0xf000_0000), 0);
        assert_eq!(hal.mmio_write_addrs().len(), 2);
    }

    #[test]
    #[should_panic(expected = "hart halted")]
    fn test_shutdown_halts() {
        let hal = FakeHal::new(0);
        let reset = SunxiWatchdogReset::new(&hal, SUN20I_D1.watchdog);
        reset.system_reset(ResetType::Shutdown, 0);
    }
}
