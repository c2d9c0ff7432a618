//! T-HEAD C910/C906 platform: Allwinner D1 style boards.

use platform_cast::CastFrom as _;
use sbi_sys::{SbiError, hart_state_management::HartState};
use spin::{Once, RwLock};

use self::{pmu::C9xxPmu, power::C910PowerController, regs::CoreRegs, reset::SunxiWatchdogReset};
use crate::{
    console,
    drivers::{
        irq::plic::c9xx::C9xxPlic,
        serial::sunxi_uart::{self, SunxiUart},
    },
    hal::Hal,
    hart::{CurrentHart, HartId},
    platform::{
        config::PlatformConfig,
        sunxi::hsm::{SunxiPpu, SuspendStore},
    },
    sbi::{HartFeatures, HsmDevice as _, PmuDevice as _, PowerController, WarmBootPath, warm_boot_path},
};

pub mod pmu;
pub mod power;
pub mod regs;
pub mod reset;
pub mod vendor;

/// Exceptions 0 to 7 (misaligned and faulting fetch, load and store,
/// illegal instruction, breakpoint) are handled by the supervisor.
const DELEGATED_EXCEPTIONS: usize = 0xff;

/// Platform state shared by every hart.
pub struct C910Platform<H>
where
    H: 'static,
{
    hal: H,
    config: &'static PlatformConfig,
    regs: Once<CoreRegs>,
    plic: RwLock<C9xxPlic>,
    suspend: SuspendStore,
    console: Once<SunxiUart<&'static H>>,
}

impl<H> C910Platform<H>
where
    H: Hal + 'static,
{
    pub const fn new(hal: H, config: &'static PlatformConfig) -> Self {
        Self {
            hal,
            config,
            regs: Once::new(),
            plic: RwLock::new(C9xxPlic::new()),
            suspend: SuspendStore::new(),
            console: Once::new(),
        }
    }

    pub fn hal(&self) -> &H {
        &self.hal
    }

    pub fn config(&self) -> &'static PlatformConfig {
        self.config
    }

    pub fn current_hart(&self) -> CurrentHart {
        CurrentHart::get(&self.hal)
    }

    /// Register snapshot taken on the cold boot hart.
    pub fn core_regs(&self) -> Option<&CoreRegs> {
        self.regs.get()
    }

    /// The cold boot hart records its machine configuration; every other
    /// hart copies it.
    pub fn early_init(&self, cold_boot: bool) -> Result<(), SbiError> {
        if cold_boot {
            let regs = self.regs.call_once(|| CoreRegs::capture(&self.hal));
            info!(
                "{}: PLIC at {:#x}, CLINT at {:#x}",
                self.config.name,
                regs.plic_base_addr(),
                regs.clint_base_addr()
            );
            return Ok(());
        }

        let Some(regs) = self.regs.get() else {
            error!("warm boot before the boot hart captured its registers");
            return Err(SbiError::FAILED);
        };
        regs.apply(&self.hal);
        Ok(())
    }

    /// Delegates the common exceptions to the supervisor and, on the cold
    /// boot hart, points every reset entry at `warmboot_addr`.
    pub fn final_init(&self, cold_boot: bool, warmboot_addr: u64) {
        self.hal.set(riscv_utils::csr::MEDELEG, DELEGATED_EXCEPTIONS);
        if cold_boot {
            self.hsm_device().riscv_cfg_init(warmboot_addr);
        }
    }

    /// Registers every board PLIC (cold boot only), then masks all sources
    /// for the calling hart.
    pub fn irqchip_init(&self, cold_boot: bool) -> Result<(), SbiError> {
        if cold_boot {
            let mut plic = self.plic.write();
            for board in self.config.plics {
                plic.cold_init(&self.hal, board.base_addr, board.num_sources, board.routes)
                    .map_err(|err| {
                        error!("PLIC at {:#x}: {err}", board.base_addr);
                        SbiError::from(&err)
                    })?;
            }
        }

        let hart = self.current_hart();
        self.plic
            .read()
            .warm_init(&self.hal, hart)
            .map_err(|err| {
                error!("hart {}: PLIC warm init failed: {err}", hart.id());
                SbiError::from(&err)
            })
    }

    /// Runs on a hart that entered through the reset vector after the cold
    /// boot, with its state as recorded by the generic layer.
    pub fn warm_boot(&self, state: HartState) -> WarmBootPath {
        let path = warm_boot_path(state);
        if path.is_resume() {
            self.hsm_device().hart_resume(self.current_hart());
        }
        path
    }

    pub fn hsm_device(&self) -> SunxiPpu<'_, H> {
        SunxiPpu::new(&self.hal, &self.plic, &self.suspend, self.config.power)
            .with_power_controller(self)
    }

    pub fn pmu_device(&self) -> C9xxPmu<'_, H> {
        C9xxPmu::new(&self.hal)
    }

    pub fn reset_device(&self) -> SunxiWatchdogReset<'_, H> {
        SunxiWatchdogReset::new(&self.hal, self.config.watchdog)
    }

    pub fn vendor<'a, S>(&'a self, services: &'a S) -> vendor::C910Vendor<'a, H, S>
    where
        S: vendor::VendorServices + ?Sized,
    {
        vendor::C910Vendor::new(&self.hal, self.config.fw_text_start, services)
    }

    pub fn extensions_init(&self, features: &mut HartFeatures) {
        self.pmu_device().extensions_init(features);
    }

    fn power_controller(&self) -> C910PowerController<'_, H> {
        C910PowerController::new(&self.hal, self.config.fw_text_start)
    }
}

impl<H> C910Platform<H>
where
    H: Hal + Sync + 'static,
{
    /// The UART of the lowest port whose bus clock is enabled.
    pub fn console_device(&'static self) -> Result<&'static SunxiUart<&'static H>, SbiError> {
        let uart = &self.config.uart;
        let gate = self.hal.read32(self.config.power.ccu_base + uart.gate_reg);
        let port = sunxi_uart::find_uart_port(gate, uart.max_port).ok_or(SbiError::NO_DEVICE)?;
        let base_addr = uart.base_addr + usize::cast_from(port) * uart.port_stride;
        Ok(self
            .console
            .call_once(|| SunxiUart::new(&self.hal, base_addr)))
    }

    pub fn console_init(&'static self) -> Result<(), SbiError> {
        let device = self.console_device()?;
        if console::set_device(device) {
            crate::log::set_processor(&self.hal);
        }
        Ok(())
    }
}

impl<H> PowerController for C910Platform<H>
where
    H: Hal + 'static,
{
    fn start(&self, hart: HartId, start_addr: usize) -> Result<(), SbiError> {
        if hart.raw() >= self.config.hart_count {
            return Err(SbiError::INVALID_PARAM);
        }
        self.power_controller().start(hart, start_addr)
    }

    fn stop(&self, hart: CurrentHart) -> Result<(), SbiError> {
        self.power_controller().stop(hart)
    }
}

#[cfg(test)]
mod tests {
    use std::boxed::Box;

    use riscv_utils::csr;
    use sbi_sys::hart_state_management::SuspendType;

    use super::*;
    use crate::{
        drivers::irq::plic::c9xx::THEAD_PLIC_CTRL_REG,
        platform::config::SUN20I_D1,
        sbi::{HsmDevice as _, SuspendOutcome},
        testing::FakeHal,
    };

    const PLIC: usize = 0x1000_0000;

    fn leaked(hal: FakeHal) -> &'static C910Platform<FakeHal> {
        Box::leak(Box::new(C910Platform::new(hal, &SUN20I_D1)))
    }

    #[test]
    fn test_early_init_propagates_snapshot() {
        let platform = C910Platform::new(FakeHal::new(0), &SUN20I_D1);
        assert_eq!(platform.early_init(false), Err(SbiError::FAILED));

        platform.hal().preset_csr(csr::MAPBADDR, PLIC);
        platform.hal().preset_csr(csr::MHCR, 0x17f);
        platform.early_init(true).unwrap();
        assert_eq!(
            platform.core_regs().map(CoreRegs::clint_base_addr),
            Some(0x1400_0000)
        );
        assert!(platform.hal().accesses().is_empty());

        platform.hal().lose_state();
        platform.early_init(false).unwrap();
        assert_eq!(platform.hal().csr(csr::MHCR), 0x17f);
    }

    #[test]
    fn test_irqchip_init() {
        let platform = C910Platform::new(FakeHal::new(0), &SUN20I_D1);
        platform.irqchip_init(true).unwrap();
        assert_eq!(platform.hal().mmio(PLIC + THEAD_PLIC_CTRL_REG), 1);
        // M and S thresholds mask everything
        assert_eq!(platform.hal().mmio(PLIC + 0x20_0000), 7);
        assert_eq!(platform.hal().mmio(PLIC + 0x20_1000), 7);

        // a hart without contexts
        platform.hal().switch_hart(1);
        assert_eq!(platform.irqchip_init(false), Err(SbiError::NO_ENTRY));
    }

    #[test]
    fn test_console_port_discovery() {
        let platform = leaked(FakeHal::new(0));
        assert_eq!(
            platform.console_device().map(|_| ()),
            Err(SbiError::NO_DEVICE)
        );

        platform.hal().preset_mmio(0x0200_1000 + 0x90c, 0b0110);
        let uart = platform.console_device().unwrap();
        assert_eq!(uart.base_addr(), 0x0250_0400);
    }

    #[test]
    fn test_final_init() {
        let platform = C910Platform::new(FakeHal::new(0), &SUN20I_D1);
        platform.hal().preset_csr(csr::MEDELEG, 0x100);
        platform.final_init(false, 0x4000_0000);
        assert_eq!(platform.hal().csr(csr::MEDELEG), 0x1ff);
        assert!(platform.hal().mmio_write_addrs().is_empty());

        platform.final_init(true, 0x1_4000_0000);
        assert_eq!(platform.hal().mmio(0x0601_0004), 0x4000_0000);
        assert_eq!(platform.hal().mmio(0x0601_0008), 1);
    }

    #[test]
    fn test_hart_start_releases_core() {
        static TWO_HARTS: PlatformConfig = PlatformConfig {
            hart_count: 2,
            ..SUN20I_D1
        };
        let platform = C910Platform::new(FakeHal::new(0), &TWO_HARTS);
        platform
            .hsm_device()
            .hart_start(HartId::from_raw(1), 0x8020_0000)
            .unwrap();
        assert_eq!(platform.hal().csr(csr::MRVBR), SUN20I_D1.fw_text_start);
        assert_eq!(platform.hal().csr(csr::MRMR), 0b10);
    }

    #[test]
    fn test_hart_start_beyond_hart_count() {
        let platform = C910Platform::new(FakeHal::new(0), &SUN20I_D1);
        assert_eq!(
            platform
                .hsm_device()
                .hart_start(HartId::from_raw(1), 0x8020_0000),
            Err(SbiError::INVALID_PARAM)
        );
        assert!(platform.hal().accesses().is_empty());
    }

    #[test]
    fn test_suspend_then_warm_boot_resume() {
        let platform = C910Platform::new(FakeHal::new(0), &SUN20I_D1);
        platform.irqchip_init(true).unwrap();
        platform.hal().preset_mmio(PLIC + 4 * 5, 3);
        platform.hal().preset_csr(csr::MXSTATUS, 0xc063_8000);
        platform.hal().set_wake_reason(crate::hal::WakeReason::PowerLost);

        let hart = platform.current_hart();
        assert_eq!(
            platform
                .hsm_device()
                .hart_suspend(hart, SuspendType::NON_RETENTIVE_DEFAULT),
            Ok(SuspendOutcome::PoweredDown)
        );

        platform.hal().lose_state();
        assert!(platform.warm_boot(HartState::Suspended).is_resume());
        assert_eq!(platform.hal().mmio(PLIC + 4 * 5), 3);
        assert_eq!(platform.hal().csr(csr::MXSTATUS), 0xc063_8000);
        assert_eq!(platform.hal().mmio(PLIC + THEAD_PLIC_CTRL_REG), 1);
    }

    #[test]
    fn test_warm_boot_start_touches_nothing() {
        let platform = C910Platform::new(FakeHal::new(0), &SUN20I_D1);
        assert!(platform.warm_boot(HartState::StartPending).is_start());
        assert!(platform.hal().accesses().is_empty());
    }
}
