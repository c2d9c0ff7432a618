//! Non-retentive hart suspend on Allwinner D1.
//!
//! The hart's power domain is cut by the PPU (power policy unit) during WFI.
//! The PPU wakes it again for any interrupt unmasked in the RISCV_CFG wakeup
//! registers; the hart then restarts from the reset entry programmed by
//! [`SunxiPpu::riscv_cfg_init`]. Everything the power domain loses is
//! captured beforehand and written back in [`HsmDevice::hart_resume`].

use riscv_utils::csr;
use sbi_sys::{SbiError, hart_state_management::SuspendType};
use spin::{Mutex, RwLock};

use crate::{
    drivers::irq::plic::c9xx::{C9xxPlic, SavedPlicContext},
    hal::{Hal, WakeReason},
    hart::{CurrentHart, HartId},
    platform::{config::SunxiPowerConfig, split_u64},
    sbi::{HsmDevice, PowerController, SuspendOutcome},
};

/// Harts whose suspend state can be kept.
pub const MAX_SUSPEND_HARTS: usize = 8;

/// Opens the bus clock and deasserts the reset of a CCU-gated block.
const CCU_BGR_ENABLE: u32 = (1 << 16) | (1 << 0);
const RISCV_CFG_BGR_REG: usize = 0xd0c;
const PPU_BGR_REG: usize = 0x1ac;

const PPU_PD_ACTIVE_CTRL: usize = 0x2c;

const RESET_ENTRY_LO_REG: usize = 0x04;
const RESET_ENTRY_HI_REG: usize = 0x08;
const WAKEUP_EN_REG: usize = 0x20;

const fn wakeup_mask_reg(index: usize) -> usize {
    0x24 + 4 * index
}

/// Flushes and disables the caches.
const MCOR_FLUSH: usize = 0x22;
/// Invalidates the caches and the branch predictor.
const MCOR_INVALIDATE_ALL: usize = 0x7_0013;

/// Converts saved PLIC enable words into RISCV_CFG wakeup masks.
///
/// PLIC source `n + 16` maps to bit `n` of the wakeup masks, so each mask
/// takes the upper half of one enable word and the lower half of the next.
pub fn wakeup_masks(enable: &[u32]) -> impl Iterator<Item = u32> + '_ {
    enable
        .windows(2)
        .map(|pair| (pair[0] >> 16) | (pair[1] << 16))
}

#[derive(Debug, Default)]
struct HartSuspendState {
    plic: SavedPlicContext,
    mxstatus: usize,
    mhcr: usize,
    mhint: usize,
}

impl HartSuspendState {
    const fn new() -> Self {
        Self {
            plic: SavedPlicContext::new(),
            mxstatus: 0,
            mhcr: 0,
            mhint: 0,
        }
    }

    fn csr_save<H>(&mut self, hal: &H)
    where
        H: Hal + ?Sized,
    {
        self.mxstatus = hal.read(csr::MXSTATUS);
        self.mhcr = hal.read(csr::MHCR);
        self.mhint = hal.read(csr::MHINT);

        hal.write(csr::MCOR, MCOR_FLUSH);
        hal.write(csr::MHCR, 0);
    }

    fn csr_restore<H>(&self, hal: &H)
    where
        H: Hal + ?Sized,
    {
        hal.write(csr::MCOR, MCOR_INVALIDATE_ALL);

        hal.write(csr::MXSTATUS, self.mxstatus);
        hal.write(csr::MHCR, self.mhcr);
        hal.write(csr::MHINT, self.mhint);
    }
}

/// Per-hart storage for state lost in a non-retentive suspend.
#[derive(Debug)]
pub struct SuspendStore {
    harts: [Mutex<HartSuspendState>; MAX_SUSPEND_HARTS],
}

impl Default for SuspendStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SuspendStore {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            harts: [const { Mutex::new(HartSuspendState::new()) }; MAX_SUSPEND_HARTS],
        }
    }

    fn slot(&self, hart: HartId) -> Option<&Mutex<HartSuspendState>> {
        self.harts.get(hart.raw())
    }

    /// Whether `hart` has state waiting to be restored.
    #[must_use]
    pub fn has_saved_state(&self, hart: HartId) -> bool {
        self.slot(hart).is_some_and(|slot| slot.lock().plic.is_valid())
    }
}

/// Hart power-state device backed by the D1 PPU.
pub struct SunxiPpu<'a, H> {
    hal: &'a H,
    plic: &'a RwLock<C9xxPlic>,
    store: &'a SuspendStore,
    regs: SunxiPowerConfig,
    power: Option<&'a dyn PowerController>,
}

impl<'a, H> SunxiPpu<'a, H>
where
    H: Hal,
{
    pub fn new(
        hal: &'a H,
        plic: &'a RwLock<C9xxPlic>,
        store: &'a SuspendStore,
        regs: SunxiPowerConfig,
    ) -> Self {
        Self {
            hal,
            plic,
            store,
            regs,
            power: None,
        }
    }

    /// Routes hart start and stop requests to `power`.
    #[must_use]
    pub fn with_power_controller(mut self, power: &'a dyn PowerController) -> Self {
        self.power = Some(power);
        self
    }

    /// Points the reset entry of every hart at `warmboot_addr`. Run once on
    /// the cold boot hart.
    pub fn riscv_cfg_init(&self, warmboot_addr: u64) {
        let [lo, hi] = split_u64(warmboot_addr);
        self.hal
            .write32(self.regs.ccu_base + RISCV_CFG_BGR_REG, CCU_BGR_ENABLE);
        self.hal
            .write32(self.regs.riscv_cfg_base + RESET_ENTRY_LO_REG, lo);
        self.hal
            .write32(self.regs.riscv_cfg_base + RESET_ENTRY_HI_REG, hi);
    }

    fn ppu_save(&self) {
        // S-mode may have gated the clock
        self.hal
            .write32(self.regs.prcm_base + PPU_BGR_REG, CCU_BGR_ENABLE);
        // power down on the next WFI
        self.hal.write32(self.regs.ppu_base + PPU_PD_ACTIVE_CTRL, 1);
    }

    fn ppu_restore(&self) {
        self.hal.write32(self.regs.ppu_base + PPU_PD_ACTIVE_CTRL, 0);
    }

    fn riscv_cfg_save(&self, enable: &[u32]) {
        self.hal
            .write32(self.regs.ccu_base + RISCV_CFG_BGR_REG, CCU_BGR_ENABLE);
        for (index, mask) in wakeup_masks(enable).enumerate() {
            self.hal
                .write32(self.regs.riscv_cfg_base + wakeup_mask_reg(index), mask);
        }
        self.hal.write32(self.regs.riscv_cfg_base + WAKEUP_EN_REG, 1);
    }

    fn riscv_cfg_restore(&self) {
        self.hal.write32(self.regs.riscv_cfg_base + WAKEUP_EN_REG, 0);
    }
}

impl<H> HsmDevice for SunxiPpu<'_, H>
where
    H: Hal,
{
    fn name(&self) -> &'static str {
        "sunxi_ppu"
    }

    fn hart_start(&self, hart: HartId, start_addr: usize) -> Result<(), SbiError> {
        let power = self.power.ok_or(SbiError::NOT_SUPPORTED)?;
        power.start(hart, start_addr)
    }

    fn hart_stop(&self, hart: CurrentHart) -> Result<(), SbiError> {
        let power = self.power.ok_or(SbiError::NOT_SUPPORTED)?;
        power.stop(hart)
    }

    fn hart_suspend(
        &self,
        hart: CurrentHart,
        suspend_type: SuspendType,
    ) -> Result<SuspendOutcome, SbiError> {
        // retentive suspend is handled by the generic code
        if !suspend_type.is_non_retentive() {
            return Err(SbiError::NOT_SUPPORTED);
        }
        let slot = self.store.slot(hart.id()).ok_or(SbiError::NO_SPACE)?;

        {
            let mut state = slot.lock();
            let plic = self.plic.read();
            state.plic.save(&plic, self.hal, hart).map_err(|err| {
                error!("hart {}: cannot save PLIC state: {err}", hart.id());
                SbiError::FAILED
            })?;
            self.ppu_save();
            self.riscv_cfg_save(state.plic.enable());
            state.csr_save(self.hal);
        }

        // Powers down unless an interrupt is already pending.
        match self.hal.wait_for_interrupt() {
            WakeReason::Interrupt => Ok(SuspendOutcome::Returned),
            WakeReason::PowerLost => Ok(SuspendOutcome::PoweredDown),
        }
    }

    fn hart_resume(&self, hart: CurrentHart) {
        let Some(slot) = self.store.slot(hart.id()) else {
            warn!("hart {}: no suspend state slot", hart.id());
            return;
        };
        let mut state = slot.lock();
        if !state.plic.is_valid() {
            warn!("hart {}: resuming without saved state", hart.id());
            return;
        }

        state.csr_restore(self.hal);
        self.riscv_cfg_restore();
        self.ppu_restore();

        let plic = self.plic.read();
        if let Err(err) = state.plic.restore(&plic, self.hal, hart) {
            error!("hart {}: cannot restore PLIC state: {err}", hart.id());
        }
    }
}
