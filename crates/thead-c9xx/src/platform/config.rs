//! Board descriptions.

use crate::drivers::irq::plic::{PrivilegeMode, c9xx::ContextRoute};

/// One PLIC as wired on a board.
#[derive(Debug, Clone, Copy)]
pub struct PlicConfig {
    pub base_addr: usize,
    pub num_sources: usize,
    /// `routes[i]` is the hart and mode served by context `i`.
    pub routes: &'static [Option<ContextRoute>],
}

/// Allwinner power management blocks used for non-retentive suspend.
#[derive(Debug, Clone, Copy)]
pub struct SunxiPowerConfig {
    pub ccu_base: usize,
    pub riscv_cfg_base: usize,
    pub ppu_base: usize,
    pub prcm_base: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct WatchdogConfig {
    pub base_addr: usize,
    pub cfg_reg: usize,
    pub mode_reg: usize,
    pub key: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct UartConfig {
    pub base_addr: usize,
    /// Distance between the register blocks of consecutive ports.
    pub port_stride: usize,
    /// Offset from the CCU base of the register whose low bits gate the bus
    /// clock of each port.
    pub gate_reg: usize,
    pub max_port: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct PlatformConfig {
    pub name: &'static str,
    /// Harts that may be started, with ids `0..hart_count`.
    pub hart_count: usize,
    /// Where released harts begin executing.
    pub fw_text_start: usize,
    pub plics: &'static [PlicConfig],
    pub power: SunxiPowerConfig,
    pub watchdog: WatchdogConfig,
    pub uart: UartConfig,
}

/// Allwinner D1 (sun20i), a single C906 hart.
pub const SUN20I_D1: PlatformConfig = PlatformConfig {
    name: "Allwinner D1",
    hart_count: 1,
    fw_text_start: 0x4000_0000,
    plics: &[PlicConfig {
        base_addr: 0x1000_0000,
        num_sources: 175,
        routes: &[
            Some(ContextRoute::new(0, PrivilegeMode::Machine)),
            Some(ContextRoute::new(0, PrivilegeMode::Supervisor)),
        ],
    }],
    power: SunxiPowerConfig {
        ccu_base: 0x0200_1000,
        riscv_cfg_base: 0x0601_0000,
        ppu_base: 0x0700_1000,
        prcm_base: 0x0701_0000,
    },
    watchdog: WatchdogConfig {
        base_addr: 0x0205_0000,
        cfg_reg: 0xb4,
        mode_reg: 0xb8,
        key: 0x16aa,
    },
    uart: UartConfig {
        base_addr: 0x0250_0000,
        port_stride: 0x400,
        gate_reg: 0x90c,
        max_port: 5,
    },
};
