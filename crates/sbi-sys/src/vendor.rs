//! Vendor-specific extension identifiers.
//!
//! The SBI specification reserves `0x0900_0000..=0x09FF_FFFF` for vendor
//! extensions. The identifiers below are the ones T-HEAD C9xx platform
//! firmware answers to. These calls pass their arguments in `a0..a2` and do
//! not use the function id.

pub const EXTENSION_VENDOR_START: usize = 0x0900_0000;
pub const EXTENSION_VENDOR_END: usize = 0x09FF_FFFF;

/// Releases a secondary core from reset. `a0` is the target hart id.
pub const C910_BOOT_OTHER_CORE: usize = EXTENSION_VENDOR_START + 0x3;
/// Delegates the counter overflow interrupt and programs the event selectors.
pub const C910_SET_PMU: usize = EXTENSION_VENDOR_START + 0x4;
/// Enters system suspend. `a0` is the target state.
pub const C910_SYSTEM_SUSPEND: usize = EXTENSION_VENDOR_START + 0x5;
/// Enables or disables a wakeup source. `a0` is the irq, `a1` on/off.
pub const C910_SET_WAKEUP: usize = EXTENSION_VENDOR_START + 0x6;

/// Selects a timer irq as wakeup source. `a0` is the irq.
pub const SET_WAKEUP_TIMER: usize = EXTENSION_VENDOR_START + 0x1000;
/// Adjusts firmware log verbosity. `a0` is the level.
pub const SET_DEBUG_LEVEL: usize = EXTENSION_VENDOR_START + 0x1001;
/// Configures DRAM CRC checking. `a0` enable, `a1` address, `a2` length.
pub const SET_DEBUG_DRAM_CRC_PARAS: usize = EXTENSION_VENDOR_START + 0x1002;
/// Requests a console baudrate change. `a0` is the baudrate.
pub const SET_UART_BAUDRATE: usize = EXTENSION_VENDOR_START + 0x1003;

/// Whether `extension_id` falls in the vendor range.
#[must_use]
pub const fn is_vendor_extension(extension_id: usize) -> bool {
    extension_id >= EXTENSION_VENDOR_START && extension_id <= EXTENSION_VENDOR_END
}
