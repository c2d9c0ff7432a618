//! SBI System Reset Extension numbering.

pub const EXTENSION_ID: usize = 0x53_52_53_54; // 'SRST' in ASCII

pub const RESET_TYPE_SHUTDOWN: u32 = 0x0000_0000;
pub const RESET_TYPE_COLD_REBOOT: u32 = 0x0000_0001;
pub const RESET_TYPE_WARM_REBOOT: u32 = 0x0000_0002;

pub const RESET_REASON_NONE: u32 = 0x0000_0000;
pub const RESET_REASON_SYSTEM_FAILURE: u32 = 0x0000_0001;

/// Requested kind of system reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetType {
    Shutdown,
    ColdReboot,
    WarmReboot,
    /// Reserved or vendor specific type.
    Other(u32),
}

impl ResetType {
    #[must_use]
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            RESET_TYPE_SHUTDOWN => Self::Shutdown,
            RESET_TYPE_COLD_REBOOT => Self::ColdReboot,
            RESET_TYPE_WARM_REBOOT => Self::WarmReboot,
            _ => Self::Other(raw),
        }
    }
}
