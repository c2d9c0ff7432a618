use sbi_sys::system_reset::ResetType;

pub trait SystemResetDevice {
    fn name(&self) -> &'static str;

    /// Whether this device can perform `reset_type`.
    fn system_reset_check(&self, reset_type: ResetType, reason: u32) -> bool {
        let _ = (reset_type, reason);
        true
    }

    /// Performs the reset. Returns only if the hardware did not act on the
    /// request.
    fn system_reset(&self, reset_type: ResetType, reason: u32);
}
