use sbi_sys::{
    SbiError,
    hart_state_management::{HartState, SuspendType},
};

use crate::hart::{CurrentHart, HartId};

/// How a suspend request ended, seen from the suspending hart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SuspendOutcome {
    /// WFI fell through because an interrupt was already pending. The hart
    /// kept its state and continues at the resume address.
    Returned,
    /// The power domain went down. On hardware this outcome is never
    /// observed; the hart reappears at its reset vector and takes
    /// [`WarmBootPath::Resume`].
    PoweredDown,
}

/// Platform hook for hart power management.
///
/// Every method defaults to reporting the operation as unsupported, in which
/// case the generic layer falls back to its own implementation.
pub trait HsmDevice {
    fn name(&self) -> &'static str;

    /// Releases `hart` so that it begins executing at `start_addr`.
    fn hart_start(&self, hart: HartId, start_addr: usize) -> Result<(), SbiError> {
        let _ = (hart, start_addr);
        Err(SbiError::NOT_SUPPORTED)
    }

    /// Powers the calling hart down.
    fn hart_stop(&self, hart: CurrentHart) -> Result<(), SbiError> {
        let _ = hart;
        Err(SbiError::NOT_SUPPORTED)
    }

    /// Puts the calling hart into the low power state `suspend_type`.
    fn hart_suspend(
        &self,
        hart: CurrentHart,
        suspend_type: SuspendType,
    ) -> Result<SuspendOutcome, SbiError> {
        let _ = (hart, suspend_type);
        Err(SbiError::NOT_SUPPORTED)
    }

    /// Brings back the state lost by a non-retentive suspend. Runs on the
    /// resuming hart before it returns to the supervisor.
    fn hart_resume(&self, hart: CurrentHart) {
        let _ = hart;
    }
}

/// Means of powering harts up and down.
pub trait PowerController {
    fn start(&self, hart: HartId, start_addr: usize) -> Result<(), SbiError>;
    fn stop(&self, hart: CurrentHart) -> Result<(), SbiError>;
}

/// Where a hart entering through the reset vector goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum WarmBootPath {
    /// The hart was suspended and lost its context: restore it, then return
    /// to the supervisor's resume address.
    Resume,
    /// The hart is being started for the first time or after a stop.
    Start,
}

#[must_use]
pub fn warm_boot_path(state: HartState) -> WarmBootPath {
    match state {
        HartState::Suspended => WarmBootPath::Resume,
        _ => WarmBootPath::Start,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Minimal;

    impl HsmDevice for Minimal {
        fn name(&self) -> &'static str {
            "minimal"
        }
    }

    #[test]
    fn test_warm_boot_path() {
        assert_eq!(warm_boot_path(HartState::Suspended), WarmBootPath::Resume);
        assert!(warm_boot_path(HartState::StartPending).is_start());
        assert!(warm_boot_path(HartState::Stopped).is_start());
        assert!(warm_boot_path(HartState::Unknown(42)).is_start());
    }

    #[test]
    fn test_default_operations_are_unsupported() {
        // SAFETY: no per-hart state is involved
        let hart = unsafe { CurrentHart::assume(HartId::from_raw(0)) };
        let device = Minimal;
        assert_eq!(
            device.hart_start(HartId::from_raw(1), 0x8000_0000),
            Err(SbiError::NOT_SUPPORTED)
        );
        assert_eq!(device.hart_stop(hart), Err(SbiError::NOT_SUPPORTED));
        assert_eq!(
            device.hart_suspend(hart, SuspendType::NON_RETENTIVE_DEFAULT),
            Err(SbiError::NOT_SUPPORTED)
        );
    }
}
