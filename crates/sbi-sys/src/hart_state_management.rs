//! SBI Hart State Management Extension numbering.
//!
//! The function identifiers a supervisor uses to start, stop and suspend
//! harts, the state identifiers reported back, and the encoding of the
//! `suspend_type` argument.

pub const EXTENSION_ID: usize = 0x48_53_4D; // 'HSM' in ASCII

pub const FUNCTION_HART_START: usize = 0x0;
pub const FUNCTION_HART_STOP: usize = 0x1;
pub const FUNCTION_HART_GET_STATUS: usize = 0x2;
pub const FUNCTION_HART_SUSPEND: usize = 0x3;

/// Powered up and executing normally.
pub const HART_STATE_STARTED: isize = 0;
/// Not executing in supervisor-mode or any lower privilege mode.
pub const HART_STATE_STOPPED: isize = 1;
/// Another hart asked for this one to start; start-up is in progress.
pub const HART_STATE_START_PENDING: isize = 2;
/// The hart asked to stop itself; power-down is in progress.
pub const HART_STATE_STOP_PENDING: isize = 3;
/// In a platform specific suspend (or low power) state.
pub const HART_STATE_SUSPENDED: isize = 4;
/// Entering a platform specific suspend state.
pub const HART_STATE_SUSPEND_PENDING: isize = 5;
/// Woken from a suspend state; resume is in progress.
pub const HART_STATE_RESUME_PENDING: isize = 6;

/// Set in `suspend_type` for suspend states that lose hart context.
pub const SUSPEND_NON_RETENTIVE_BIT: u32 = 0x8000_0000;
/// Default retentive suspend: behaves like WFI with all state preserved.
pub const SUSPEND_RETENTIVE_DEFAULT: u32 = 0x0000_0000;
/// Default non-retentive suspend.
pub const SUSPEND_NON_RETENTIVE_DEFAULT: u32 = SUSPEND_NON_RETENTIVE_BIT;

/// Hart states as tracked by the generic state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HartState {
    Started,
    Stopped,
    StartPending,
    StopPending,
    Suspended,
    SuspendPending,
    ResumePending,
    /// A state id outside the defined range.
    Unknown(isize),
}

impl HartState {
    #[must_use]
    pub fn from_raw(state: isize) -> Self {
        match state {
            HART_STATE_STARTED => Self::Started,
            HART_STATE_STOPPED => Self::Stopped,
            HART_STATE_START_PENDING => Self::StartPending,
            HART_STATE_STOP_PENDING => Self::StopPending,
            HART_STATE_SUSPENDED => Self::Suspended,
            HART_STATE_SUSPEND_PENDING => Self::SuspendPending,
            HART_STATE_RESUME_PENDING => Self::ResumePending,
            _ => Self::Unknown(state),
        }
    }

    #[must_use]
    pub fn into_raw(self) -> isize {
        match self {
            Self::Started => HART_STATE_STARTED,
            Self::Stopped => HART_STATE_STOPPED,
            Self::StartPending => HART_STATE_START_PENDING,
            Self::StopPending => HART_STATE_STOP_PENDING,
            Self::Suspended => HART_STATE_SUSPENDED,
            Self::SuspendPending => HART_STATE_SUSPEND_PENDING,
            Self::ResumePending => HART_STATE_RESUME_PENDING,
            Self::Unknown(state) => state,
        }
    }
}

/// Decoded `suspend_type` argument of `HART_SUSPEND`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuspendType(u32);

impl SuspendType {
    pub const RETENTIVE_DEFAULT: Self = Self(SUSPEND_RETENTIVE_DEFAULT);
    pub const NON_RETENTIVE_DEFAULT: Self = Self(SUSPEND_NON_RETENTIVE_DEFAULT);

    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Whether hart context is lost in this state and must be saved by
    /// software.
    #[must_use]
    pub const fn is_non_retentive(self) -> bool {
        self.0 & SUSPEND_NON_RETENTIVE_BIT != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hart_state_raw() {
        for raw in 0..=6 {
            assert_eq!(HartState::from_raw(raw).into_raw(), raw);
        }
        assert_eq!(HartState::from_raw(4), HartState::Suspended);
        assert_eq!(HartState::from_raw(99), HartState::Unknown(99));
    }

    #[test]
    fn test_suspend_type_retention() {
        assert!(!SuspendType::RETENTIVE_DEFAULT.is_non_retentive());
        assert!(SuspendType::NON_RETENTIVE_DEFAULT.is_non_retentive());
        assert!(SuspendType::from_raw(0x8000_0001).is_non_retentive());
        assert!(!SuspendType::from_raw(0x0000_0001).is_non_retentive());
    }
}
