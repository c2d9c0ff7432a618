//! This crate provides the raw numbering of the RISC-V Supervisor Binary
//! Interface (SBI) as seen from the implementation side.
//!
//! Firmware that services SBI calls uses these definitions to decode extension
//! and function identifiers and to encode the values it hands back to the
//! supervisor. No call is issued from here; the crate only fixes the numbers
//! both sides agree on.

#![cfg_attr(not(test), no_std)]

use core::{error::Error, fmt, num::NonZeroIsize};

pub mod hart_state_management;
pub mod pmu;
pub mod system_reset;
pub mod vendor;

/// Represents an SBI error code.
///
/// The first block of codes is defined by the SBI specification and may be
/// returned to the supervisor. The second block is used only between the
/// platform layer and the generic firmware layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SbiError(Option<NonZeroIsize>);

impl SbiError {
    /// Completed successfully.
    pub const SUCCESS: Self = Self(None);

    /// Failed.
    pub const FAILED: Self = Self(NonZeroIsize::new(-1));

    /// Not supported.
    pub const NOT_SUPPORTED: Self = Self(NonZeroIsize::new(-2));

    /// Invalid parameter(s).
    pub const INVALID_PARAM: Self = Self(NonZeroIsize::new(-3));

    /// Denied or not allowed.
    pub const DENIED: Self = Self(NonZeroIsize::new(-4));

    /// Invalid address(s).
    pub const INVALID_ADDRESS: Self = Self(NonZeroIsize::new(-5));

    /// Already available.
    pub const ALREADY_AVAILABLE: Self = Self(NonZeroIsize::new(-6));

    /// Already started.
    pub const ALREADY_STARTED: Self = Self(NonZeroIsize::new(-7));

    /// Already stopped.
    pub const ALREADY_STOPPED: Self = Self(NonZeroIsize::new(-8));

    /// No such device.
    pub const NO_DEVICE: Self = Self(NonZeroIsize::new(-1000));

    /// Operation not implemented by this platform.
    pub const NO_SYS: Self = Self(NonZeroIsize::new(-1001));

    /// Timed out.
    pub const TIMED_OUT: Self = Self(NonZeroIsize::new(-1002));

    /// No space left in a fixed-size table.
    pub const NO_SPACE: Self = Self(NonZeroIsize::new(-1005));

    /// Out of memory.
    pub const NO_MEMORY: Self = Self(NonZeroIsize::new(-1006));

    /// No such entry.
    pub const NO_ENTRY: Self = Self(NonZeroIsize::new(-1008));

    /// Creates an error from a raw code. `0` yields [`SbiError::SUCCESS`].
    #[must_use]
    pub const fn from_code(code: isize) -> Self {
        Self(NonZeroIsize::new(code))
    }

    /// Returns the raw signed code.
    #[must_use]
    pub const fn code(self) -> isize {
        match self.0 {
            Some(code) => code.get(),
            None => 0,
        }
    }
}

impl fmt::Display for SbiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::SUCCESS => write!(f, "completed successfully"),
            Self::FAILED => write!(f, "failed"),
            Self::NOT_SUPPORTED => write!(f, "not supported"),
            Self::INVALID_PARAM => write!(f, "invalid parameter(s)"),
            Self::DENIED => write!(f, "denied or not allowed"),
            Self::INVALID_ADDRESS => write!(f, "invalid address(s)"),
            Self::ALREADY_AVAILABLE => write!(f, "already available"),
            Self::ALREADY_STARTED => write!(f, "already started"),
            Self::ALREADY_STOPPED => write!(f, "already stopped"),
            Self::NO_DEVICE => write!(f, "no such device"),
            Self::NO_SYS => write!(f, "not implemented"),
            Self::TIMED_OUT => write!(f, "timed out"),
            Self::NO_SPACE => write!(f, "no space left"),
            Self::NO_MEMORY => write!(f, "out of memory"),
            Self::NO_ENTRY => write!(f, "no such entry"),
            Self(Some(code)) => write!(f, "unknown error ({code})"),
        }
    }
}

impl Error for SbiError {}

/// The pair of registers handed back to the caller of an SBI function.
///
/// `error` lands in `a0` and `value` in `a1`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct SbiRet {
    /// SBI error code (0 for success, negative for errors).
    pub error: isize,
    /// SBI return value.
    pub value: usize,
}

impl SbiRet {
    /// A successful return carrying `value`.
    pub const fn success(value: usize) -> Self {
        Self { error: 0, value }
    }

    /// A failed return. The value register is left zero.
    pub const fn failure(error: SbiError) -> Self {
        Self {
            error: error.code(),
            value: 0,
        }
    }
}

impl From<Result<usize, SbiError>> for SbiRet {
    fn from(res: Result<usize, SbiError>) -> Self {
        match res {
            Ok(value) => Self::success(value),
            Err(error) => Self::failure(error),
        }
    }
}
