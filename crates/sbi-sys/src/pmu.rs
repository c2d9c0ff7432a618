//! SBI Performance Monitoring Unit Extension numbering.

pub const EXTENSION_ID: usize = 0x50_4D_55; // 'PMU' in ASCII

/// Upper bound on hardware counter indices handled by the implementation.
pub const HW_COUNTER_MAX: u32 = 32;
