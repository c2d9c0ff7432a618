//! Access to CSRs selected at run time.
//!
//! CSR numbers are immediates in the instruction encoding, so every CSR that
//! may be accessed dynamically is listed in [`SUPPORTED`] and dispatched by a
//! `match`. Accessors return `None` for numbers outside that list.
//! Standard CSRs are read through [`riscv::register`]. Inline assembly is
//! kept for the vendor CSRs the `riscv` crate does not know and for bit masks
//! the crate only exposes per field.

use riscv::register::{self, medeleg, mhartid, mideleg, mip, pmpcfg0};

pub const MEDELEG: u16 = 0x302;
pub const MIDELEG: u16 = 0x303;
pub const MHPMEVENT3: u16 = 0x323;
pub const MIP: u16 = 0x344;
pub const PMPCFG0: u16 = 0x3a0;
pub const PMPADDR0: u16 = 0x3b0;
pub const MHARTID: u16 = 0xf14;

/// T-HEAD extended status.
pub const MXSTATUS: u16 = 0x7c0;
/// T-HEAD hardware configuration (cache enables).
pub const MHCR: u16 = 0x7c1;
/// T-HEAD cache operation register.
pub const MCOR: u16 = 0x7c2;
/// T-HEAD L2 cache control.
pub const MCCR2: u16 = 0x7c3;
/// T-HEAD implicit operation control (prefetch, branch prediction).
pub const MHINT: u16 = 0x7c5;
/// T-HEAD reset release mask, one bit per core.
pub const MRMR: u16 = 0x7c6;
/// T-HEAD reset vector base.
pub const MRVBR: u16 = 0x7c7;
/// T-HEAD counter write enable for S-mode.
pub const MCOUNTERWEN: u16 = 0x7c9;
/// T-HEAD per-counter overflow interrupt enable.
pub const MCOUNTERINTEN: u16 = 0x7ca;
/// T-HEAD per-counter overflow flags.
pub const MCOUNTEROF: u16 = 0x7cb;
/// SpacemiT L2 setup, one snoop enable bit per core of the cluster.
pub const ML2SETUP: u16 = 0x7f0;
/// T-HEAD APB base address, which is where the PLIC lives.
pub const MAPBADDR: u16 = 0xfc1;

/// `pmpaddr{n}` for `n < 8`.
#[must_use]
pub const fn pmpaddr(n: u16) -> u16 {
    assert!(n < 8);
    PMPADDR0 + n
}

/// `mhpmevent{n}` for `3 <= n <= 31`.
#[must_use]
pub const fn mhpmevent(n: u16) -> u16 {
    assert!(n >= 3 && n <= 31);
    MHPMEVENT3 + (n - 3)
}

macro_rules! csr_access {
    (
        read_only: [$($ro:literal => $ro_read:expr),* $(,)?],
        typed: [$($typed:literal => $typed_read:expr),* $(,)?],
        plain: [$($plain:literal => $reg:ident),* $(,)?],
        vendor: [$($vendor:literal),* $(,)?] $(,)?
    ) => {
        /// CSR numbers accepted by the accessors in this module.
        pub const SUPPORTED: &[u16] = &[$($ro,)* $($typed,)* $($plain,)* $($vendor,)*];

        /// Reads `csr`.
        #[must_use]
        pub fn read(csr: u16) -> Option<usize> {
            let value = match csr {
                $($ro => $ro_read,)*
                $($typed => $typed_read,)*
                $($plain => register::$reg::read(),)*
                $($vendor => imp::read::<$vendor>(),)*
                _ => return None,
            };
            Some(value)
        }

        /// Writes `value` to `csr`.
        pub fn write(csr: u16, value: usize) -> Option<()> {
            match csr {
                $($plain => unsafe { register::$reg::write(value) },)*
                $($typed => imp::write::<$typed>(value),)*
                $($vendor => imp::write::<$vendor>(value),)*
                _ => return None,
            }
            Some(())
        }

        /// Sets the bits of `mask` in `csr`.
        pub fn set(csr: u16, mask: usize) -> Option<()> {
            match csr {
                $($typed => imp::set::<$typed>(mask),)*
                $($plain => imp::set::<$plain>(mask),)*
                $($vendor => imp::set::<$vendor>(mask),)*
                _ => return None,
            }
            Some(())
        }

        /// Clears the bits of `mask` in `csr`.
        pub fn clear(csr: u16, mask: usize) -> Option<()> {
            match csr {
                $($typed => imp::clear::<$typed>(mask),)*
                $($plain => imp::clear::<$plain>(mask),)*
                $($vendor => imp::clear::<$vendor>(mask),)*
                _ => return None,
            }
            Some(())
        }
    };
}

// Standard CSRs go through `riscv::register`. Those the crate only models as
// typed bit fields are read through it and written with the raw
// instruction, as is every bit set or clear.
csr_access! {
    read_only: [
        0xf14 => mhartid::read(),
    ],
    typed: [
        0x302 => medeleg::read().bits(),
        0x303 => mideleg::read().bits(),
        0x344 => mip::read().bits(),
        0x3a0 => pmpcfg0::read().bits,
    ],
    plain: [
        0x3b0 => pmpaddr0, 0x3b1 => pmpaddr1, 0x3b2 => pmpaddr2, 0x3b3 => pmpaddr3,
        0x3b4 => pmpaddr4, 0x3b5 => pmpaddr5, 0x3b6 => pmpaddr6, 0x3b7 => pmpaddr7,
        0x323 => mhpmevent3, 0x324 => mhpmevent4, 0x325 => mhpmevent5, 0x326 => mhpmevent6,
        0x327 => mhpmevent7, 0x328 => mhpmevent8, 0x329 => mhpmevent9, 0x32a => mhpmevent10,
        0x32b => mhpmevent11, 0x32c => mhpmevent12, 0x32d => mhpmevent13, 0x32e => mhpmevent14,
        0x32f => mhpmevent15, 0x330 => mhpmevent16, 0x331 => mhpmevent17, 0x332 => mhpmevent18,
        0x333 => mhpmevent19, 0x334 => mhpmevent20, 0x335 => mhpmevent21, 0x336 => mhpmevent22,
        0x337 => mhpmevent23, 0x338 => mhpmevent24, 0x339 => mhpmevent25, 0x33a => mhpmevent26,
        0x33b => mhpmevent27, 0x33c => mhpmevent28, 0x33d => mhpmevent29, 0x33e => mhpmevent30,
        0x33f => mhpmevent31,
    ],
    vendor: [
        0x7c0, 0x7c1, 0x7c2, 0x7c3, 0x7c5, 0x7c6, 0x7c7, 0x7c9, 0x7ca, 0x7cb, // T-HEAD
        0x7f0, // ml2setup
        0xfc1, // mapbaddr
    ],
}

mod imp {
    cfg_if::cfg_if! {
        if #[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))] {
            #[inline]
            pub fn read<const CSR: u16>() -> usize {
                let value: usize;
                unsafe {
                    core::arch::asm!("csrr {0}, {csr}", out(reg) value, csr = const CSR, options(nostack));
                }
                value
            }

            #[inline]
            pub fn write<const CSR: u16>(value: usize) {
                unsafe {
                    core::arch::asm!("csrw {csr}, {0}", in(reg) value, csr = const CSR, options(nostack));
                }
            }

            #[inline]
            pub fn set<const CSR: u16>(mask: usize) {
                unsafe {
                    core::arch::asm!("csrs {csr}, {0}", in(reg) mask, csr = const CSR, options(nostack));
                }
            }

            #[inline]
            pub fn clear<const CSR: u16>(mask: usize) {
                unsafe {
                    core::arch::asm!("csrc {csr}, {0}", in(reg) mask, csr = const CSR, options(nostack));
                }
            }
        } else {
            pub fn read<const CSR: u16>() -> usize {
                unimplemented!("unsupported architecture")
            }

            pub fn write<const CSR: u16>(value: usize) {
                let _ = value;
                unimplemented!("unsupported architecture")
            }

            pub fn set<const CSR: u16>(mask: usize) {
                let _ = mask;
                unimplemented!("unsupported architecture")
            }

            pub fn clear<const CSR: u16>(mask: usize) {
                let _ = mask;
                unimplemented!("unsupported architecture")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported() {
        for csr in [MEDELEG, MIDELEG, MIP, PMPCFG0, MHARTID, MAPBADDR, ML2SETUP] {
            assert!(SUPPORTED.contains(&csr), "{csr:#x}");
        }
        for n in 0..8 {
            assert!(SUPPORTED.contains(&pmpaddr(n)));
        }
        for n in 3..=31 {
            assert!(SUPPORTED.contains(&mhpmevent(n)));
        }
        for csr in MXSTATUS..=MCOUNTEROF {
            // 0x7c4 and 0x7c8 are not implemented
            assert_eq!(SUPPORTED.contains(&csr), csr != 0x7c4 && csr != 0x7c8);
        }
    }

    #[test]
    fn test_unsupported_csr() {
        assert_eq!(read(0x999), None);
        assert_eq!(write(0x999, 1), None);
        assert_eq!(set(0x7c4, 1), None);
        assert_eq!(clear(PMPADDR0 + 8, 1), None);
    }

    #[test]
    fn test_mhartid_is_read_only() {
        assert_eq!(write(MHARTID, 0), None);
        assert_eq!(set(MHARTID, 1), None);
        assert_eq!(clear(MHARTID, 1), None);
    }
}
