//! Generic RISC-V PLIC register primitives.
//!
//! ```text
//! 0x00_0000 + 4 * source               priority
//! 0x00_2000 + 0x80 * context + 4 * w   enable word w
//! 0x20_0000 + 0x1000 * context         threshold
//! 0x20_0000 + 0x1000 * context + 4     claim/complete
//! ```
//!
//! Source 0 is reserved and never raised, but it occupies bit 0 of the first
//! enable word and slot 0 of saved priority buffers.

use snafu::{Snafu, ensure};

use crate::hal::Mmio;

pub mod c9xx;
pub mod hartid_table;
pub mod pool;

const PRIORITY_BASE: usize = 0x00_0000;
const ENABLE_BASE: usize = 0x00_2000;
const ENABLE_STRIDE: usize = 0x80;
const CONTEXT_BASE: usize = 0x20_0000;
const CONTEXT_STRIDE: usize = 0x1000;
const CONTEXT_THRESHOLD: usize = 0x0;

/// Largest source id a PLIC can implement.
pub const MAX_SOURCES: usize = 1023;
/// Enable words needed to cover sources `0..=MAX_SOURCES`.
pub const MAX_ENABLE_WORDS: usize = MAX_SOURCES / 32 + 1;

/// Threshold that masks every priority.
pub const THRESHOLD_MASK_ALL: u32 = 0x7;

#[derive(Debug, Snafu)]
pub enum PlicError {
    #[snafu(display("PLIC with {num_sources} sources exceeds the limit of {MAX_SOURCES}"))]
    TooManySources {
        num_sources: usize,
        #[snafu(implicit)]
        location: snafu::Location,
    },
    #[snafu(display("buffer holds {actual} entries but {needed} are required"))]
    BufferTooShort {
        needed: usize,
        actual: usize,
        #[snafu(implicit)]
        location: snafu::Location,
    },
}

/// Privilege mode a PLIC context delivers interrupts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrivilegeMode {
    Machine,
    Supervisor,
}

/// Index of a hart- and privilege-mode-specific view into a PLIC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlicContext {
    id: usize,
}

impl PlicContext {
    #[must_use]
    pub const fn new(id: usize) -> Self {
        Self { id }
    }

    #[must_use]
    pub const fn id(self) -> usize {
        self.id
    }
}

/// One physical PLIC instance. Immutable once created.
#[derive(Clone, Copy, PartialEq, Eq, custom_debug_derive::Debug)]
pub struct Plic {
    #[debug(format = "{:#x}")]
    base_addr: usize,
    num_sources: usize,
}

impl Plic {
    pub fn new(base_addr: usize, num_sources: usize) -> Result<Self, PlicError> {
        ensure!(num_sources <= MAX_SOURCES, TooManySourcesSnafu { num_sources });
        Ok(Self {
            base_addr,
            num_sources,
        })
    }

    #[must_use]
    pub fn base_addr(&self) -> usize {
        self.base_addr
    }

    #[must_use]
    pub fn num_sources(&self) -> usize {
        self.num_sources
    }

    /// Number of 32-bit enable words covering sources `0..=num_sources`.
    #[must_use]
    pub fn enable_words(&self) -> usize {
        self.num_sources / 32 + 1
    }

    /// Length of a priority buffer including the reserved source 0.
    #[must_use]
    pub fn priority_slots(&self) -> usize {
        self.num_sources + 1
    }

    fn priority_addr(&self, source: usize) -> usize {
        self.base_addr + PRIORITY_BASE + source * 4
    }

    fn enable_addr(&self, context: PlicContext, word: usize) -> usize {
        self.base_addr + ENABLE_BASE + ENABLE_STRIDE * context.id + word * 4
    }

    fn threshold_addr(&self, context: PlicContext) -> usize {
        self.base_addr + CONTEXT_BASE + CONTEXT_STRIDE * context.id + CONTEXT_THRESHOLD
    }

    pub fn priority<M>(&self, mmio: &M, source: usize) -> u32
    where
        M: Mmio + ?Sized,
    {
        mmio.read32(self.priority_addr(source))
    }

    pub fn set_priority<M>(&self, mmio: &M, source: usize, priority: u32)
    where
        M: Mmio + ?Sized,
    {
        mmio.write32(self.priority_addr(source), priority);
    }

    pub fn enable_word<M>(&self, mmio: &M, context: PlicContext, word: usize) -> u32
    where
        M: Mmio + ?Sized,
    {
        mmio.read32(self.enable_addr(context, word))
    }

    pub fn set_enable_word<M>(&self, mmio: &M, context: PlicContext, word: usize, value: u32)
    where
        M: Mmio + ?Sized,
    {
        mmio.write32(self.enable_addr(context, word), value);
    }

    pub fn threshold<M>(&self, mmio: &M, context: PlicContext) -> u32
    where
        M: Mmio + ?Sized,
    {
        mmio.read32(self.threshold_addr(context))
    }

    pub fn set_threshold<M>(&self, mmio: &M, context: PlicContext, threshold: u32)
    where
        M: Mmio + ?Sized,
    {
        mmio.write32(self.threshold_addr(context), threshold);
    }

    /// Sets every source priority to zero, which keeps all sources silent.
    pub fn cold_init<M>(&self, mmio: &M)
    where
        M: Mmio + ?Sized,
    {
        for source in 1..=self.num_sources {
            self.set_priority(mmio, source, 0);
        }
    }

    /// Disables every source for the given contexts and masks them fully.
    pub fn warm_init<M>(&self, mmio: &M, m_context: Option<PlicContext>, s_context: Option<PlicContext>)
    where
        M: Mmio + ?Sized,
    {
        for context in [m_context, s_context].into_iter().flatten() {
            for word in 0..self.enable_words() {
                self.set_enable_word(mmio, context, word, 0);
            }
        }
        for context in [m_context, s_context].into_iter().flatten() {
            self.set_threshold(mmio, context, THRESHOLD_MASK_ALL);
        }
    }

    /// Copies source priorities into `out[1..=num_sources]`.
    ///
    /// Only the low byte of each priority register is kept; C9xx PLICs
    /// implement five priority bits.
    pub fn priority_save<M>(&self, mmio: &M, out: &mut [u8]) -> Result<(), PlicError>
    where
        M: Mmio + ?Sized,
    {
        check_len(self.priority_slots(), out.len())?;
        for (source, slot) in out.iter_mut().enumerate().take(self.priority_slots()).skip(1) {
            let [low, ..] = self.priority(mmio, source).to_le_bytes();
            *slot = low;
        }
        Ok(())
    }

    /// Writes `buf[1..=num_sources]` back into the priority registers.
    pub fn priority_restore<M>(&self, mmio: &M, buf: &[u8]) -> Result<(), PlicError>
    where
        M: Mmio + ?Sized,
    {
        check_len(self.priority_slots(), buf.len())?;
        for (source, &priority) in buf.iter().enumerate().take(self.priority_slots()).skip(1) {
            self.set_priority(mmio, source, priority.into());
        }
        Ok(())
    }

    /// Copies the enable words of `context` into `enable` and returns its
    /// threshold.
    pub fn context_save<M>(
        &self,
        mmio: &M,
        context: PlicContext,
        enable: &mut [u32],
    ) -> Result<u32, PlicError>
    where
        M: Mmio + ?Sized,
    {
        check_len(self.enable_words(), enable.len())?;
        for (word, value) in enable.iter_mut().enumerate().take(self.enable_words()) {
            *value = self.enable_word(mmio, context, word);
        }
        Ok(self.threshold(mmio, context))
    }

    pub fn context_restore<M>(
        &self,
        mmio: &M,
        context: PlicContext,
        enable: &[u32],
        threshold: u32,
    ) -> Result<(), PlicError>
    where
        M: Mmio + ?Sized,
    {
        check_len(self.enable_words(), enable.len())?;
        for (word, &value) in enable.iter().enumerate().take(self.enable_words()) {
            self.set_enable_word(mmio, context, word, value);
        }
        self.set_threshold(mmio, context, threshold);
        Ok(())
    }
}

fn check_len(needed: usize, actual: usize) -> Result<(), PlicError> {
    ensure!(actual >= needed, BufferTooShortSnafu { needed, actual });
    Ok(())
}

impl From<&PlicError> for sbi_sys::SbiError {
    fn from(_err: &PlicError) -> Self {
        Self::INVALID_PARAM
    }
}
