use core::fmt;

use crate::hal::Processor;

/// Hart identifier as reported by `mhartid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
#[display("{_0}")]
pub struct HartId(usize);

impl HartId {
    #[must_use]
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> usize {
        self.0
    }
}

/// Proof that the holder is executing on the hart it names.
///
/// Per-hart state (PLIC contexts, suspend buffers) is only ever touched by
/// its owning hart. Operations on such state take a `CurrentHart` rather than
/// a bare [`HartId`], so that one hart cannot name another by accident.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CurrentHart(HartId);

impl CurrentHart {
    /// Reads the identity of the calling hart.
    pub fn get<P>(processor: &P) -> Self
    where
        P: Processor + ?Sized,
    {
        Self(HartId(processor.hart_id()))
    }

    /// # Safety
    ///
    /// The caller must be executing on hart `id`, or must otherwise guarantee
    /// that hart `id` does not touch its per-hart state concurrently.
    #[must_use]
    pub const unsafe fn assume(id: HartId) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn id(self) -> HartId {
        self.0
    }
}

impl fmt::Debug for CurrentHart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CurrentHart({})", self.0)
    }
}
