use arrayvec::ArrayVec;
use snafu::{OptionExt as _, Snafu};

use super::Plic;

/// Most PLIC instances a platform may register.
pub const PLIC_MAX_NR: usize = 16;

/// Stable index of a PLIC inside a [`ControllerPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ControllerId(usize);

impl ControllerId {
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Snafu)]
#[snafu(display("all {capacity} PLIC slots are in use"))]
pub struct PoolExhaustedError {
    capacity: usize,
    #[snafu(implicit)]
    location: snafu::Location,
}

impl From<&PoolExhaustedError> for sbi_sys::SbiError {
    fn from(_err: &PoolExhaustedError) -> Self {
        Self::NO_SPACE
    }
}

/// Fixed-capacity arena of PLIC instances. Slots are never freed.
#[derive(Debug)]
pub struct ControllerPool<const N: usize = PLIC_MAX_NR> {
    controllers: ArrayVec<Plic, N>,
}

impl<const N: usize> Default for ControllerPool<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ControllerPool<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            controllers: ArrayVec::new_const(),
        }
    }

    pub fn allocate(&mut self, plic: Plic) -> Result<ControllerId, PoolExhaustedError> {
        let id = ControllerId(self.controllers.len());
        self.controllers
            .try_push(plic)
            .ok()
            .context(PoolExhaustedSnafu { capacity: N })?;
        Ok(id)
    }

    #[must_use]
    pub fn get(&self, id: ControllerId) -> Option<&Plic> {
        self.controllers.get(id.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}
