//! Which PLIC, and which contexts inside it, serve each hart.
//!
//! The table is populated while the cold-boot hart initializes the interrupt
//! controllers and is only read afterwards. Every hart looks up its own entry
//! during warm init and on suspend/resume.

use snafu::{Snafu, ensure};

use super::{PlicContext, PrivilegeMode, pool::ControllerId};
use crate::hart::HartId;

/// Largest number of harts the firmware can address.
pub const HARTMASK_MAX_BITS: usize = 128;

#[derive(Debug, Snafu)]
pub enum HartTableError {
    #[snafu(display("hart {hart} is outside the {capacity} supported harts"))]
    HartOutOfRange {
        hart: HartId,
        capacity: usize,
        #[snafu(implicit)]
        location: snafu::Location,
    },
    #[snafu(display("hart {hart} is not bound to any PLIC"))]
    Unbound {
        hart: HartId,
        #[snafu(implicit)]
        location: snafu::Location,
    },
}

impl From<&HartTableError> for sbi_sys::SbiError {
    fn from(err: &HartTableError) -> Self {
        match err {
            HartTableError::HartOutOfRange { .. } => Self::NO_SPACE,
            HartTableError::Unbound { .. } => Self::NO_ENTRY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HartContextBinding {
    pub controller: ControllerId,
    pub m_context: Option<PlicContext>,
    pub s_context: Option<PlicContext>,
}

impl HartContextBinding {
    #[must_use]
    pub fn context(&self, mode: PrivilegeMode) -> Option<PlicContext> {
        match mode {
            PrivilegeMode::Machine => self.m_context,
            PrivilegeMode::Supervisor => self.s_context,
        }
    }
}

#[derive(Debug)]
pub struct HartContextTable<const N: usize = HARTMASK_MAX_BITS> {
    entries: [Option<HartContextBinding>; N],
}

impl<const N: usize> Default for HartContextTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> HartContextTable<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: [None; N] }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Marks every hart as unbound.
    pub fn reset(&mut self) {
        self.entries = [None; N];
    }

    /// Fails if `hart` cannot have an entry in this table.
    pub fn check_hart(&self, hart: HartId) -> Result<(), HartTableError> {
        ensure!(
            hart.raw() < N,
            HartOutOfRangeSnafu {
                hart,
                capacity: N
            }
        );
        Ok(())
    }

    fn slot_mut(&mut self, hart: HartId) -> Result<&mut Option<HartContextBinding>, HartTableError> {
        self.check_hart(hart)?;
        Ok(&mut self.entries[hart.raw()])
    }

    /// Records the complete binding of `hart`. Binding the same values twice
    /// is a no-op.
    pub fn bind(
        &mut self,
        hart: HartId,
        controller: ControllerId,
        m_context: Option<PlicContext>,
        s_context: Option<PlicContext>,
    ) -> Result<(), HartTableError> {
        *self.slot_mut(hart)? = Some(HartContextBinding {
            controller,
            m_context,
            s_context,
        });
        Ok(())
    }

    /// Records one context of `hart`, keeping the other mode's context if the
    /// hart is already bound to the same controller.
    pub fn bind_mode(
        &mut self,
        hart: HartId,
        controller: ControllerId,
        mode: PrivilegeMode,
        context: PlicContext,
    ) -> Result<(), HartTableError> {
        let slot = self.slot_mut(hart)?;
        let mut binding = match *slot {
            Some(binding) if binding.controller == controller => binding,
            _ => HartContextBinding {
                controller,
                m_context: None,
                s_context: None,
            },
        };
        match mode {
            PrivilegeMode::Machine => binding.m_context = Some(context),
            PrivilegeMode::Supervisor => binding.s_context = Some(context),
        }
        *slot = Some(binding);
        Ok(())
    }

    pub fn lookup(&self, hart: HartId) -> Result<HartContextBinding, HartTableError> {
        ensure!(
            hart.raw() < N,
            HartOutOfRangeSnafu {
                hart,
                capacity: N
            }
        );
        self.entries[hart.raw()].ok_or_else(|| UnboundSnafu { hart }.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::irq::plic::pool::ControllerId;

    fn hart(id: usize) -> HartId {
        HartId::from_raw(id)
    }

    #[test]
    fn test_lookup_is_stable() {
        let mut table = HartContextTable::<8>::new();
        let controller = ControllerId::from_index(0);
        table
            .bind(hart(2), controller, Some(PlicContext::new(4)), Some(PlicContext::new(5)))
            .unwrap();
        let first = table.lookup(hart(2)).unwrap();
        for _ in 0..3 {
            assert_eq!(table.lookup(hart(2)).unwrap(), first);
        }
        assert_eq!(first.context(PrivilegeMode::Machine), Some(PlicContext::new(4)));
        assert_eq!(first.context(PrivilegeMode::Supervisor), Some(PlicContext::new(5)));

        // idempotent
        table
            .bind(hart(2), controller, Some(PlicContext::new(4)), Some(PlicContext::new(5)))
            .unwrap();
        assert_eq!(table.lookup(hart(2)).unwrap(), first);
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let mut table = HartContextTable::<4>::new();
        let err = table
            .bind(hart(4), ControllerId::from_index(0), None, None)
            .unwrap_err();
        assert!(matches!(
            err,
            HartTableError::HartOutOfRange { capacity: 4, .. }
        ));
        assert_eq!(sbi_sys::SbiError::from(&err), sbi_sys::SbiError::NO_SPACE);
        table.check_hart(hart(3)).unwrap();
        assert!(matches!(
            table.check_hart(hart(4)),
            Err(HartTableError::HartOutOfRange { .. })
        ));
    }

    #[test]
    fn test_unbound_lookup() {
        let table = HartContextTable::<4>::new();
        let err = table.lookup(hart(1)).unwrap_err();
        assert!(matches!(err, HartTableError::Unbound { .. }));
        assert_eq!(sbi_sys::SbiError::from(&err), sbi_sys::SbiError::NO_ENTRY);
    }

    #[test]
    fn test_bind_mode_merges_contexts() {
        let mut table = HartContextTable::<4>::new();
        let a = ControllerId::from_index(0);
        let b = ControllerId::from_index(1);
        table
            .bind_mode(hart(1), a, PrivilegeMode::Machine, PlicContext::new(2))
            .unwrap();
        table
            .bind_mode(hart(1), a, PrivilegeMode::Supervisor, PlicContext::new(3))
            .unwrap();
        assert_eq!(
            table.lookup(hart(1)).unwrap(),
            HartContextBinding {
                controller: a,
                m_context: Some(PlicContext::new(2)),
                s_context: Some(PlicContext::new(3)),
            }
        );

        // moving to another controller drops the stale context
        table
            .bind_mode(hart(1), b, PrivilegeMode::Supervisor, PlicContext::new(1))
            .unwrap();
        assert_eq!(
            table.lookup(hart(1)).unwrap(),
            HartContextBinding {
                controller: b,
                m_context: None,
                s_context: Some(PlicContext::new(1)),
            }
        );
    }

    #[test]
    fn test_reset() {
        let mut table = HartContextTable::<4>::new();
        table
            .bind(hart(0), ControllerId::from_index(0), Some(PlicContext::new(0)), None)
            .unwrap();
        table.reset();
        assert!(table.lookup(hart(0)).is_err());
    }
}
