//! T-HEAD C9xx flavour of the PLIC.
//!
//! The C9xx PLIC is a standard PLIC with one extra control register that
//! must be set before supervisor mode may program the controller. Because
//! the whole PLIC loses its state when a hart's power domain is cut, the
//! priorities and the hart's supervisor context are captured before a
//! non-retentive suspend and written back on resume.

use snafu::{OptionExt as _, ResultExt as _, Snafu, ensure};

use super::{
    MAX_ENABLE_WORDS, MAX_SOURCES, Plic, PlicContext, PlicError, PrivilegeMode,
    hartid_table::{HartContextBinding, HartContextTable, HartTableError},
    pool::{ControllerId, ControllerPool, PoolExhaustedError},
};
use crate::{
    hal::Mmio,
    hart::{CurrentHart, HartId},
};

/// Offset of the T-HEAD PLIC control register.
pub const THEAD_PLIC_CTRL_REG: usize = 0x1f_fffc;
/// Permits supervisor-mode access to the PLIC registers.
const THEAD_PLIC_CTRL_S_PER: u32 = 1 << 0;

/// Owner of one PLIC context, as described by the platform's interrupt
/// routing. The context index is the position of the route in its list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextRoute {
    pub hart: HartId,
    pub mode: PrivilegeMode,
}

impl ContextRoute {
    #[must_use]
    pub const fn new(hart: usize, mode: PrivilegeMode) -> Self {
        Self {
            hart: HartId::from_raw(hart),
            mode,
        }
    }
}

#[derive(Debug, Snafu)]
pub enum IrqchipError {
    #[snafu(display("invalid PLIC access"))]
    Plic {
        #[snafu(source)]
        source: PlicError,
        #[snafu(implicit)]
        location: snafu::Location,
    },
    #[snafu(display("failed to register PLIC"))]
    Pool {
        #[snafu(source)]
        source: PoolExhaustedError,
        #[snafu(implicit)]
        location: snafu::Location,
    },
    #[snafu(display("failed to resolve hart binding"))]
    HartTable {
        #[snafu(source)]
        source: HartTableError,
        #[snafu(implicit)]
        location: snafu::Location,
    },
    #[snafu(display("hart {hart} has no {mode:?}-mode PLIC context"))]
    NoContext {
        hart: HartId,
        mode: PrivilegeMode,
        #[snafu(implicit)]
        location: snafu::Location,
    },
    #[snafu(display("hart {hart} is bound to unknown controller {controller:?}"))]
    UnknownController {
        hart: HartId,
        controller: ControllerId,
        #[snafu(implicit)]
        location: snafu::Location,
    },
    #[snafu(display("no PLIC state has been saved"))]
    NothingSaved {
        #[snafu(implicit)]
        location: snafu::Location,
    },
}

impl From<&IrqchipError> for sbi_sys::SbiError {
    fn from(err: &IrqchipError) -> Self {
        match err {
            IrqchipError::Plic { source, .. } => source.into(),
            IrqchipError::Pool { source, .. } => source.into(),
            IrqchipError::HartTable { source, .. } => source.into(),
            IrqchipError::NoContext { .. } | IrqchipError::UnknownController { .. } => {
                Self::NO_ENTRY
            }
            IrqchipError::NothingSaved { .. } => Self::FAILED,
        }
    }
}

/// The registered C9xx PLICs and the contexts serving each hart.
#[derive(Debug, Default)]
pub struct C9xxPlic {
    pool: ControllerPool,
    table: HartContextTable,
}

impl C9xxPlic {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pool: ControllerPool::new(),
            table: HartContextTable::new(),
        }
    }

    #[must_use]
    pub fn pool(&self) -> &ControllerPool {
        &self.pool
    }

    /// Registers and initializes one PLIC.
    ///
    /// `routes[i]` names the hart and privilege mode served by context `i`;
    /// `None` marks a context that no hart uses. The hart table is cleared
    /// when the first controller is registered, so later controllers add to
    /// the bindings made by earlier ones. Routes are checked before anything
    /// is allocated or written, so a rejected controller leaves no trace.
    pub fn cold_init<M>(
        &mut self,
        mmio: &M,
        base_addr: usize,
        num_sources: usize,
        routes: &[Option<ContextRoute>],
    ) -> Result<ControllerId, IrqchipError>
    where
        M: Mmio + ?Sized,
    {
        let plic = Plic::new(base_addr, num_sources).context(PlicSnafu)?;
        for route in routes.iter().flatten() {
            self.table.check_hart(route.hart).context(HartTableSnafu)?;
        }
        let id = self.pool.allocate(plic).context(PoolSnafu)?;

        enable_supervisor_access(mmio, &plic);
        plic.cold_init(mmio);

        if self.pool.len() == 1 {
            self.table.reset();
        }
        for (index, route) in routes.iter().enumerate() {
            let Some(route) = route else {
                continue;
            };
            self.table
                .bind_mode(route.hart, id, route.mode, PlicContext::new(index))
                .context(HartTableSnafu)?;
        }

        debug!(
            "PLIC#{} at {:#x}: {} sources, {} contexts",
            id.index(),
            base_addr,
            num_sources,
            routes.len()
        );
        Ok(id)
    }

    /// Binding of `hart`, as recorded by [`Self::cold_init`].
    pub fn binding(&self, hart: HartId) -> Result<HartContextBinding, IrqchipError> {
        self.table.lookup(hart).context(HartTableSnafu)
    }

    fn resolve(&self, hart: HartId) -> Result<(HartContextBinding, &Plic), IrqchipError> {
        let binding = self.binding(hart)?;
        let plic = self.pool.get(binding.controller).context(UnknownControllerSnafu {
            hart,
            controller: binding.controller,
        })?;
        Ok((binding, plic))
    }

    fn resolve_context(
        &self,
        hart: HartId,
        mode: PrivilegeMode,
    ) -> Result<(PlicContext, &Plic), IrqchipError> {
        let (binding, plic) = self.resolve(hart)?;
        let context = binding.context(mode).context(NoContextSnafu { hart, mode })?;
        Ok((context, plic))
    }

    /// Source count of the controller serving `hart`.
    pub fn num_sources(&self, hart: HartId) -> Result<usize, IrqchipError> {
        Ok(self.resolve(hart)?.1.num_sources())
    }

    /// Enable words per context of the controller serving `hart`.
    pub fn enable_words(&self, hart: HartId) -> Result<usize, IrqchipError> {
        Ok(self.resolve(hart)?.1.enable_words())
    }

    /// Disables and masks every source for the calling hart's contexts.
    pub fn warm_init<M>(&self, mmio: &M, hart: CurrentHart) -> Result<(), IrqchipError>
    where
        M: Mmio + ?Sized,
    {
        let (binding, plic) = self.resolve(hart.id())?;
        plic.warm_init(mmio, binding.m_context, binding.s_context);
        Ok(())
    }

    pub fn save_priority<M>(
        &self,
        mmio: &M,
        hart: CurrentHart,
        out: &mut [u8],
    ) -> Result<(), IrqchipError>
    where
        M: Mmio + ?Sized,
    {
        let (_, plic) = self.resolve(hart.id())?;
        plic.priority_save(mmio, out).context(PlicSnafu)
    }

    pub fn restore_priority<M>(
        &self,
        mmio: &M,
        hart: CurrentHart,
        buf: &[u8],
    ) -> Result<(), IrqchipError>
    where
        M: Mmio + ?Sized,
    {
        let (_, plic) = self.resolve(hart.id())?;
        plic.priority_restore(mmio, buf).context(PlicSnafu)
    }

    /// Copies the enable words of the calling hart's `mode` context into
    /// `enable` and returns its threshold.
    pub fn save_context<M>(
        &self,
        mmio: &M,
        hart: CurrentHart,
        mode: PrivilegeMode,
        enable: &mut [u32],
    ) -> Result<u32, IrqchipError>
    where
        M: Mmio + ?Sized,
    {
        let (context, plic) = self.resolve_context(hart.id(), mode)?;
        plic.context_save(mmio, context, enable).context(PlicSnafu)
    }

    pub fn restore_context<M>(
        &self,
        mmio: &M,
        hart: CurrentHart,
        mode: PrivilegeMode,
        enable: &[u32],
        threshold: u32,
    ) -> Result<(), IrqchipError>
    where
        M: Mmio + ?Sized,
    {
        let (context, plic) = self.resolve_context(hart.id(), mode)?;
        plic.context_restore(mmio, context, enable, threshold)
            .context(PlicSnafu)
    }

    /// Re-arms the control register of the controller serving the calling
    /// hart. Must precede any other restore after a power loss.
    pub fn restore_controller<M>(&self, mmio: &M, hart: CurrentHart) -> Result<(), IrqchipError>
    where
        M: Mmio + ?Sized,
    {
        let (_, plic) = self.resolve(hart.id())?;
        enable_supervisor_access(mmio, plic);
        Ok(())
    }
}

fn enable_supervisor_access<M>(mmio: &M, plic: &Plic)
where
    M: Mmio + ?Sized,
{
    mmio.write32(plic.base_addr() + THEAD_PLIC_CTRL_REG, THEAD_PLIC_CTRL_S_PER);
}

/// PLIC state of one hart that does not survive a power-down: the
/// priorities of every source and the hart's supervisor context.
#[derive(Clone, custom_debug_derive::Debug)]
pub struct SavedPlicContext {
    #[debug(skip)]
    priority: [u8; MAX_SOURCES + 1],
    #[debug(skip)]
    enable: [u32; MAX_ENABLE_WORDS],
    enable_words: usize,
    threshold: u32,
    valid: bool,
}

impl Default for SavedPlicContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SavedPlicContext {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            priority: [0; MAX_SOURCES + 1],
            enable: [0; MAX_ENABLE_WORDS],
            enable_words: 0,
            threshold: 0,
            valid: false,
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Saved enable words of the supervisor context.
    #[must_use]
    pub fn enable(&self) -> &[u32] {
        &self.enable[..self.enable_words]
    }

    #[must_use]
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Captures the supervisor context, then the priorities.
    pub fn save<M>(
        &mut self,
        plic: &C9xxPlic,
        mmio: &M,
        hart: CurrentHart,
    ) -> Result<(), IrqchipError>
    where
        M: Mmio + ?Sized,
    {
        self.valid = false;
        self.enable_words = plic.enable_words(hart.id())?;
        self.threshold =
            plic.save_context(mmio, hart, PrivilegeMode::Supervisor, &mut self.enable)?;
        plic.save_priority(mmio, hart, &mut self.priority)?;
        self.valid = true;
        Ok(())
    }

    /// Re-arms the controller, then writes back the priorities and the
    /// supervisor context. The saved state is consumed even if the restore
    /// fails part way.
    pub fn restore<M>(
        &mut self,
        plic: &C9xxPlic,
        mmio: &M,
        hart: CurrentHart,
    ) -> Result<(), IrqchipError>
    where
        M: Mmio + ?Sized,
    {
        ensure!(self.valid, NothingSavedSnafu);
        self.valid = false;
        plic.restore_controller(mmio, hart)?;
        plic.restore_priority(mmio, hart, &self.priority)?;
        plic.restore_context(
            mmio,
            hart,
            PrivilegeMode::Supervisor,
            self.enable(),
            self.threshold,
        )?;
        Ok(())
    }
}
