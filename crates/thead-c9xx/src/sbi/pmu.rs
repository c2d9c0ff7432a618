/// Counter capabilities of a hart, filled in during feature detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HartFeatures {
    /// Number of implemented `mhpmcounter` registers.
    pub mhpm_count: u32,
    /// Width in bits of each `mhpmcounter`.
    pub mhpm_bits: u32,
}

/// Platform hook for counter overflow interrupts.
pub trait PmuDevice {
    /// Arms the overflow interrupt of hardware counter `counter`.
    fn enable_irq(&self, counter: u32);
    fn disable_irq(&self, counter: u32);
    /// `mip`/`mie` bit of the overflow interrupt.
    fn irq_bit(&self) -> usize;
    /// Overrides counter capabilities the generic layer cannot discover.
    fn extensions_init(&self, features: &mut HartFeatures);
}
