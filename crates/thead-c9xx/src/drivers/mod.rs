pub mod irq;
pub mod serial;
