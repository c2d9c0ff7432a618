//! Allwinner SoC blocks shared by the C906/C910 boards.

pub mod hsm;
