//! Board support: the C910/C906 family on Allwinner parts and the SpacemiT
//! K1.

pub mod c910;
pub mod config;
pub mod spacemit;
pub mod sunxi;

/// Splits a 64-bit address into the low and high words of a register pair.
pub(crate) fn split_u64(value: u64) -> [u32; 2] {
    let bytes = value.to_le_bytes();
    let lo = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let hi = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    [lo, hi]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_u64() {
        assert_eq!(split_u64(0x1_4000_0000), [0x4000_0000, 1]);
        assert_eq!(split_u64(0x8020_0000), [0x8020_0000, 0]);
    }
}
