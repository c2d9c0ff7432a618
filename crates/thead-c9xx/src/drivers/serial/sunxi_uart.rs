use core::hint;

use bitflags::bitflags;

use crate::{console::ConsoleDevice, hal::Mmio};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Register {
    offset: usize,
}

impl Register {
    /// Receive Buffer Register (readonly)
    const RX_BUFFER: Self = Self::word(0);
    /// Transmit Holding Register (writeonly)
    const TX_HOLDING: Self = Self::word(0);
    /// UART Status Register (readonly)
    const STATUS: Self = Self::word(0x1f);

    const fn word(index: usize) -> Self {
        Self { offset: index * 4 }
    }
}

bitflags! {
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Status : u32 {
        const BUSY = 1 << 0;
        const TX_FIFO_NOT_FULL = 1 << 1;
        const RX_FIFO_NOT_EMPTY = 1 << 2;
    }
}

/// DesignWare-derived UART found on Allwinner SoCs.
///
/// The boot loader has already configured the line; the firmware only
/// moves bytes.
#[derive(custom_debug_derive::Debug)]
pub struct SunxiUart<M> {
    #[debug(skip)]
    mmio: M,
    #[debug(format = "{:#x}")]
    base_addr: usize,
}

impl<M> SunxiUart<M>
where
    M: Mmio,
{
    pub const fn new(mmio: M, base_addr: usize) -> Self {
        Self { mmio, base_addr }
    }

    #[must_use]
    pub fn base_addr(&self) -> usize {
        self.base_addr
    }

    fn read_register(&self, reg: Register) -> u32 {
        self.mmio.read32(self.base_addr + reg.offset)
    }

    fn write_register(&self, reg: Register, value: u32) {
        self.mmio.write32(self.base_addr + reg.offset, value);
    }

    fn status(&self) -> Status {
        Status::from_bits_retain(self.read_register(Register::STATUS))
    }

    /// Spins until the transmit FIFO has room, then queues `byte`.
    /// Returns the number of status polls that found the FIFO full.
    pub fn write_byte(&self, byte: u8) -> usize {
        let mut spins = 0;
        while !self.status().contains(Status::TX_FIFO_NOT_FULL) {
            spins += 1;
            hint::spin_loop();
        }
        self.write_register(Register::TX_HOLDING, byte.into());
        spins
    }

    /// Returns the next received byte, or `None` if the receive FIFO is empty.
    pub fn read_byte(&self) -> Option<u8> {
        if !self.status().contains(Status::RX_FIFO_NOT_EMPTY) {
            return None;
        }
        let [byte, ..] = self.read_register(Register::RX_BUFFER).to_le_bytes();
        Some(byte)
    }
}

impl<M> ConsoleDevice for SunxiUart<M>
where
    M: Mmio + Sync,
{
    fn name(&self) -> &'static str {
        "sunxi_uart"
    }

    fn putc(&self, ch: u8) {
        self.write_byte(ch);
    }

    fn getc(&self) -> Option<u8> {
        self.read_byte()
    }
}

/// Returns the lowest UART port whose bus clock gate is open.
///
/// `gate` is the value of the CCU UART bus gating register, in which bit `n`
/// gates port `n`.
#[must_use]
pub fn find_uart_port(gate: u32, max_port: u32) -> Option<u32> {
    (0..=max_port).find(|port| gate & (1 << port) != 0)
}
