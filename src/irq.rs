//! # SX127x Interrupt Flag Registers
//!
//! Typed views of the IRQ flag registers. The two modems expose entirely
//! different flag layouts: LoRa packs everything into one register at 0x12
//! (write 1 to clear), while FSK/OOK spreads state over two registers at
//! 0x3E/0x3F where most packet flags clear themselves on FIFO access or mode
//! change. [`handle_interrupt`](crate::driver::Sx127xDriver::handle_interrupt)
//! picks the layout from the cached modulation.

use bitflags::bitflags;

bitflags! {
    /// LoRa IRQ flags, register 0x12
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LoraIrqFlags: u8 {
        const CAD_DETECTED = 1 << 0;
        const FHSS_CHANGE_CHANNEL = 1 << 1;
        const CAD_DONE = 1 << 2;
        const TX_DONE = 1 << 3;
        const VALID_HEADER = 1 << 4;
        const PAYLOAD_CRC_ERROR = 1 << 5;
        const RX_DONE = 1 << 6;
        const RX_TIMEOUT = 1 << 7;
    }
}

bitflags! {
    /// FSK/OOK IRQ flags 1, register 0x3E
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FskIrqFlags1: u8 {
        const SYNC_ADDRESS_MATCH = 1 << 0;
        const PREAMBLE_DETECT = 1 << 1;
        const TIMEOUT = 1 << 2;
        const RSSI = 1 << 3;
        const PLL_LOCK = 1 << 4;
        const TX_READY = 1 << 5;
        const RX_READY = 1 << 6;
        const MODE_READY = 1 << 7;
    }
}

bitflags! {
    /// FSK/OOK IRQ flags 2, register 0x3F
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FskIrqFlags2: u8 {
        const LOW_BAT = 1 << 0;
        const CRC_OK = 1 << 1;
        const PAYLOAD_READY = 1 << 2;
        const PACKET_SENT = 1 << 3;
        const FIFO_OVERRUN = 1 << 4;
        const FIFO_LEVEL = 1 << 5;
        const FIFO_EMPTY = 1 << 6;
        const FIFO_FULL = 1 << 7;
    }
}
