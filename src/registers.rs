//! # SX127x Register Definitions and Constants
//!
//! Register addresses and bit field constants for the SX1276/77/78/79
//! transceivers. The chip exposes two register banks over the same address
//! space: addresses 0x0D-0x3F mean different things depending on whether the
//! modem runs LoRa or FSK/OOK. Constants here are therefore grouped into a
//! common section and one section per bank; the driver selects the bank from
//! its cached [`Modulation`](crate::driver::Modulation).

// =============================================================================
// Common registers (valid in every modulation)
// =============================================================================

/// FIFO read/write access
pub const REG_FIFO: u8 = 0x00;

/// Operating mode and modulation select
pub const REG_OP_MODE: u8 = 0x01;

/// RF carrier frequency (MSB)
pub const REG_FRF_MSB: u8 = 0x06;

/// RF carrier frequency (mid byte)
pub const REG_FRF_MID: u8 = 0x07;

/// RF carrier frequency (LSB)
pub const REG_FRF_LSB: u8 = 0x08;

/// PA pin selection and output power
pub const REG_PA_CONFIG: u8 = 0x09;

/// PA ramp time and FSK/OOK data shaping
pub const REG_PA_RAMP: u8 = 0x0A;

/// Over-current protection control
pub const REG_OCP: u8 = 0x0B;

/// LNA gain and boost
pub const REG_LNA: u8 = 0x0C;

/// DIO0..DIO3 pin mapping
pub const REG_DIO_MAPPING_1: u8 = 0x40;

/// DIO4/DIO5 pin mapping
pub const REG_DIO_MAPPING_2: u8 = 0x41;

/// Chip version (read-only, probed at construction)
pub const REG_VERSION: u8 = 0x42;

/// High-power (+20 dBm) PA control
pub const REG_PA_DAC: u8 = 0x4D;

// =============================================================================
// LoRa bank (addresses interpreted while LongRangeMode is set)
// =============================================================================

/// SPI read/write pointer into the FIFO window
pub const LORA_REG_FIFO_ADDR_PTR: u8 = 0x0D;

/// FIFO base address for TX
pub const LORA_REG_FIFO_TX_BASE_ADDR: u8 = 0x0E;

/// FIFO base address for RX
pub const LORA_REG_FIFO_RX_BASE_ADDR: u8 = 0x0F;

/// Start address of the last received packet
pub const LORA_REG_FIFO_RX_CURRENT_ADDR: u8 = 0x10;

/// IRQ flags (write 1 to clear)
pub const LORA_REG_IRQ_FLAGS: u8 = 0x12;

/// Number of payload bytes of the last packet (explicit header mode)
pub const LORA_REG_RX_NB_BYTES: u8 = 0x13;

/// SNR of the last packet, signed, in 0.25 dB steps
pub const LORA_REG_PKT_SNR_VALUE: u8 = 0x19;

/// RSSI of the last packet
pub const LORA_REG_PKT_RSSI_VALUE: u8 = 0x1A;

/// Bandwidth, coding rate, header mode
pub const LORA_REG_MODEM_CONFIG_1: u8 = 0x1D;

/// Spreading factor, TX continuous, payload CRC
pub const LORA_REG_MODEM_CONFIG_2: u8 = 0x1E;

/// Preamble length (MSB)
pub const LORA_REG_PREAMBLE_MSB: u8 = 0x20;

/// Preamble length (LSB)
pub const LORA_REG_PREAMBLE_LSB: u8 = 0x21;

/// Payload length (implicit header / TX)
pub const LORA_REG_PAYLOAD_LENGTH: u8 = 0x22;

/// Low data rate optimization, AGC auto
pub const LORA_REG_MODEM_CONFIG_3: u8 = 0x26;

/// Frequency error (4 significant bits + sign)
pub const LORA_REG_FEI_MSB: u8 = 0x28;

/// Frequency error (mid byte)
pub const LORA_REG_FEI_MID: u8 = 0x29;

/// Frequency error (LSB)
pub const LORA_REG_FEI_LSB: u8 = 0x2A;

/// Detection optimize, tied to the spreading factor
pub const LORA_REG_DETECTION_OPTIMIZE: u8 = 0x31;

/// Detection threshold, tied to the spreading factor
pub const LORA_REG_DETECTION_THRESHOLD: u8 = 0x37;

/// Sync word (0x12 private, 0x34 LoRaWAN)
pub const LORA_REG_SYNC_WORD: u8 = 0x39;

// =============================================================================
// FSK/OOK bank
// =============================================================================

/// Bitrate divider (MSB)
pub const FSK_REG_BITRATE_MSB: u8 = 0x02;

/// Bitrate divider (LSB)
pub const FSK_REG_BITRATE_LSB: u8 = 0x03;

/// Frequency deviation (MSB)
pub const FSK_REG_FDEV_MSB: u8 = 0x04;

/// Frequency deviation (LSB)
pub const FSK_REG_FDEV_LSB: u8 = 0x05;

/// RX restart, AFC auto, RX trigger source
pub const FSK_REG_RX_CONFIG: u8 = 0x0D;

/// RSSI offset and smoothing
pub const FSK_REG_RSSI_CONFIG: u8 = 0x0E;

/// Inter-packet RSSI threshold for collision restart
pub const FSK_REG_RSSI_COLLISION: u8 = 0x0F;

/// Current RSSI measurement
pub const FSK_REG_RSSI_VALUE: u8 = 0x11;

/// Channel filter bandwidth
pub const FSK_REG_RX_BW: u8 = 0x12;

/// Channel filter bandwidth during AFC
pub const FSK_REG_AFC_BW: u8 = 0x13;

/// OOK demodulator selection and peak threshold step
pub const FSK_REG_OOK_PEAK: u8 = 0x14;

/// OOK fixed threshold / peak mode floor
pub const FSK_REG_OOK_FIX: u8 = 0x15;

/// OOK average threshold filter and peak decrement
pub const FSK_REG_OOK_AVG: u8 = 0x16;

/// Frequency error indicator (MSB)
pub const FSK_REG_FEI_MSB: u8 = 0x1D;

/// Frequency error indicator (LSB)
pub const FSK_REG_FEI_LSB: u8 = 0x1E;

/// Preamble detector control
pub const FSK_REG_PREAMBLE_DETECT: u8 = 0x1F;

/// Sync word control: auto-restart, polarity, size
pub const FSK_REG_SYNC_CONFIG: u8 = 0x27;

/// First sync word byte (up to 8 consecutive)
pub const FSK_REG_SYNC_VALUE_1: u8 = 0x28;

/// Packet format, encoding, CRC, address filtering
pub const FSK_REG_PACKET_CONFIG_1: u8 = 0x30;

/// Data mode and payload length high bits
pub const FSK_REG_PACKET_CONFIG_2: u8 = 0x31;

/// Payload length (fixed) / max length (variable)
pub const FSK_REG_PAYLOAD_LENGTH: u8 = 0x32;

/// Node address for filtering
pub const FSK_REG_NODE_ADRS: u8 = 0x33;

/// Broadcast address for filtering
pub const FSK_REG_BROADCAST_ADRS: u8 = 0x34;

/// IRQ flags 1: mode ready, preamble detect, sync match
pub const FSK_REG_IRQ_FLAGS_1: u8 = 0x3E;

/// IRQ flags 2: FIFO state, packet sent, payload ready
pub const FSK_REG_IRQ_FLAGS_2: u8 = 0x3F;

/// Fractional part of the bitrate divider (FSK only)
pub const FSK_REG_BITRATE_FRAC: u8 = 0x5D;

// =============================================================================
// Bit field constants
// =============================================================================

/// Expected content of [`REG_VERSION`] for supported silicon
pub const CHIP_VERSION: u8 = 0x12;

/// Operating mode bits within [`REG_OP_MODE`]
pub const OP_MODE_MASK: u8 = 0b0000_0111;

/// LongRangeMode plus FSK/OOK modulation select bits of [`REG_OP_MODE`]
pub const OP_MODE_MODULATION_MASK: u8 = 0b1110_0000;

/// PaSelect bit of [`REG_PA_CONFIG`]: PA_BOOST pin
pub const PA_SELECT_BOOST: u8 = 0b1000_0000;

/// MaxPower = 7 (15 dBm ceiling) on the RFO pin
pub const PA_MAX_POWER: u8 = 0b0111_0000;

/// [`REG_PA_DAC`] value enabling the +20 dBm option
pub const PA_DAC_HIGH_POWER_ON: u8 = 0x87;

/// [`REG_PA_DAC`] default value
pub const PA_DAC_HIGH_POWER_OFF: u8 = 0x84;

/// OcpOn bit of [`REG_OCP`]
pub const OCP_ON: u8 = 0b0010_0000;

/// LNA boost (HF port) bits of [`REG_LNA`]
pub const LNA_BOOST_HF_ON: u8 = 0b0000_0011;

/// DIO0 = TxDone mapping in [`REG_DIO_MAPPING_1`] (LoRa)
pub const DIO0_TX_DONE: u8 = 0b0100_0000;

/// DIO0 = RxDone mapping in [`REG_DIO_MAPPING_1`] (LoRa)
pub const DIO0_RX_DONE: u8 = 0b0000_0000;

/// DIO0 = CadDone mapping in [`REG_DIO_MAPPING_1`] (LoRa)
pub const DIO0_CAD_DONE: u8 = 0b1000_0000;

/// DIO4 = PreambleDetect mapping in [`REG_DIO_MAPPING_2`] (FSK/OOK)
pub const DIO4_PREAMBLE_DETECT: u8 = 0b1100_0000;

/// SyncOn bit of [`FSK_REG_SYNC_CONFIG`]
pub const SYNC_ON: u8 = 0b0001_0000;

/// Size of the shared packet FIFO window, and so the largest payload
pub const MAX_PACKET_LENGTH: usize = 255;
