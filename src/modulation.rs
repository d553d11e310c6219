//! # SX127x Modulation and Packet Configuration Options
//!
//! Enumerated configuration values for both modems. Discriminants are the raw
//! register encodings from the SX1276 datasheet, so the engines can shift
//! them straight into their bit fields.
//!
//! ## Packet Structure
//!
//! FSK/OOK packets have this general structure:
//! ```text
//! ┌───────────┐ ┌────────────┐ ┌──────────┐ ┌────────────┐ ┌───────┐
//! │ Preamble  │ │ Sync Word  │ │ Len/Addr │ │  Payload   │ │ CRC   │
//! │ (var len) │ │ (1-8 bytes)│ │ (opt.)   │ │ (0-255 B)  │ │ (2 B) │
//! └───────────┘ └────────────┘ └──────────┘ └────────────┘ └───────┘
//! ```
//!
//! LoRa packets carry the equivalent metadata in the PHY header unless the
//! link runs in implicit header mode, in which case both ends must be
//! preconfigured with [`ImplicitHeader`](crate::lora::ImplicitHeader).

/// Signal bandwidth for LoRa, bits 7:4 of ModemConfig1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bandwidth {
    BW7_8 = 0x00,   // 7.8 kHz
    BW10_4 = 0x01,  // 10.4 kHz
    BW15_6 = 0x02,  // 15.6 kHz
    BW20_8 = 0x03,  // 20.8 kHz
    BW31_25 = 0x04, // 31.25 kHz
    BW41_7 = 0x05,  // 41.7 kHz
    BW62_5 = 0x06,  // 62.5 kHz
    BW125 = 0x07,   // 125 kHz
    BW250 = 0x08,   // 250 kHz
    BW500 = 0x09,   // 500 kHz
}

impl Bandwidth {
    /// Realized signal bandwidth in Hz
    pub const fn hz(self) -> u32 {
        match self {
            Bandwidth::BW7_8 => 7_800,
            Bandwidth::BW10_4 => 10_400,
            Bandwidth::BW15_6 => 15_600,
            Bandwidth::BW20_8 => 20_800,
            Bandwidth::BW31_25 => 31_250,
            Bandwidth::BW41_7 => 41_700,
            Bandwidth::BW62_5 => 62_500,
            Bandwidth::BW125 => 125_000,
            Bandwidth::BW250 => 250_000,
            Bandwidth::BW500 => 500_000,
        }
    }

    /// Recover the bandwidth from ModemConfig1 bits 7:4
    pub const fn from_bits(bits: u8) -> Option<Bandwidth> {
        match bits {
            0x00 => Some(Bandwidth::BW7_8),
            0x01 => Some(Bandwidth::BW10_4),
            0x02 => Some(Bandwidth::BW15_6),
            0x03 => Some(Bandwidth::BW20_8),
            0x04 => Some(Bandwidth::BW31_25),
            0x05 => Some(Bandwidth::BW41_7),
            0x06 => Some(Bandwidth::BW62_5),
            0x07 => Some(Bandwidth::BW125),
            0x08 => Some(Bandwidth::BW250),
            0x09 => Some(Bandwidth::BW500),
            _ => None,
        }
    }
}

/// Spreading factor for LoRa, bits 7:4 of ModemConfig2
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SpreadingFactor {
    SF6 = 0x06,
    SF7 = 0x07,
    SF8 = 0x08,
    SF9 = 0x09,
    SF10 = 0x0A,
    SF11 = 0x0B,
    SF12 = 0x0C,
}

/// Coding rate for LoRa, bits 3:1 of ModemConfig1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodingRate {
    CR4_5 = 0x01,
    CR4_6 = 0x02,
    CR4_7 = 0x03,
    CR4_8 = 0x04,
}

/// LNA gain settings, G1 strongest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LnaGain {
    G1 = 0x01,
    G2 = 0x02,
    G3 = 0x03,
    G4 = 0x04,
    G5 = 0x05,
    G6 = 0x06,
}

/// Output pin of the power amplifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaPin {
    /// RFO pin: -4 to +15 dBm
    Rfo,
    /// PA_BOOST pin: +2 to +17 dBm, or +20 dBm with the high-power option
    Boost,
}

/// PA ramp time, bits 3:0 of RegPaRamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaRamp {
    Ramp3_4Ms = 0x00,
    Ramp2Ms = 0x01,
    Ramp1Ms = 0x02,
    Ramp500Us = 0x03,
    Ramp250Us = 0x04,
    Ramp125Us = 0x05,
    Ramp100Us = 0x06,
    Ramp62Us = 0x07,
    Ramp50Us = 0x08,
    Ramp40Us = 0x09,
    Ramp31Us = 0x0A,
    Ramp25Us = 0x0B,
    Ramp20Us = 0x0C,
    Ramp15Us = 0x0D,
    Ramp12Us = 0x0E,
    Ramp10Us = 0x0F,
}

/// Gaussian filter BT for FSK data shaping, bits 6:5 of RegPaRamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FskDataShaping {
    None = 0x00,
    Bt1_0 = 0x01,
    Bt0_5 = 0x02,
    Bt0_3 = 0x03,
}

/// Bit-rate filtering for OOK data shaping, bits 6:5 of RegPaRamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OokDataShaping {
    None = 0x00,
    /// Filter cutoff at the bit rate
    BitRate = 0x01,
    /// Filter cutoff at twice the bit rate
    TwiceBitRate = 0x02,
}

/// Line encoding applied to the FSK/OOK payload (DcFree bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketEncoding {
    None = 0x00,
    Manchester = 0x01,
    Scrambled = 0x02,
}

/// CRC variant for FSK/OOK packets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrcType {
    /// No CRC appended or checked
    None,
    /// CCITT polynomial with standard whitening
    Ccitt,
    /// IBM polynomial with alternate whitening
    Ibm,
}

/// Address filtering of received FSK/OOK packets, bits 2:1 of PacketConfig1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFiltering {
    None = 0x00,
    Node = 0x01,
    NodeAndBroadcast = 0x02,
}

/// FSK/OOK packet length framing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketFormat {
    /// No in-air length byte; both ends agree on the length beforehand
    Fixed,
    /// First payload byte carries the length
    Variable,
}

/// Preamble polarity for FSK/OOK
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreambleType {
    PreambleAA = 0x00,
    Preamble55 = 0x01,
}

/// RSSI smoothing: number of samples averaged, bits 2:0 of RssiConfig
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RssiSmoothing {
    Samples2 = 0x00,
    Samples4 = 0x01,
    Samples8 = 0x02,
    Samples16 = 0x03,
    Samples32 = 0x04,
    Samples64 = 0x05,
    Samples128 = 0x06,
    Samples256 = 0x07,
}

/// Event that moves the FSK/OOK receiver out of the wait state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxTrigger {
    None = 0b000,
    Rssi = 0b001,
    PreambleDetect = 0b110,
    RssiAndPreamble = 0b111,
}

/// Peak-mode OOK threshold step, bits 2:0 of RegOokPeak
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OokPeakThreshStep {
    Db0_5 = 0x00,
    Db1_0 = 0x01,
    Db1_5 = 0x02,
    Db2_0 = 0x03,
    Db3_0 = 0x04,
    Db4_0 = 0x05,
    Db5_0 = 0x06,
    Db6_0 = 0x07,
}

/// Peak-mode OOK threshold decrement period, bits 7:5 of RegOokAvg
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OokPeakThreshDec {
    OncePerChip = 0x00,
    OncePer2Chips = 0x01,
    OncePer4Chips = 0x02,
    OncePer8Chips = 0x03,
    TwicePerChip = 0x04,
    FourTimesPerChip = 0x05,
    EightTimesPerChip = 0x06,
    SixteenTimesPerChip = 0x07,
}

/// Average-mode OOK threshold offset, bits 3:2 of RegOokAvg
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OokAverageOffset {
    Db0 = 0x00,
    Db2 = 0x01,
    Db4 = 0x02,
    Db6 = 0x03,
}

/// Average-mode OOK threshold filter coefficient, bits 1:0 of RegOokAvg
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OokAverageThreshFilt {
    ChipRate32Pi = 0x00,
    ChipRate8Pi = 0x01,
    ChipRate4Pi = 0x02,
    ChipRate2Pi = 0x03,
}
