//! # FSK/OOK Packet Engine
//!
//! Configuration surface for the FSK/OOK modem: bitrate and deviation, sync
//! word, packet framing, address filtering, CRC variant, line encoding, AFC,
//! RSSI sampling, and the OOK demodulator threshold modes. Each operation is
//! an independent register write; where several options share one register
//! the engine read-modify-writes only its own bits, so configuration order
//! never matters. The addresses belong to the FSK/OOK register bank, so every
//! operation rejects with `InvalidArgument` while the modem runs LoRa.

use crate::driver::{DriverError, Modulation, Sx127xDriver};
use crate::hal::Hal;
use crate::modulation::{
    AddressFiltering, CrcType, FskDataShaping, OokAverageOffset, OokAverageThreshFilt,
    OokDataShaping, OokPeakThreshDec, OokPeakThreshStep, PaRamp, PacketEncoding, PacketFormat,
    PreambleType, RssiSmoothing, RxTrigger,
};
use crate::registers::*;
use crate::units;
use log::debug;

/// Longest payload in fixed-length framing (11-bit length field)
const FIXED_LENGTH_MAX: u16 = 2047;

impl<H: Hal> Sx127xDriver<H> {
    /// Set the bitrate in bps.
    ///
    /// FSK additionally gets the fractional divider for sub-bit precision;
    /// the OOK modem has no fractional stage.
    pub fn fsk_ook_set_bitrate(&mut self, bitrate_bps: f64) -> Result<(), DriverError> {
        self.require_fsk_ook()?;
        let (regs, frac) = units::bitrate_to_registers(bitrate_bps)
            .ok_or(DriverError::InvalidArgument("bitrate out of divider range"))?;
        self.hal.write_register(FSK_REG_BITRATE_MSB, regs[0])?;
        self.hal.write_register(FSK_REG_BITRATE_LSB, regs[1])?;
        if self.modulation != Modulation::Ook {
            self.hal.write_register(FSK_REG_BITRATE_FRAC, frac)?;
        }
        debug!("bitrate set to {bitrate_bps} bps");
        Ok(())
    }

    /// Set the FSK frequency deviation in Hz. Meaningless under OOK.
    pub fn fsk_set_fdev(&mut self, fdev_hz: f64) -> Result<(), DriverError> {
        self.require_fsk_ook()?;
        if self.modulation == Modulation::Ook {
            return Err(DriverError::InvalidArgument("deviation requires FSK"));
        }
        let regs = units::fdev_to_registers(fdev_hz)
            .ok_or(DriverError::InvalidArgument("deviation out of range"))?;
        self.hal.write_register(FSK_REG_FDEV_MSB, regs[0])?;
        self.hal.write_register(FSK_REG_FDEV_LSB, regs[1])?;
        Ok(())
    }

    /// Set the sync word, 1 to 8 bytes, and enable sync word matching.
    ///
    /// The chip cannot represent a 0x00 byte inside the sync word.
    pub fn fsk_ook_set_syncword(&mut self, syncword: &[u8]) -> Result<(), DriverError> {
        self.require_fsk_ook()?;
        if syncword.is_empty() || syncword.len() > 8 {
            return Err(DriverError::InvalidArgument("sync word must be 1..=8 bytes"));
        }
        if syncword.contains(&0x00) {
            return Err(DriverError::InvalidArgument("sync word bytes must be non-zero"));
        }
        self.hal.burst_write(FSK_REG_SYNC_VALUE_1, syncword)?;
        self.update_register(
            FSK_REG_SYNC_CONFIG,
            0b0001_0111,
            SYNC_ON | (syncword.len() as u8 - 1),
        )
    }

    /// Select the line encoding applied to the payload (DC-free mechanism).
    pub fn fsk_ook_set_packet_encoding(&mut self, encoding: PacketEncoding) -> Result<(), DriverError> {
        self.require_fsk_ook()?;
        self.update_register(FSK_REG_PACKET_CONFIG_1, 0b0110_0000, (encoding as u8) << 5)
    }

    /// Select the CRC variant appended to and checked on packets.
    pub fn fsk_ook_set_crc(&mut self, crc: CrcType) -> Result<(), DriverError> {
        self.require_fsk_ook()?;
        let value = match crc {
            CrcType::None => 0b0000_0000,
            CrcType::Ccitt => 0b0001_0000,
            CrcType::Ibm => 0b0001_0001,
        };
        self.update_register(FSK_REG_PACKET_CONFIG_1, 0b0001_0001, value)
    }

    /// Configure receive address filtering and the two address values.
    pub fn fsk_ook_set_address_filtering(
        &mut self,
        filtering: AddressFiltering,
        node_address: u8,
        broadcast_address: u8,
    ) -> Result<(), DriverError> {
        self.require_fsk_ook()?;
        self.update_register(FSK_REG_PACKET_CONFIG_1, 0b0000_0110, (filtering as u8) << 1)?;
        self.hal.write_register(FSK_REG_NODE_ADRS, node_address)?;
        self.hal.write_register(FSK_REG_BROADCAST_ADRS, broadcast_address)?;
        Ok(())
    }

    /// Select fixed or variable length framing and the (maximum) payload
    /// length.
    ///
    /// Fixed framing takes lengths up to 2047 (high bits live in
    /// PacketConfig2); variable framing is limited to 255 by the in-air
    /// length byte.
    pub fn fsk_ook_set_packet_format(
        &mut self,
        format: PacketFormat,
        length: u16,
    ) -> Result<(), DriverError> {
        self.require_fsk_ook()?;
        match format {
            PacketFormat::Fixed if length == 0 || length > FIXED_LENGTH_MAX => {
                return Err(DriverError::InvalidArgument("fixed length outside 1..=2047"));
            }
            PacketFormat::Variable if length == 0 || length > MAX_PACKET_LENGTH as u16 => {
                return Err(DriverError::InvalidArgument("variable max length outside 1..=255"));
            }
            _ => {}
        }
        let format_bit = match format {
            PacketFormat::Fixed => 0b0000_0000,
            PacketFormat::Variable => 0b1000_0000,
        };
        self.update_register(FSK_REG_PACKET_CONFIG_1, 0b1000_0000, format_bit)?;
        self.update_register(FSK_REG_PACKET_CONFIG_2, 0b0000_0111, (length >> 8) as u8)?;
        self.hal.write_register(FSK_REG_PAYLOAD_LENGTH, length as u8)?;
        debug!("packet format {format:?}, length {length}");
        Ok(())
    }

    /// Set the Gaussian filter BT and PA ramp time for FSK.
    pub fn fsk_set_data_shaping(
        &mut self,
        shaping: FskDataShaping,
        ramp: PaRamp,
    ) -> Result<(), DriverError> {
        self.require_fsk_ook()?;
        self.update_register(
            REG_PA_RAMP,
            0b0110_1111,
            ((shaping as u8) << 5) | ramp as u8,
        )
    }

    /// Set the bit-rate filter and PA ramp time for OOK.
    pub fn ook_set_data_shaping(
        &mut self,
        shaping: OokDataShaping,
        ramp: PaRamp,
    ) -> Result<(), DriverError> {
        self.require_fsk_ook()?;
        self.update_register(
            REG_PA_RAMP,
            0b0110_1111,
            ((shaping as u8) << 5) | ramp as u8,
        )
    }

    /// Select the preamble polarity (0xAA or 0x55 patterns).
    pub fn fsk_ook_set_preamble_type(&mut self, preamble: PreambleType) -> Result<(), DriverError> {
        self.require_fsk_ook()?;
        self.update_register(FSK_REG_SYNC_CONFIG, 0b0010_0000, (preamble as u8) << 5)
    }

    /// Configure the preamble detector: detected-byte count (1..=3) and
    /// tolerated chip errors.
    pub fn fsk_ook_rx_set_preamble_detector(
        &mut self,
        enable: bool,
        detection_size: u8,
        tolerance: u8,
    ) -> Result<(), DriverError> {
        self.require_fsk_ook()?;
        if !(1..=3).contains(&detection_size) {
            return Err(DriverError::InvalidArgument("preamble detector size outside 1..=3"));
        }
        if tolerance > 0x1F {
            return Err(DriverError::InvalidArgument("preamble tolerance exceeds 5 bits"));
        }
        let value = ((enable as u8) << 7) | ((detection_size - 1) << 5) | tolerance;
        self.hal.write_register(FSK_REG_PREAMBLE_DETECT, value)?;
        Ok(())
    }

    /// Enable automatic frequency correction on receiver startup.
    pub fn fsk_ook_rx_set_afc_auto(&mut self, enable: bool) -> Result<(), DriverError> {
        self.require_fsk_ook()?;
        self.update_register(FSK_REG_RX_CONFIG, 0b0001_0000, (enable as u8) << 4)
    }

    /// Set the channel filter bandwidth used during AFC.
    pub fn fsk_ook_rx_set_afc_bandwidth(&mut self, bandwidth_hz: f64) -> Result<(), DriverError> {
        self.require_fsk_ook()?;
        let value = units::rx_bandwidth_to_register(bandwidth_hz)
            .ok_or(DriverError::InvalidArgument("AFC bandwidth not representable"))?;
        self.hal.write_register(FSK_REG_AFC_BW, value)?;
        Ok(())
    }

    /// Set the receiver channel filter bandwidth.
    pub fn fsk_ook_rx_set_bandwidth(&mut self, bandwidth_hz: f64) -> Result<(), DriverError> {
        self.require_fsk_ook()?;
        let value = units::rx_bandwidth_to_register(bandwidth_hz)
            .ok_or(DriverError::InvalidArgument("RX bandwidth not representable"))?;
        self.hal.write_register(FSK_REG_RX_BW, value)?;
        Ok(())
    }

    /// Configure RSSI sampling: smoothing depth and offset in dB (-16..=15),
    /// added to the measurement.
    pub fn fsk_ook_rx_set_rssi_config(
        &mut self,
        smoothing: RssiSmoothing,
        offset_db: i8,
    ) -> Result<(), DriverError> {
        self.require_fsk_ook()?;
        if !(-16..=15).contains(&offset_db) {
            return Err(DriverError::InvalidArgument("RSSI offset outside -16..=15 dB"));
        }
        let value = ((offset_db as u8) & 0x1F) << 3 | smoothing as u8;
        self.hal.write_register(FSK_REG_RSSI_CONFIG, value)?;
        Ok(())
    }

    /// Restart reception when another packet slams into the current one; the
    /// threshold is the inter-packet RSSI jump in dB that counts as a
    /// collision.
    pub fn fsk_ook_rx_set_collision_restart(
        &mut self,
        enable: bool,
        threshold_db: u8,
    ) -> Result<(), DriverError> {
        self.require_fsk_ook()?;
        self.update_register(FSK_REG_RX_CONFIG, 0b1000_0000, (enable as u8) << 7)?;
        self.hal.write_register(FSK_REG_RSSI_COLLISION, threshold_db)?;
        Ok(())
    }

    /// Select the event that triggers reception.
    pub fn fsk_ook_rx_set_trigger(&mut self, trigger: RxTrigger) -> Result<(), DriverError> {
        self.require_fsk_ook()?;
        self.update_register(FSK_REG_RX_CONFIG, 0b0000_0111, trigger as u8)
    }

    /// OOK demodulation with a peak-tracking threshold.
    ///
    /// The threshold follows the signal peak, dropping by `step` at the
    /// `decrement` rate; `floor_threshold` bounds it from below.
    pub fn ook_rx_set_peak_mode(
        &mut self,
        step: OokPeakThreshStep,
        floor_threshold: u8,
        decrement: OokPeakThreshDec,
    ) -> Result<(), DriverError> {
        self.require_fsk_ook()?;
        self.update_register(FSK_REG_OOK_PEAK, 0b0001_1111, 0b0000_1000 | step as u8)?;
        self.hal.write_register(FSK_REG_OOK_FIX, floor_threshold)?;
        self.update_register(FSK_REG_OOK_AVG, 0b1110_0000, (decrement as u8) << 5)
    }

    /// OOK demodulation against a fixed threshold.
    pub fn ook_rx_set_fixed_mode(&mut self, threshold: u8) -> Result<(), DriverError> {
        self.require_fsk_ook()?;
        self.update_register(FSK_REG_OOK_PEAK, 0b0001_1000, 0b0000_0000)?;
        self.hal.write_register(FSK_REG_OOK_FIX, threshold)?;
        Ok(())
    }

    /// OOK demodulation against the running signal average.
    pub fn ook_rx_set_avg_mode(
        &mut self,
        offset: OokAverageOffset,
        filter: OokAverageThreshFilt,
    ) -> Result<(), DriverError> {
        self.require_fsk_ook()?;
        self.update_register(FSK_REG_OOK_PEAK, 0b0001_1000, 0b0001_0000)?;
        self.update_register(
            FSK_REG_OOK_AVG,
            0b0000_1111,
            ((offset as u8) << 2) | filter as u8,
        )
    }
}
