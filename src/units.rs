//! # Register Encodings for Physical Quantities
//!
//! Pure conversion functions between physical units (Hz, dBm, bps) and SX127x
//! register encodings. Everything here is deterministic and side-effect free;
//! the [`driver`](crate::driver) and the packet engines call into this module
//! for every numeric register transaction.
//!
//! Rounding behavior is part of the contract: carrier frequency rounds to the
//! nearest step, bitrate and deviation truncate, and all dBm/Hz decodes
//! truncate toward zero after full floating-point evaluation.

/// Reference crystal oscillator frequency in Hz
pub const FXOSC: u32 = 32_000_000;

/// Smallest frequency register increment: FXOSC / 2^19 (~61.035 Hz)
pub const FSTEP: f64 = FXOSC as f64 / (1u32 << 19) as f64;

/// RX/AFC bandwidths above this are not representable
pub const MAX_RX_BANDWIDTH: f64 = 250_000.0;

/// Encode a carrier frequency into the three FRF register bytes (big-endian).
///
/// `reg = round(hz / FSTEP)`, 24 bits.
pub fn frequency_to_registers(frequency_hz: u32) -> [u8; 3] {
    let frf = (frequency_hz as f64 / FSTEP).round() as u32;
    [(frf >> 16) as u8, (frf >> 8) as u8, frf as u8]
}

/// Decode the three FRF register bytes back into a frequency in Hz.
pub fn frequency_from_registers(regs: [u8; 3]) -> u32 {
    let frf = ((regs[0] as u32) << 16) | ((regs[1] as u32) << 8) | regs[2] as u32;
    (frf as f64 * FSTEP) as u32
}

/// Encode an FSK/OOK channel filter bandwidth into a RxBw/AfcBw register
/// value, mantissa in bits 4:3 and exponent in bits 2:0.
///
/// The chip realizes `FXOSC / (mantissa * 2^(exponent + 2))` with mantissa in
/// {16, 20, 24} and exponent 1..=7. The smallest realizable bandwidth that is
/// not below the request wins; requests above 250 kHz are not representable
/// and return `None`.
pub fn rx_bandwidth_to_register(bandwidth_hz: f64) -> Option<u8> {
    if !(bandwidth_hz > 0.0) || bandwidth_hz > MAX_RX_BANDWIDTH {
        return None;
    }
    // Candidates in ascending bandwidth order: exponent high to low,
    // mantissa 24 -> 20 -> 16 within each exponent.
    for exponent in (1u8..=7).rev() {
        for (mantissa, bits) in [(24u32, 0b10u8), (20, 0b01), (16, 0b00)] {
            let actual = FXOSC as f64 / (mantissa * (1u32 << (exponent + 2))) as f64;
            if actual >= bandwidth_hz {
                return Some((bits << 3) | exponent);
            }
        }
    }
    None
}

/// Decode a RxBw/AfcBw register value into the realized bandwidth in Hz.
pub fn rx_bandwidth_from_register(value: u8) -> Option<f64> {
    let mantissa = match (value >> 3) & 0b11 {
        0b00 => 16u32,
        0b01 => 20,
        0b10 => 24,
        _ => return None,
    };
    let exponent = value & 0b111;
    Some(FXOSC as f64 / (mantissa * (1u32 << (exponent + 2))) as f64)
}

/// Encode a bitrate in bps into the 16-bit integer divider (big-endian pair)
/// plus the 4-bit fractional sub-register.
///
/// `ratio = FXOSC / bitrate`; the integer register truncates, the fractional
/// register carries `trunc(fract(ratio) * 16)` for sub-bit precision.
pub fn bitrate_to_registers(bitrate_bps: f64) -> Option<([u8; 2], u8)> {
    if !(bitrate_bps > 0.0) {
        return None;
    }
    let ratio = FXOSC as f64 / bitrate_bps;
    if ratio >= 65_536.0 || ratio < 1.0 {
        return None;
    }
    let integer = ratio as u16;
    let frac = ((ratio - integer as f64) * 16.0) as u8;
    Some((integer.to_be_bytes(), frac))
}

/// Encode an FSK frequency deviation in Hz into the 16-bit register pair.
///
/// `reg = trunc(hz / FSTEP)`, 14 significant bits.
pub fn fdev_to_registers(fdev_hz: f64) -> Option<[u8; 2]> {
    if !(fdev_hz > 0.0) {
        return None;
    }
    let reg = (fdev_hz / FSTEP) as u32;
    if reg > 0x3FFF {
        return None;
    }
    Some((reg as u16).to_be_bytes())
}

/// Decode the LoRa packet SNR register: signed byte in 0.25 dB steps.
pub fn lora_snr(raw: u8) -> f32 {
    raw as i8 as f32 * 0.25
}

/// Decode the LoRa packet RSSI register into dBm.
///
/// The offset depends on the active RF port (-164 dBm below the 525 MHz band
/// split, -157 dBm above). A negative packet SNR is added before truncation;
/// with non-negative SNR the raw value is instead scaled by 16/15.
pub fn lora_rssi(raw: u8, snr_db: f32, low_frequency: bool) -> i16 {
    let offset: f32 = if low_frequency { -164.0 } else { -157.0 };
    if snr_db < 0.0 {
        (offset + raw as f32 + snr_db) as i16
    } else {
        (offset + raw as f32 * 16.0 / 15.0) as i16
    }
}

/// Decode the FSK/OOK RSSI register into dBm: `-raw / 2`.
pub fn fsk_rssi(raw: u8) -> i16 {
    -((raw as i16) / 2)
}

/// Decode the LoRa frequency error from the three FEI registers.
///
/// 20-bit two's complement (4 significant bits in the MSB register), scaled by
/// `2^24 / FXOSC` and by the ratio of the active signal bandwidth to 500 kHz.
pub fn lora_frequency_error(regs: [u8; 3], signal_bandwidth_hz: u32) -> i32 {
    let mut raw = (((regs[0] & 0x0F) as i32) << 16) | ((regs[1] as i32) << 8) | regs[2] as i32;
    if raw >= 0x8_0000 {
        raw -= 0x10_0000;
    }
    let error = raw as f64 * (1u32 << 24) as f64 / FXOSC as f64
        * (signal_bandwidth_hz as f64 / 500_000.0);
    error as i32
}

/// Decode the FSK/OOK frequency error: 16-bit two's complement times FSTEP.
pub fn fsk_frequency_error(regs: [u8; 2]) -> i32 {
    let raw = i16::from_be_bytes(regs);
    (raw as f64 * FSTEP) as i32
}
