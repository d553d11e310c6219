//! # SX127x Driver Core
//!
//! High-level driver for the Semtech SX1276/77/78/79 sub-GHz transceivers,
//! covering both the LoRa and the FSK/OOK modem. The driver translates radio
//! intents (set frequency, frame a packet, transmit, query link quality) into
//! bit-exact register transactions over a [`Hal`] implementation, and
//! classifies hardware interrupts into typed application callbacks.
//!
//! ## Architecture
//!
//! The driver follows a layered architecture:
//! ```text
//! ┌─────────────────────────────────┐
//! │        Application Layer        │
//! ├─────────────────────────────────┤
//! │    Sx127xDriver (this crate)    │
//! ├─────────────────────────────────┤
//! │      HAL Abstraction Layer      │
//! ├─────────────────────────────────┤
//! │    Platform-specific HAL impl   │
//! └─────────────────────────────────┘
//! ```
//!
//! This module owns the operating-mode/modulation state machine, the shared
//! RF operations (frequency, LNA, PA), and the interrupt dispatcher. The
//! packet engines live in [`lora`](crate::lora) and [`fsk`](crate::fsk).
//!
//! ## Concurrency
//!
//! Single logical actor: every operation, `handle_interrupt` included, runs
//! synchronously on the caller's context and none suspends. The driver takes
//! no locks; serializing configuration calls against the interrupt path is
//! the caller's responsibility, as is any timeout policy on top of the
//! `tx_done`/`rx_done` events.

use crate::hal::{Hal, HalError};
use crate::irq::{FskIrqFlags1, FskIrqFlags2, LoraIrqFlags};
use crate::modulation::{LnaGain, PaPin};
use crate::registers::*;
use crate::units;
use log::{debug, trace};
use thiserror::Error;

/// Carrier frequencies below this use the low-frequency port (and its
/// -164 dBm RSSI offset); at or above it the HF port applies.
const RF_MID_BAND_THRESHOLD: u32 = 525_000_000;

/// Lowest carrier frequency the synthesizer can produce
const FREQUENCY_MIN: u32 = 137_000_000;

/// Highest carrier frequency the synthesizer can produce
const FREQUENCY_MAX: u32 = 1_020_000_000;

/// Chip operating mode, bits 2:0 of RegOpMode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingMode {
    /// Lowest power; the only mode in which the modulation may change
    Sleep = 0b000,
    /// Oscillator running, modem idle
    Standby = 0b001,
    /// Frequency synthesis for TX (transitional)
    FsTx = 0b010,
    /// Transmitting; falls back to standby when the packet is out
    Tx = 0b011,
    /// Frequency synthesis for RX (transitional)
    FsRx = 0b100,
    /// Receiving until told otherwise
    RxContinuous = 0b101,
    /// Receiving a single packet, then standby (LoRa only)
    RxSingle = 0b110,
    /// Channel activity detection (LoRa only)
    Cad = 0b111,
}

/// Modulation select, bits 7:5 of RegOpMode
///
/// The modulation bit shares a register with the mode bits and may only be
/// flipped while the chip sleeps; [`Sx127xDriver::set_opmod`] enforces the
/// ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modulation {
    Lora = 0b1000_0000,
    Fsk = 0b0000_0000,
    Ook = 0b0010_0000,
}

/// Errors that can occur during radio driver operations
#[derive(Error, Debug)]
pub enum DriverError {
    /// Hardware abstraction layer error (SPI, GPIO), passed through unmodified
    #[error("HAL error: {0}")]
    Hal(HalError),
    /// Caller-supplied value out of range or incompatible with the current
    /// mode/modulation
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// Chip identification mismatch at creation
    #[error("invalid chip version: expected {expected:#04x}, got {actual:#04x}")]
    InvalidVersion { expected: u8, actual: u8 },
    /// Query has no valid data under the current mode
    #[error("no data available in current mode")]
    NotFound,
}

impl From<HalError> for DriverError {
    fn from(err: HalError) -> Self {
        DriverError::Hal(err)
    }
}

type DoneCallback = Box<dyn FnMut()>;
type CadCallback = Box<dyn FnMut(bool)>;

/// Main driver structure for SX127x radio transceivers
///
/// Owns the HAL handle and the small amount of state that cannot be read back
/// from the chip: the cached mode pair (several register addresses change
/// meaning with it), the RF-port flag, the implicit-header payload length,
/// the RSSI value latched for FSK/OOK, and one registered callback per event
/// class. The authoritative configuration always lives in hardware registers;
/// nothing else is cached across calls.
pub struct Sx127xDriver<H: Hal> {
    pub(crate) hal: H,
    pub(crate) operating_mode: OperatingMode,
    pub(crate) modulation: Modulation,
    /// Carrier below the band split; selects RSSI/PA formulas
    pub(crate) low_frequency: bool,
    /// Fixed payload length while LoRa implicit header mode is active
    pub(crate) implicit_header_length: Option<u8>,
    /// RSSI latched by the dispatcher since last entering an FSK/OOK RX mode
    pub(crate) fsk_rssi: Option<i16>,
    /// Device-owned RX payload storage, valid until the next read
    pub(crate) rx_buffer: Vec<u8>,
    tx_callback: Option<DoneCallback>,
    rx_callback: Option<DoneCallback>,
    cad_callback: Option<CadCallback>,
}

impl<H: Hal> Sx127xDriver<H> {
    /// Create a driver over a register port.
    ///
    /// Probes the version register and fails with
    /// [`DriverError::InvalidVersion`] unless the expected silicon revision
    /// answers; a transport rejection during the probe surfaces as
    /// [`DriverError::Hal`]. The chip is assumed to be in its power-on state
    /// (FSK sleep); no registers are written.
    pub fn new(hal: H) -> Result<Self, DriverError> {
        let mut driver = Self {
            hal,
            operating_mode: OperatingMode::Sleep,
            modulation: Modulation::Fsk,
            low_frequency: true,
            implicit_header_length: None,
            fsk_rssi: None,
            rx_buffer: Vec::new(),
            tx_callback: None,
            rx_callback: None,
            cad_callback: None,
        };
        let version = driver.hal.read_register(REG_VERSION)?;
        if version != CHIP_VERSION {
            return Err(DriverError::InvalidVersion {
                expected: CHIP_VERSION,
                actual: version,
            });
        }
        debug!("sx127x v{version:#04x} detected");
        Ok(driver)
    }

    /// Release the driver and hand the HAL back to the caller.
    pub fn release(self) -> H {
        self.hal
    }

    /// Set the operating mode and modulation together.
    ///
    /// The modulation bits share RegOpMode with the mode bits but only latch
    /// while the chip sleeps, so a modulation change is written as a sleep
    /// transition first. `RxSingle` and `Cad` exist only in the LoRa mode
    /// table and are rejected for FSK/OOK.
    ///
    /// Entering an FSK/OOK receive mode additionally routes DIO4 to the
    /// preamble detector (the dispatcher latches RSSI off that event) and
    /// invalidates any previously latched measurement; entering a LoRa
    /// TX/RX/CAD mode routes DIO0 to the matching done event.
    pub fn set_opmod(
        &mut self,
        mode: OperatingMode,
        modulation: Modulation,
    ) -> Result<(), DriverError> {
        if modulation != Modulation::Lora
            && matches!(mode, OperatingMode::RxSingle | OperatingMode::Cad)
        {
            return Err(DriverError::InvalidArgument(
                "requested operating mode exists only in LoRa",
            ));
        }
        if modulation != self.modulation {
            self.hal
                .write_register(REG_OP_MODE, modulation as u8 | OperatingMode::Sleep as u8)?;
        }
        self.hal.write_register(REG_OP_MODE, modulation as u8 | mode as u8)?;

        match modulation {
            Modulation::Lora => {
                let mapping = match mode {
                    OperatingMode::Tx => Some(DIO0_TX_DONE),
                    OperatingMode::RxContinuous | OperatingMode::RxSingle => Some(DIO0_RX_DONE),
                    OperatingMode::Cad => Some(DIO0_CAD_DONE),
                    _ => None,
                };
                if let Some(mapping) = mapping {
                    self.hal.write_register(REG_DIO_MAPPING_1, mapping)?;
                }
            }
            Modulation::Fsk | Modulation::Ook => {
                if matches!(mode, OperatingMode::FsRx | OperatingMode::RxContinuous) {
                    self.hal.write_register(REG_DIO_MAPPING_2, DIO4_PREAMBLE_DETECT)?;
                    self.fsk_rssi = None;
                }
            }
        }

        self.operating_mode = mode;
        self.modulation = modulation;
        debug!("opmod set to {mode:?}/{modulation:?}");
        Ok(())
    }

    /// Currently cached (operating mode, modulation) pair.
    pub fn mode(&self) -> (OperatingMode, Modulation) {
        (self.operating_mode, self.modulation)
    }

    /// Set the RF carrier frequency in Hz, shared by both modems.
    ///
    /// Also records which RF port the frequency lands on; the packet RSSI
    /// decode depends on it.
    pub fn set_frequency(&mut self, frequency_hz: u32) -> Result<(), DriverError> {
        if !(FREQUENCY_MIN..=FREQUENCY_MAX).contains(&frequency_hz) {
            return Err(DriverError::InvalidArgument(
                "carrier frequency outside 137..1020 MHz",
            ));
        }
        let frf = units::frequency_to_registers(frequency_hz);
        self.hal.write_register(REG_FRF_MSB, frf[0])?;
        self.hal.write_register(REG_FRF_MID, frf[1])?;
        self.hal.write_register(REG_FRF_LSB, frf[2])?;
        self.low_frequency = frequency_hz < RF_MID_BAND_THRESHOLD;
        debug!("frequency set to {frequency_hz} Hz");
        Ok(())
    }

    /// Select the LNA gain (G1 strongest, G6 weakest).
    pub fn rx_set_lna_gain(&mut self, gain: LnaGain) -> Result<(), DriverError> {
        self.update_register(REG_LNA, 0b1110_0000, (gain as u8) << 5)
    }

    /// Enable or disable the 150% LNA boost current on the HF port.
    pub fn rx_set_lna_boost_hf(&mut self, enable: bool) -> Result<(), DriverError> {
        let value = if enable { LNA_BOOST_HF_ON } else { 0 };
        self.update_register(REG_LNA, 0b0000_0011, value)
    }

    /// Configure the power amplifier: output pin plus power level in dBm.
    ///
    /// The RFO pin covers -4..=15 dBm; PA_BOOST covers 2..=17 dBm plus the
    /// +20 dBm high-power option. High power raises the over-current limit to
    /// 120 mA, every other combination runs at 87 mA.
    pub fn tx_set_pa_config(&mut self, pin: PaPin, power_dbm: i8) -> Result<(), DriverError> {
        match pin {
            PaPin::Rfo if !(-4..=15).contains(&power_dbm) => {
                return Err(DriverError::InvalidArgument("RFO power outside -4..=15 dBm"));
            }
            PaPin::Boost if power_dbm != 20 && !(2..=17).contains(&power_dbm) => {
                return Err(DriverError::InvalidArgument(
                    "PA_BOOST power outside 2..=17 or 20 dBm",
                ));
            }
            _ => {}
        }

        let high_power = pin == PaPin::Boost && power_dbm == 20;
        let dac = if high_power { PA_DAC_HIGH_POWER_ON } else { PA_DAC_HIGH_POWER_OFF };
        self.hal.write_register(REG_PA_DAC, dac)?;

        let max_current_ma: u8 = if high_power { 120 } else { 87 };
        self.hal.write_register(REG_OCP, OCP_ON | ((max_current_ma - 45) / 5))?;

        let config = match pin {
            PaPin::Boost => {
                let output = if high_power { 15 } else { (power_dbm - 2) as u8 };
                PA_SELECT_BOOST | output
            }
            PaPin::Rfo if power_dbm < 0 => (power_dbm + 4) as u8,
            PaPin::Rfo => PA_MAX_POWER | power_dbm as u8,
        };
        self.hal.write_register(REG_PA_CONFIG, config)?;
        debug!("pa config: {pin:?} at {power_dbm} dBm");
        Ok(())
    }

    /// RSSI of the last received packet in dBm.
    ///
    /// Under LoRa this combines the packet RSSI and SNR registers with the
    /// RF-port offset. Under FSK/OOK it returns the value the dispatcher
    /// latched at preamble detection; [`DriverError::NotFound`] when the
    /// device is not in a receive mode or no measurement was latched since
    /// the receiver was armed.
    pub fn rx_get_packet_rssi(&mut self) -> Result<i16, DriverError> {
        match self.modulation {
            Modulation::Lora => {
                let snr = units::lora_snr(self.hal.read_register(LORA_REG_PKT_SNR_VALUE)?);
                let raw = self.hal.read_register(LORA_REG_PKT_RSSI_VALUE)?;
                Ok(units::lora_rssi(raw, snr, self.low_frequency))
            }
            Modulation::Fsk | Modulation::Ook => match self.operating_mode {
                OperatingMode::FsRx | OperatingMode::RxContinuous => {
                    self.fsk_rssi.ok_or(DriverError::NotFound)
                }
                _ => Err(DriverError::NotFound),
            },
        }
    }

    /// Frequency error of the local oscillator against the last received
    /// carrier, in Hz.
    pub fn rx_get_frequency_error(&mut self) -> Result<i32, DriverError> {
        match self.modulation {
            Modulation::Lora => {
                let regs = [
                    self.hal.read_register(LORA_REG_FEI_MSB)?,
                    self.hal.read_register(LORA_REG_FEI_MID)?,
                    self.hal.read_register(LORA_REG_FEI_LSB)?,
                ];
                let bandwidth_hz = self.lora_get_bandwidth()?;
                Ok(units::lora_frequency_error(regs, bandwidth_hz))
            }
            Modulation::Fsk | Modulation::Ook => {
                let regs = [
                    self.hal.read_register(FSK_REG_FEI_MSB)?,
                    self.hal.read_register(FSK_REG_FEI_LSB)?,
                ];
                Ok(units::fsk_frequency_error(regs))
            }
        }
    }

    /// Register the callback invoked when a transmission completes.
    /// Replaces any previously registered one.
    pub fn tx_set_callback(&mut self, callback: impl FnMut() + 'static) {
        self.tx_callback = Some(Box::new(callback));
    }

    /// Register the callback invoked when a packet arrives.
    /// Replaces any previously registered one.
    pub fn rx_set_callback(&mut self, callback: impl FnMut() + 'static) {
        self.rx_callback = Some(Box::new(callback));
    }

    /// Register the callback invoked when channel activity detection
    /// finishes; the argument tells whether activity was detected.
    /// Replaces any previously registered one.
    pub fn cad_set_callback(&mut self, callback: impl FnMut(bool) + 'static) {
        self.cad_callback = Some(Box::new(callback));
    }

    /// Classify and dispatch one hardware interrupt assertion.
    ///
    /// Reads the flag registers of the active modem, invokes the matching
    /// registered callbacks synchronously (a no-op without one), and
    /// acknowledges exactly the flags acted on; simultaneously set unrelated
    /// flags are left untouched. Bounded register transactions only, no
    /// polling: call it once per interrupt line assertion, from an ISR or a
    /// deferred worker. Callbacks must not re-enter the dispatcher for the
    /// same device.
    pub fn handle_interrupt(&mut self) -> Result<(), DriverError> {
        match self.modulation {
            Modulation::Lora => self.handle_lora_interrupt(),
            Modulation::Fsk | Modulation::Ook => self.handle_fsk_interrupt(),
        }
    }

    fn handle_lora_interrupt(&mut self) -> Result<(), DriverError> {
        let flags = LoraIrqFlags::from_bits_retain(self.hal.read_register(LORA_REG_IRQ_FLAGS)?);
        trace!("lora irq flags: {flags:?}");
        let mut handled = LoraIrqFlags::empty();

        if flags.contains(LoraIrqFlags::TX_DONE) {
            handled |= LoraIrqFlags::TX_DONE;
            if let Some(callback) = self.tx_callback.as_mut() {
                callback();
            }
        }
        if flags.contains(LoraIrqFlags::RX_DONE) {
            handled |= LoraIrqFlags::RX_DONE;
            if let Some(callback) = self.rx_callback.as_mut() {
                callback();
            }
        }
        if flags.contains(LoraIrqFlags::CAD_DONE) {
            handled |= LoraIrqFlags::CAD_DONE;
            let detected = flags.contains(LoraIrqFlags::CAD_DETECTED);
            if detected {
                handled |= LoraIrqFlags::CAD_DETECTED;
            }
            if let Some(callback) = self.cad_callback.as_mut() {
                callback(detected);
            }
        }

        // Write 1 to clear, only for the flags acted on.
        if !handled.is_empty() {
            self.hal.write_register(LORA_REG_IRQ_FLAGS, handled.bits())?;
        }
        Ok(())
    }

    fn handle_fsk_interrupt(&mut self) -> Result<(), DriverError> {
        let flags1 = FskIrqFlags1::from_bits_retain(self.hal.read_register(FSK_REG_IRQ_FLAGS_1)?);
        let flags2 = FskIrqFlags2::from_bits_retain(self.hal.read_register(FSK_REG_IRQ_FLAGS_2)?);
        trace!("fsk irq flags: {flags1:?} {flags2:?}");

        if flags1.contains(FskIrqFlags1::PREAMBLE_DETECT) {
            let raw = self.hal.read_register(FSK_REG_RSSI_VALUE)?;
            self.fsk_rssi = Some(units::fsk_rssi(raw));
            self.hal
                .write_register(FSK_REG_IRQ_FLAGS_1, FskIrqFlags1::PREAMBLE_DETECT.bits())?;
        }
        // PacketSent and PayloadReady clear themselves on FIFO access or mode
        // change; no acknowledge write for register 0x3F.
        if flags2.contains(FskIrqFlags2::PACKET_SENT) {
            if let Some(callback) = self.tx_callback.as_mut() {
                callback();
            }
        }
        if flags2.contains(FskIrqFlags2::PAYLOAD_READY) {
            if let Some(callback) = self.rx_callback.as_mut() {
                callback();
            }
        }
        Ok(())
    }

    /// Reject an operation on the LoRa register bank while the modem runs
    /// FSK/OOK; those addresses mean something else there.
    pub(crate) fn require_lora(&self) -> Result<(), DriverError> {
        if self.modulation != Modulation::Lora {
            return Err(DriverError::InvalidArgument("operation requires LoRa"));
        }
        Ok(())
    }

    /// Reject an operation on the FSK/OOK register bank while the modem runs
    /// LoRa.
    pub(crate) fn require_fsk_ook(&self) -> Result<(), DriverError> {
        if self.modulation == Modulation::Lora {
            return Err(DriverError::InvalidArgument("operation requires FSK/OOK"));
        }
        Ok(())
    }

    /// Read-modify-write `mask` bits of a shared register, leaving the rest
    /// untouched.
    pub(crate) fn update_register(
        &mut self,
        addr: u8,
        mask: u8,
        value: u8,
    ) -> Result<(), DriverError> {
        let current = self.hal.read_register(addr)?;
        let updated = (current & !mask) | (value & mask);
        self.hal.write_register(addr, updated)?;
        trace!("reg {addr:#04x}: {current:#010b} -> {updated:#010b}");
        Ok(())
    }
}
