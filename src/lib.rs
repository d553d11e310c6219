//! # sx127x-rs - A Driver Core for Semtech SX127x Radio Transceivers
//!
//! Driver for the SX1276/77/78/79 family of sub-GHz transceivers, covering
//! both the LoRa and the FSK/OOK modem. The crate translates high-level radio
//! intents (set frequency, configure packet framing, transmit a payload,
//! read a received packet, query link quality) into bit-exact register
//! transactions over a caller-supplied register port, and classifies
//! hardware interrupt events into typed application callbacks.
//!
//! ## Features
//!
//! - Operating-mode/modulation state machine with enforced sleep-before-
//!   modulation-change ordering
//! - LoRa packet engine: bandwidth/SF/CR, explicit and implicit headers,
//!   FIFO payload transfer, RSSI/SNR/frequency-error queries
//! - FSK/OOK packet engine: bitrate/deviation, sync word, framing, address
//!   filtering, CRC variants, line encoding, AFC, OOK demodulator modes
//! - Interrupt classifier dispatching `tx_done`/`rx_done`/`cad_done`
//!   callbacks from the mode-dependent flag registers
//! - Pure, datasheet-exact unit conversion layer
//!
//! Out of scope by design: the SPI transport and GPIO wiring (bring a
//! [`Hal`] implementation), any MAC layer such as LoRaWAN, configuration
//! persistence, and retry policies.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sx127x_rs::{Hal, HalError, Sx127xDriver, Modulation, OperatingMode};
//! use sx127x_rs::modulation::{Bandwidth, SpreadingFactor};
//!
//! struct SpiPort; // your SPI bus wrapper
//!
//! impl Hal for SpiPort {
//!     fn read_register(&mut self, addr: u8) -> Result<u8, HalError> {
//!         todo!("single register read over SPI")
//!     }
//!     fn write_register(&mut self, addr: u8, value: u8) -> Result<(), HalError> {
//!         todo!("single register write over SPI")
//!     }
//!     fn burst_read(&mut self, addr: u8, buf: &mut [u8]) -> Result<(), HalError> {
//!         todo!("auto-incrementing read")
//!     }
//!     fn burst_write(&mut self, addr: u8, data: &[u8]) -> Result<(), HalError> {
//!         todo!("auto-incrementing write")
//!     }
//! }
//!
//! fn main() -> Result<(), sx127x_rs::DriverError> {
//!     let mut radio = Sx127xDriver::new(SpiPort)?;
//!     radio.set_opmod(OperatingMode::Standby, Modulation::Lora)?;
//!     radio.set_frequency(868_100_000)?;
//!     radio.lora_set_bandwidth(Bandwidth::BW125)?;
//!     radio.lora_set_modem_config_2(SpreadingFactor::SF9)?;
//!     radio.tx_set_callback(|| println!("packet sent"));
//!     radio.lora_tx_set_for_transmission(b"hello")?;
//!     // ... on interrupt line assertion:
//!     radio.handle_interrupt()?;
//!     Ok(())
//! }
//! ```

pub mod driver;
pub mod fsk;
pub mod hal;
pub mod irq;
pub mod lora;
pub mod modulation;
pub mod registers;
pub mod units;

pub use crate::driver::{DriverError, Modulation, OperatingMode, Sx127xDriver};
pub use crate::hal::{Hal, HalError};
pub use crate::lora::{ImplicitHeader, TxHeader};
pub use crate::registers::CHIP_VERSION;
