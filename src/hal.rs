//! # Hardware Abstraction Layer for the SX127x Register Port
//!
//! This module defines the HAL trait the driver core uses for every register
//! transaction. Platform crates (SPI on Linux spidev, RTOS bus drivers, bare
//! metal) implement it; the core never touches the bus directly.
//!
//! The port is assumed synchronous and non-reentrant: the caller must not
//! issue a configuration call while an interrupt handler is accessing the
//! same device.

use thiserror::Error;

/// Errors that can occur during HAL operations
#[derive(Debug, Error)]
pub enum HalError {
    #[error("SPI communication error")]
    Spi,

    #[error("GPIO operation error")]
    Gpio,

    #[error("Timeout waiting for bus transaction")]
    Timeout,
}

/// Hardware Abstraction Layer trait for SX127x register access
///
/// All addresses are single-byte SX127x register offsets. Burst accesses rely
/// on the chip's address auto-increment; a burst at [`REG_FIFO`] streams the
/// packet FIFO instead.
///
/// [`REG_FIFO`]: crate::registers::REG_FIFO
pub trait Hal {
    /// Read a single radio register
    fn read_register(&mut self, addr: u8) -> Result<u8, HalError>;

    /// Write a single radio register
    fn write_register(&mut self, addr: u8, value: u8) -> Result<(), HalError>;

    /// Burst-read consecutive registers (or the FIFO) into `buf`
    fn burst_read(&mut self, addr: u8, buf: &mut [u8]) -> Result<(), HalError>;

    /// Burst-write `data` to consecutive registers (or the FIFO)
    fn burst_write(&mut self, addr: u8, data: &[u8]) -> Result<(), HalError>;
}
