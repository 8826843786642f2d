//! Two-wire bus access to the charger's register file
//!
//! [`BusPort`] is the only path to the hardware. Implementations:
//! [`SimulatedBus`], an in-memory register file for tests and bench runs, and
//! [`I2cBus`], an adapter over any `embedded-hal-async` I2C peripheral.
//!
//! Futures are not required to be `Send`: embedded-hal-async drivers do not
//! promise it, and the controller owns its bus on a single task.

use crate::error::Result;

mod i2c;
mod sim;

pub use i2c::I2cBus;
pub use sim::SimulatedBus;

#[async_trait::async_trait(?Send)]
pub trait BusPort {
    async fn read_byte(&mut self, address: u8) -> Result<u8>;

    async fn write_byte(&mut self, address: u8, value: u8) -> Result<()>;

    /// Read a 16-bit register pair, MSB at `address`
    async fn read_word(&mut self, address: u8) -> Result<u16>;

    /// Write a 16-bit register pair, MSB at `address`
    async fn write_word(&mut self, address: u8, value: u16) -> Result<()>;

    /// Read `len` consecutive registers in one transaction
    async fn read_burst(&mut self, address: u8, len: usize) -> Result<Vec<u8>>;

    /// Masked read-modify-write of one byte register
    ///
    /// Only bits under `mask` change. If the read fails, nothing is written.
    /// Returns the value written.
    async fn modify_byte(&mut self, address: u8, bits: u8, mask: u8) -> Result<u8> {
        let current = self.read_byte(address).await?;
        let next = merge_masked(current, bits, mask);
        self.write_byte(address, next).await?;
        Ok(next)
    }
}

/// Replace the bits under `mask` in `current` with those of `bits`
pub fn merge_masked(current: u8, bits: u8, mask: u8) -> u8 {
    (current & !mask) | (bits & mask)
}
