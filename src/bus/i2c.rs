use super::BusPort;
use crate::config::BusConfig;
use crate::error::{ChargerError, Result};
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use embedded_hal_async::i2c::I2c;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

/// Bus port over an embedded-hal-async I2C peripheral
pub struct I2cBus<I2C> {
    i2c: I2C,
    address: u8,
    operation_timeout: Duration,
    logger: StructuredLogger,
}

impl<I2C: I2c> I2cBus<I2C> {
    pub fn new(i2c: I2C, address: u8, operation_timeout: Duration) -> Self {
        let logger = get_logger_with_context(LogContext::new("bus").with_device_address(address));
        Self {
            i2c,
            address,
            operation_timeout,
            logger,
        }
    }

    /// Adapter addressed and bounded by the bus section of the configuration
    pub fn from_config(i2c: I2C, config: &BusConfig) -> Self {
        Self::new(
            i2c,
            config.i2c_address,
            Duration::from_millis(config.operation_timeout_ms),
        )
    }

    /// Consume and return the underlying peripheral
    pub fn release(self) -> I2C {
        self.i2c
    }
}

#[async_trait::async_trait(?Send)]
impl<I2C: I2c> BusPort for I2cBus<I2C> {
    async fn read_byte(&mut self, address: u8) -> Result<u8> {
        let mut buf = [0u8; 1];
        let reg = [address];
        let op = self.i2c.write_read(self.address, &reg, &mut buf);
        with_deadline(self.operation_timeout, &self.logger, "read", address, op).await?;
        Ok(buf[0])
    }

    async fn write_byte(&mut self, address: u8, value: u8) -> Result<()> {
        let frame = [address, value];
        let op = self.i2c.write(self.address, &frame);
        with_deadline(self.operation_timeout, &self.logger, "write", address, op).await
    }

    async fn read_word(&mut self, address: u8) -> Result<u16> {
        let mut buf = [0u8; 2];
        let reg = [address];
        let op = self.i2c.write_read(self.address, &reg, &mut buf);
        with_deadline(self.operation_timeout, &self.logger, "read word", address, op).await?;
        Ok(u16::from_be_bytes(buf))
    }

    async fn write_word(&mut self, address: u8, value: u16) -> Result<()> {
        let [msb, lsb] = value.to_be_bytes();
        let frame = [address, msb, lsb];
        let op = self.i2c.write(self.address, &frame);
        with_deadline(self.operation_timeout, &self.logger, "write word", address, op).await
    }

    async fn read_burst(&mut self, address: u8, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        let reg = [address];
        let op = self.i2c.write_read(self.address, &reg, &mut buf);
        with_deadline(self.operation_timeout, &self.logger, "burst read", address, op).await?;
        Ok(buf)
    }
}

/// Bound one bus transaction and map its failure into a bus error
async fn with_deadline<T, E, F>(
    limit: Duration,
    logger: &StructuredLogger,
    what: &str,
    register: u8,
    op: F,
) -> Result<T>
where
    E: std::fmt::Debug,
    F: Future<Output = std::result::Result<T, E>>,
{
    match timeout(limit, op).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            let msg = format!("{} 0x{:02X} failed: {:?}", what, register, e);
            logger.debug(&msg);
            Err(ChargerError::bus(msg))
        }
        Err(_) => {
            let msg = format!(
                "{} 0x{:02X} timed out after {} ms",
                what,
                register,
                limit.as_millis()
            );
            logger.warn(&msg);
            Err(ChargerError::bus(msg))
        }
    }
}
