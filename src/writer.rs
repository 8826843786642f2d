//! Validated field writes
//!
//! Turns `(field name, physical value)` into a register transaction:
//! lookup, range check, encode, then a masked read-modify-write for byte
//! fields or a full word write for word fields. Successful writes of
//! persistent fields are remembered in the settings store.

use crate::bus::BusPort;
use crate::error::{ChargerError, Result};
use crate::logging::{StructuredLogger, get_logger};
use crate::registers::{self, FieldKind, RegisterWidth};
use crate::settings::SettingsStore;

pub struct ValidatedWriter {
    bus: Box<dyn BusPort>,
    store: Box<dyn SettingsStore>,
    logger: StructuredLogger,
}

impl ValidatedWriter {
    pub fn new(bus: Box<dyn BusPort>, store: Box<dyn SettingsStore>) -> Self {
        Self {
            bus,
            store,
            logger: get_logger("writer"),
        }
    }

    /// Write a physical value to a named field
    ///
    /// Errors are not retried. A settings-store failure after a successful
    /// register write is logged, not returned.
    pub async fn write(&mut self, name: &str, value: i64) -> Result<()> {
        let Some(descriptor) = registers::lookup(name) else {
            self.logger.warn(&format!("Rejected write to unknown field {}", name));
            return Err(ChargerError::unknown_field(name));
        };

        if !descriptor.in_range(value) {
            self.logger.warn(&format!(
                "Rejected {}={} outside {}..={}",
                name, value, descriptor.min, descriptor.max
            ));
            return Err(ChargerError::out_of_range(
                name,
                descriptor.min,
                descriptor.max,
                value,
            ));
        }

        let encoded = registers::encode_with(descriptor, value);
        let result = match descriptor.width {
            RegisterWidth::Byte => self
                .bus
                .modify_byte(encoded.address, encoded.raw_bits as u8, encoded.mask as u8)
                .await
                .map(|_| ()),
            RegisterWidth::Word => self.bus.write_word(encoded.address, encoded.raw_bits).await,
        };
        if let Err(e) = result {
            self.logger.error(&format!("Write {}={} failed: {}", name, value, e));
            return Err(e);
        }

        self.logger.info(&format!(
            "Wrote {}={} (reg 0x{:02X}, bits 0x{:04X}, mask 0x{:04X})",
            name, value, encoded.address, encoded.raw_bits, encoded.mask
        ));

        match descriptor.kind {
            FieldKind::Persistent => {
                if let Err(e) = self.store.set(name, value) {
                    self.logger.warn(&format!("Failed to persist {}={}: {}", name, value, e));
                }
            }
            FieldKind::FactoryReset => {
                if let Err(e) = self.store.clear_all() {
                    self.logger.warn(&format!("Failed to clear persisted settings: {}", e));
                } else {
                    self.logger.info("Factory reset issued, persisted settings cleared");
                }
            }
            FieldKind::Transient => {}
        }
        Ok(())
    }

    /// Read a field back in physical units; status fields are readable too
    pub async fn read(&mut self, name: &str) -> Result<i64> {
        let descriptor =
            registers::lookup_any(name).ok_or_else(|| ChargerError::unknown_field(name))?;
        let register_value = match descriptor.width {
            RegisterWidth::Byte => u16::from(self.bus.read_byte(descriptor.address).await?),
            RegisterWidth::Word => self.bus.read_word(descriptor.address).await?,
        };
        let value = registers::decode_with(descriptor, register_value);
        self.logger.trace(&format!(
            "Read {}={} (reg 0x{:02X} = 0x{:04X})",
            name, value, descriptor.address, register_value
        ));
        Ok(value)
    }

    pub fn bus_mut(&mut self) -> &mut dyn BusPort {
        self.bus.as_mut()
    }

    pub fn store(&self) -> &dyn SettingsStore {
        self.store.as_ref()
    }
}
