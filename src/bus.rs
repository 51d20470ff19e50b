//! rppal-backed I2C implementation of the bus capability.

use rppal::i2c::I2c;

use crate::types::{CurrentSenseBus, MonitorConfig, MonitorError};

/// Word-level I2C access to a single sense chip.
///
/// SMBus word transfers are little-endian on the wire, so register words
/// come back byte-swapped relative to the chip's big-endian layout; the
/// drivers correct byte order via [`crate::decode::swap_bytes`].
pub struct I2cSenseBus {
    i2c: I2c,
}

impl I2cSenseBus {
    /// Open the given I2C bus and select the chip at `address`.
    pub fn open(bus: u8, address: u16) -> Result<Self, MonitorError> {
        let mut i2c = I2c::with_bus(bus)?;
        i2c.set_slave_address(address)?;
        Ok(Self { i2c })
    }

    pub fn from_config(config: &MonitorConfig) -> Result<Self, MonitorError> {
        Self::open(config.i2c_bus, config.address)
    }
}

impl CurrentSenseBus for I2cSenseBus {
    fn read_word(&mut self, reg: u8) -> Result<u16, MonitorError> {
        Ok(self.i2c.smbus_read_word(reg)?)
    }

    fn write_word(&mut self, reg: u8, value: u16) -> Result<(), MonitorError> {
        Ok(self.i2c.smbus_write_word(reg, value)?)
    }
}
