use crate::config::validate_address;
use crate::{ConfigError, LcdResult, Transport, TransportError};
use log::debug;
use rppal::i2c::I2c;
use std::fmt::{Debug, Formatter};
use std::path::Path;

/// Linux `i2c-dev` transport through [rppal].
pub struct RppalTransport {
    i2c: I2c,
    address: u16,
}

impl RppalTransport {
    /// Opens `/dev/i2c-<bus>` and binds it to the device at `address`.
    ///
    /// A missing bus or an invalid address is a configuration error; nothing is written here.
    pub fn open(bus: u8, address: u16) -> LcdResult<Self> {
        validate_address(address)?;
        if !Path::new(&format!("/dev/i2c-{}", bus)).exists() {
            return Err(ConfigError::BusNotFound(bus).into());
        }

        let mut i2c = I2c::with_bus(bus).map_err(TransportError::from)?;
        i2c.set_slave_address(address).map_err(TransportError::from)?;
        debug!("Opened I2C bus {} for device {:#04x}", bus, address);

        Ok(RppalTransport { i2c, address })
    }
}

impl Debug for RppalTransport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "RppalTransport(i2c-{}@{:#04x})", self.i2c.bus(), self.address)
    }
}

impl From<rppal::i2c::Error> for TransportError {
    fn from(err: rppal::i2c::Error) -> Self {
        match err {
            rppal::i2c::Error::Io(err) => TransportError::Io(err.kind()),
            other => TransportError::Other(other.to_string()),
        }
    }
}

impl Transport for RppalTransport {
    fn write(&mut self, byte: u8) -> Result<(), TransportError> {
        match self.i2c.write(&[byte])? {
            1 => Ok(()),
            n => Err(TransportError::Other(format!("short write: {} of 1 bytes", n))),
        }
    }
}
