use crate::config::validate_address;
use crate::{LcdResult, Transport, TransportError};
use embedded_hal::i2c::{Error, ErrorKind, I2c};
use std::fmt::{Debug, Formatter};

/// Writes to a fixed 7-bit address on an `embedded-hal` I2C bus.
pub struct HalTransport<I: I2c> {
    i2c: I,
    address: u8,
}

impl<I: I2c> HalTransport<I> {
    pub fn new(i2c: I, address: u8) -> LcdResult<Self> {
        validate_address(address as u16)?;
        Ok(HalTransport { i2c, address })
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> Debug for HalTransport<I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "HalTransport({:#04x})", self.address)
    }
}

impl From<ErrorKind> for TransportError {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NoAcknowledge(_) => TransportError::NoAcknowledge,
            ErrorKind::ArbitrationLoss => TransportError::ArbitrationLoss,
            other => TransportError::Other(format!("{:?}", other)),
        }
    }
}

impl<I: I2c> Transport for HalTransport<I> {
    fn write(&mut self, byte: u8) -> Result<(), TransportError> {
        self.i2c
            .write(self.address, &[byte])
            .map_err(|err| err.kind().into())
    }
}
