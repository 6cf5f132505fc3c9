//! Driver for HD44780 character LCDs wired through a PCF8574 I2C backpack.
//!
//! The expander exposes the LCD pins as the bits of a single I2C byte:
//!
//! | P7 | P6 | P5 | P4 | P3 | P2 | P1 | P0 |
//! |----|----|----|----|----|----|----|----|
//! | D7 | D6 | D5 | D4 | BL | E  | RW | RS |
//!
//! so every HD44780 byte travels as two 4-bit halves on D7..D4, each one latched by
//! raising and lowering `E`. See [Lcd] for the high-level API, [hd44780] for the
//! command layer and [transport] for the available byte sinks.
pub mod config;
pub mod delay;
pub mod hd44780;
pub mod lcd;
pub mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use config::{LcdConfig, Timing};
pub use delay::StdDelay;
pub use lcd::Lcd;

use std::fmt::Debug;
use thiserror::Error;

/// Failure reported by a [Transport] while writing to the expander.
#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum TransportError {
    #[error("device did not acknowledge")]
    NoAcknowledge,
    #[error("bus arbitration lost")]
    ArbitrationLoss,
    #[error("IO error: {0}")]
    Io(std::io::ErrorKind),
    #[error("bus error: {0}")]
    Other(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io(err.kind())
    }
}

/// Invalid construction parameters. Always reported before anything is written to the bus.
#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum ConfigError {
    #[error("invalid I2C device address {0:#04x}")]
    InvalidAddress(u16),
    #[error("I2C bus {0} not found")]
    BusNotFound(u8),
    #[error("unsupported line count {0}, expected 1 or 2")]
    UnsupportedLineCount(u8),
    #[error("unsupported column count {0}, expected 16 or 20")]
    UnsupportedColumnCount(u8),
    #[error("the 5x10 font is only available on single-line displays")]
    LargeFontNeedsSingleLine,
}

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum LcdError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
    #[error("invalid argument")]
    InvalidArgument,
    /// A previous write failed, so the controller state on the other end is unknown.
    /// The display has to be constructed again.
    #[error("display unusable after an earlier transport failure")]
    Failed,
}

pub type LcdResult<T> = Result<T, LcdError>;

/// A byte sink bound to one expander on one bus.
///
/// Bus selection and device addressing happen when the transport is created; after that the
/// only operation is writing a single byte.
pub trait Transport: Debug {
    /// Writes one byte to the device.
    fn write(&mut self, byte: u8) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, byte: u8) -> Result<(), TransportError> {
        (**self).write(byte)
    }
}
