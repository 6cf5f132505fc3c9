//! [Transport](crate::Transport) implementations.
//!
//! - [HalTransport] works with any `embedded-hal` 1.0 I2C bus.
//! - [RppalTransport] opens `/dev/i2c-N` on a Raspberry Pi (feature `rppal`).
mod hal;
#[cfg(feature = "rppal")]
mod rpi;

pub use hal::*;
#[cfg(feature = "rppal")]
pub use rpi::*;
