use crate::config::Timing;
use crate::delay::hold;
use crate::hd44780::{
    CLEAR_DISPLAY, DisplayControl, EntryMode, FunctionSet, HD44780Driver, RETURN_HOME,
};
use crate::{LcdError, LcdResult, Transport};
use embedded_hal::delay::DelayNs;
use log::{debug, error, trace};
use std::fmt::{Debug, Formatter};
use std::time::Duration;

/// Register select (P0): 0 for instructions, 1 for data.
pub const REGISTER_SELECT: u8 = 0b0000_0001;
/// Read/write (P1). Never set, the backpack is driven write-only.
pub const READ_WRITE: u8 = 0b0000_0010;
/// Enable (P2), latches the nibble on its falling edge.
pub const ENABLE: u8 = 0b0000_0100;
/// Backlight transistor (P3).
pub const BACKLIGHT: u8 = 0b0000_1000;

/// Nibble that forces the controller into 8-bit mode, whatever state it's in.
const RESET_NIBBLE: u8 = 0x03;
/// Function set with DL = 0, sent as a lone nibble while the controller is still in 8-bit mode.
const FOUR_BIT_NIBBLE: u8 = 0x02;

/// HD44780 driver speaking the 4-bit nibble protocol through a PCF8574 backpack.
///
/// The backlight bit shares the byte with the data and control lines, so it is merged into every
/// single write. Once any write fails the driver refuses further work with [LcdError::Failed]:
/// a half-sent byte leaves the controller's nibble phase unknown.
pub struct Pcf8574Driver<T: Transport, D: DelayNs> {
    transport: T,
    delay: D,
    timing: Timing,
    backlight: bool,
    failed: bool,
}

impl<T: Transport, D: DelayNs> Pcf8574Driver<T, D> {
    pub fn new(transport: T, delay: D, timing: Timing, backlight: bool) -> Self {
        Pcf8574Driver {
            transport,
            delay,
            timing,
            backlight,
            failed: false,
        }
    }

    pub fn backlight(&self) -> bool {
        self.backlight
    }

    /// Switches the backlight and writes the bare backlight bit right away, so the change is
    /// visible even if nothing else is sent afterwards.
    pub fn set_backlight(&mut self, on: bool) -> LcdResult<()> {
        debug!("Backlight {}", if on { "on" } else { "off" });
        self.write_raw(if on { BACKLIGHT } else { 0 })?;
        self.backlight = on;
        Ok(())
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// Hands back the transport and the delay.
    pub fn release(self) -> (T, D) {
        (self.transport, self.delay)
    }

    fn backlight_mask(&self) -> u8 {
        if self.backlight { BACKLIGHT } else { 0 }
    }

    fn hold(&mut self, duration: Duration) {
        hold(&mut self.delay, duration);
    }

    /// Writes one byte to the expander exactly as given.
    pub fn write_raw(&mut self, byte: u8) -> LcdResult<()> {
        if self.failed {
            return Err(LcdError::Failed);
        }
        trace!("Expander <- {:08b}", byte);
        if let Err(err) = self.transport.write(byte) {
            error!("Write of {:#04x} to {:?} failed: {}", byte, self.transport, err);
            self.failed = true;
            return Err(err.into());
        }
        Ok(())
    }

    /// Raises and lowers `E` around `data` to latch it.
    fn strobe(&mut self, data: u8) -> LcdResult<()> {
        let high = data | ENABLE | self.backlight_mask();
        self.write_raw(high)?;
        self.hold(self.timing.enable_pulse);

        let low = (data & !ENABLE) | self.backlight_mask();
        self.write_raw(low)?;
        self.hold(self.timing.settle);
        Ok(())
    }

    /// Puts `data` on the bus with `E` low, then strobes it.
    ///
    /// The upper four bits of `data` are the nibble, the lower four carry RS.
    pub fn write_four_bits(&mut self, data: u8) -> LcdResult<()> {
        let data = data & !(ENABLE | READ_WRITE | BACKLIGHT);
        trace!("Writing nibble: {:04b}, RS: {}", data >> 4, data & REGISTER_SELECT);
        let setup = data | self.backlight_mask();
        self.write_raw(setup)?;
        self.strobe(data)
    }

    fn send(&mut self, byte: u8, mode: u8) -> LcdResult<()> {
        trace!("Sending byte: {:08b}, RS: {}", byte, mode);
        self.write_four_bits(mode | (byte & 0xF0))?;
        self.write_four_bits(mode | ((byte << 4) & 0xF0))
    }
}

impl<T: Transport, D: DelayNs> Debug for Pcf8574Driver<T, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Pcf8574Driver({:?})", self.transport)
    }
}

impl<T: Transport, D: DelayNs> HD44780Driver for Pcf8574Driver<T, D> {
    fn init(
        &mut self,
        function_set: FunctionSet,
        display_control: DisplayControl,
        entry_mode: EntryMode,
    ) -> LcdResult<()> {
        debug!("Initializing {:?}", self);
        self.hold(self.timing.power_on);

        // Synchronize: four 0x3 nibbles leave the controller in 8-bit mode no matter whether it
        // was in 8-bit mode, 4-bit mode or halfway through a 4-bit byte. A lone 0x2 then switches
        // it to 4-bit mode, after which bytes go out as nibble pairs.
        for _ in 0..4 {
            self.write_four_bits(RESET_NIBBLE << 4)?;
            self.hold(self.timing.reset);
        }
        self.write_four_bits(FOUR_BIT_NIBBLE << 4)?;

        self.function_set(function_set)?;
        self.set_display_control(display_control)?;
        self.clear_display()?;
        self.set_entry_mode(entry_mode)?;

        self.hold(self.timing.init_settle);
        debug!("{:?} initialized.", self);
        Ok(())
    }

    fn send_command(&mut self, command: u8) -> LcdResult<()> {
        self.send(command, 0)?;
        // Bit 0 of return home is don't-care, so 0x03 is a return home as well.
        if command == CLEAR_DISPLAY || command & !0x01 == RETURN_HOME {
            self.hold(self.timing.long_command);
        }
        Ok(())
    }

    fn send_data(&mut self, data: u8) -> LcdResult<()> {
        self.send(data, REGISTER_SELECT)
    }
}
