//! HD44780 command layer.
//!
//! [HD44780Driver] builds the instruction bytes; implementations only have to know how to put a
//! command or data byte on the wire. [Pcf8574Driver] does that through an I2C backpack.
mod pcf8574;

use crate::{LcdError, LcdResult};
pub use pcf8574::*;
use std::fmt::Debug;

pub const CLEAR_DISPLAY: u8 = 0x01;
pub const RETURN_HOME: u8 = 0x02;
pub const ENTRY_MODE_SET: u8 = 0x04;
pub const DISPLAY_CONTROL: u8 = 0x08;
pub const CURSOR_SHIFT: u8 = 0x10;
pub const FUNCTION_SET: u8 = 0x20;
pub const SET_CGRAM_ADDR: u8 = 0x40;
pub const SET_DDRAM_ADDR: u8 = 0x80;

// Entry mode flags
pub const ENTRY_LEFT: u8 = 0x02;
pub const ENTRY_SHIFT_INCREMENT: u8 = 0x01;

// Display control flags
pub const DISPLAY_ON: u8 = 0x04;
pub const CURSOR_ON: u8 = 0x02;
pub const BLINK_ON: u8 = 0x01;

// Cursor/display shift flags
pub const DISPLAY_MOVE: u8 = 0x08;
pub const MOVE_RIGHT: u8 = 0x04;

// Function set flags
pub const EIGHT_BIT_MODE: u8 = 0x10;
pub const TWO_LINE: u8 = 0x08;
pub const FONT_5X10: u8 = 0x04;

/// DDRAM offset of the second line.
pub const LINE_2_OFFSET: u8 = 0x40;
/// DDRAM cells per line in two-line mode. Cells past the visible columns are scrolled in with a
/// display shift.
pub const TWO_LINE_DDRAM_LENGTH: u8 = 40;
/// DDRAM cells in one-line mode.
pub const ONE_LINE_DDRAM_LENGTH: u8 = 80;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CursorDirection {
    /// Moves the cursor to the left after writing data.
    Left,
    /// Moves the cursor to the right after writing data.
    Right,
}

/// Entry mode register: where the cursor goes after a write, and whether the display follows.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct EntryMode {
    pub direction: CursorDirection,
    pub shift: bool,
}

impl Default for EntryMode {
    fn default() -> Self {
        EntryMode {
            direction: CursorDirection::Right,
            shift: false,
        }
    }
}

impl EntryMode {
    pub fn to_mask(&self) -> u8 {
        let mut mask = 0;
        if self.direction == CursorDirection::Right {
            mask |= ENTRY_LEFT;
        }
        if self.shift {
            mask |= ENTRY_SHIFT_INCREMENT;
        }
        mask
    }
}

/// Display on/off control register.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DisplayControl {
    pub display_on: bool,
    pub cursor_on: bool,
    pub blink_on: bool,
}

impl Default for DisplayControl {
    fn default() -> Self {
        DisplayControl {
            display_on: true,
            cursor_on: false,
            blink_on: false,
        }
    }
}

impl DisplayControl {
    pub fn to_mask(&self) -> u8 {
        let mut mask = 0;
        if self.display_on {
            mask |= DISPLAY_ON;
        }
        if self.cursor_on {
            mask |= CURSOR_ON;
        }
        if self.blink_on {
            mask |= BLINK_ON;
        }
        mask
    }
}

/// Function set register. The interface width is always 4 bits on a backpack.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FunctionSet {
    pub two_lines: bool,
    /// 5x10 dots instead of 5x8.
    pub large_font: bool,
}

impl Default for FunctionSet {
    fn default() -> Self {
        FunctionSet {
            two_lines: true,
            large_font: false,
        }
    }
}

impl FunctionSet {
    pub fn to_mask(&self) -> u8 {
        let mut mask = 0;
        if self.two_lines {
            mask |= TWO_LINE;
        }
        if self.large_font {
            mask |= FONT_5X10;
        }
        mask
    }
}

pub trait HD44780Driver: Debug {
    /// Brings the controller into 4-bit mode from any prior state, then applies the given
    /// registers and clears the display.
    fn init(
        &mut self,
        function_set: FunctionSet,
        display_control: DisplayControl,
        entry_mode: EntryMode,
    ) -> LcdResult<()>;

    /// Clears the display and sets the cursor to the home position.
    fn clear_display(&mut self) -> LcdResult<()> {
        self.send_command(CLEAR_DISPLAY)
    }

    /// Sets the cursor to the home position and undoes any display shift.
    fn return_home(&mut self) -> LcdResult<()> {
        self.send_command(RETURN_HOME)
    }

    fn set_entry_mode(&mut self, entry_mode: EntryMode) -> LcdResult<()> {
        self.send_command(ENTRY_MODE_SET | entry_mode.to_mask())
    }

    fn set_display_control(&mut self, display_control: DisplayControl) -> LcdResult<()> {
        self.send_command(DISPLAY_CONTROL | display_control.to_mask())
    }

    /// Moves the cursor, or shifts the whole display, by one cell.
    fn cursor_shift(&mut self, display_shift: bool, direction: CursorDirection) -> LcdResult<()> {
        let mut command = CURSOR_SHIFT;
        if display_shift {
            command |= DISPLAY_MOVE;
        }
        if direction == CursorDirection::Right {
            command |= MOVE_RIGHT;
        }
        self.send_command(command)
    }

    fn function_set(&mut self, function_set: FunctionSet) -> LcdResult<()> {
        self.send_command(FUNCTION_SET | function_set.to_mask())
    }

    fn set_cgram_address(&mut self, address: u8) -> LcdResult<()> {
        if address > 0b00111111 {
            return Err(LcdError::InvalidArgument);
        }
        self.send_command(SET_CGRAM_ADDR | address)
    }

    fn set_ddram_address(&mut self, address: u8) -> LcdResult<()> {
        if address > 0b01111111 {
            return Err(LcdError::InvalidArgument);
        }
        self.send_command(SET_DDRAM_ADDR | address)
    }

    /// Sends an instruction byte (RS = 0).
    fn send_command(&mut self, command: u8) -> LcdResult<()>;

    /// Sends a data byte (RS = 1) to whichever RAM the address counter points at.
    fn send_data(&mut self, data: u8) -> LcdResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registers_match_power_on_setup() {
        assert_eq!(FUNCTION_SET | FunctionSet::default().to_mask(), 0x28);
        assert_eq!(DISPLAY_CONTROL | DisplayControl::default().to_mask(), 0x0C);
        assert_eq!(ENTRY_MODE_SET | EntryMode::default().to_mask(), 0x06);
    }

    #[test]
    fn flag_masks() {
        let control = DisplayControl {
            display_on: true,
            cursor_on: true,
            blink_on: true,
        };
        assert_eq!(control.to_mask(), 0x07);

        let entry = EntryMode {
            direction: CursorDirection::Left,
            shift: true,
        };
        assert_eq!(entry.to_mask(), 0x01);

        let function = FunctionSet {
            two_lines: false,
            large_font: true,
        };
        assert_eq!(function.to_mask(), 0x04);
    }
}
