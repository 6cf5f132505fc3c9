use crate::config::LcdConfig;
use crate::hd44780::{
    CursorDirection, DisplayControl, EntryMode, FunctionSet, HD44780Driver, LINE_2_OFFSET,
    ONE_LINE_DDRAM_LENGTH, Pcf8574Driver, TWO_LINE_DDRAM_LENGTH,
};
use crate::{LcdError, LcdResult, Transport};
use embedded_hal::delay::DelayNs;
use log::{debug, warn};
use std::fmt::{Debug, Formatter};

/// A character LCD behind a PCF8574 backpack.
///
/// Construction runs the full HD44780 initialization, so an [Lcd] value always refers to a
/// display in a known 4-bit state. The register flag sets are remembered, so e.g. hiding the
/// cursor doesn't switch the display off.
///
/// Every operation is a blocking sequence of expander writes. The two halves of a byte must not be
/// interleaved with anything else on the device, hence the exclusive `&mut self` everywhere. If a
/// write fails, the display stops accepting operations (see [LcdError::Failed]); [Lcd::release]
/// the transport and construct it again.
pub struct Lcd<T: Transport, D: DelayNs> {
    driver: Pcf8574Driver<T, D>,
    lines: u8,
    columns: u8,
    entry_mode: EntryMode,
    display_control: DisplayControl,
    function_set: FunctionSet,
}

impl<T: Transport, D: DelayNs> Lcd<T, D> {
    /// Validates `config`, then initializes the display.
    ///
    /// Configuration errors are reported before anything is written. A transport error aborts
    /// initialization on the spot.
    pub fn new(transport: T, delay: D, config: &LcdConfig) -> LcdResult<Self> {
        config.validate()?;

        let mut lcd = Lcd {
            driver: Pcf8574Driver::new(transport, delay, config.timing, config.backlight),
            lines: config.lines,
            columns: config.columns,
            entry_mode: EntryMode::default(),
            display_control: DisplayControl::default(),
            function_set: FunctionSet {
                two_lines: config.lines == 2,
                large_font: config.large_font,
            },
        };

        lcd.driver
            .init(lcd.function_set, lcd.display_control, lcd.entry_mode)?;
        debug!("{:?} ready, {}x{}", lcd.driver, lcd.columns, lcd.lines);
        Ok(lcd)
    }

    /// Sends a raw instruction byte.
    pub fn write_command(&mut self, command: u8) -> LcdResult<()> {
        self.driver.send_command(command)
    }

    /// Writes a raw character code at the cursor. Codes 0 to 7 are the [custom glyphs](Self::create_char).
    pub fn write_byte(&mut self, byte: u8) -> LcdResult<()> {
        self.driver.send_data(byte)
    }

    /// Writes a character at the cursor; the controller advances the cursor by itself.
    ///
    /// The character ROM only agrees with ASCII, so anything else is shown as `?`.
    pub fn write_char(&mut self, c: char) -> LcdResult<()> {
        if c.is_ascii() {
            self.write_byte(c as u8)
        } else {
            warn!("Non-ASCII character: {}", c);
            self.write_byte(b'?')
        }
    }

    /// Writes `text` at the cursor.
    pub fn print(&mut self, text: &str) -> LcdResult<()> {
        for c in text.chars() {
            self.write_char(c)?;
        }
        Ok(())
    }

    /// Moves the cursor to `pos` (0-based) on `line` (1 or 2), then writes `text`.
    ///
    /// `pos` may lie past the visible columns, up to the end of the line's DDRAM (40 cells on a
    /// two-line display). Such text shows up once it is moved in with [Lcd::scroll_display].
    ///
    /// `line` defaults to 1 and `pos` to 0:
    ///
    /// ```ignore
    /// lcd.display_string("Hello", None, None)?;
    /// lcd.display_string("world", 2, 3)?;
    /// ```
    pub fn display_string(
        &mut self,
        text: &str,
        line: impl Into<Option<u8>>,
        pos: impl Into<Option<u8>>,
    ) -> LcdResult<()> {
        self.set_cursor(line.into().unwrap_or(1), pos.into().unwrap_or(0))?;
        self.print(text)
    }

    /// Moves the cursor to `pos` (0-based) on `line` (1 or 2).
    pub fn set_cursor(&mut self, line: u8, pos: u8) -> LcdResult<()> {
        let address = self.ddram_address(line, pos)?;
        self.driver.set_ddram_address(address)
    }

    fn ddram_address(&self, line: u8, pos: u8) -> LcdResult<u8> {
        let line_length = if self.lines == 2 {
            TWO_LINE_DDRAM_LENGTH
        } else {
            ONE_LINE_DDRAM_LENGTH
        };
        if pos >= line_length {
            return Err(LcdError::InvalidArgument);
        }
        match line {
            1 => Ok(pos),
            2 if self.lines == 2 => Ok(pos + LINE_2_OFFSET),
            _ => Err(LcdError::InvalidArgument),
        }
    }

    /// Clears the display and moves the cursor to the top-left cell.
    ///
    /// Sends an explicit return home after the clear, since not every controller revision
    /// resets the address counter on clear alone.
    pub fn clear(&mut self) -> LcdResult<()> {
        self.driver.clear_display()?;
        self.driver.return_home()
    }

    /// Moves the cursor home and undoes any display shift, keeping the contents.
    pub fn return_home(&mut self) -> LcdResult<()> {
        self.driver.return_home()
    }

    pub fn backlight(&self) -> bool {
        self.driver.backlight()
    }

    /// Switches the backlight. The new state also applies to every byte written afterwards.
    pub fn set_backlight(&mut self, on: bool) -> LcdResult<()> {
        self.driver.set_backlight(on)
    }

    /// Turns the display on or off. The contents are kept.
    pub fn set_display(&mut self, on: bool) -> LcdResult<()> {
        self.update_display_control(DisplayControl {
            display_on: on,
            ..self.display_control
        })
    }

    /// Shows or hides the underline cursor.
    pub fn set_cursor_visible(&mut self, visible: bool) -> LcdResult<()> {
        self.update_display_control(DisplayControl {
            cursor_on: visible,
            ..self.display_control
        })
    }

    /// Turns the blinking block cursor on or off.
    pub fn set_blink(&mut self, blink: bool) -> LcdResult<()> {
        self.update_display_control(DisplayControl {
            blink_on: blink,
            ..self.display_control
        })
    }

    fn update_display_control(&mut self, display_control: DisplayControl) -> LcdResult<()> {
        self.driver.set_display_control(display_control)?;
        self.display_control = display_control;
        Ok(())
    }

    /// Sets which way the cursor moves after each character.
    pub fn set_text_direction(&mut self, direction: CursorDirection) -> LcdResult<()> {
        self.update_entry_mode(EntryMode {
            direction,
            ..self.entry_mode
        })
    }

    /// When enabled, the display shifts on every write instead of the cursor moving.
    pub fn set_autoscroll(&mut self, enabled: bool) -> LcdResult<()> {
        self.update_entry_mode(EntryMode {
            shift: enabled,
            ..self.entry_mode
        })
    }

    fn update_entry_mode(&mut self, entry_mode: EntryMode) -> LcdResult<()> {
        self.driver.set_entry_mode(entry_mode)?;
        self.entry_mode = entry_mode;
        Ok(())
    }

    /// Shifts the whole display one cell, without touching DDRAM.
    pub fn scroll_display(&mut self, direction: CursorDirection) -> LcdResult<()> {
        self.driver.cursor_shift(true, direction)
    }

    /// Moves the cursor one cell.
    pub fn move_cursor(&mut self, direction: CursorDirection) -> LcdResult<()> {
        self.driver.cursor_shift(false, direction)
    }

    /// Stores a 5x8 glyph in CGRAM slot `location` (0 to 7). Only the lower five bits of each
    /// row are used. Show it with [Lcd::write_byte].
    ///
    /// The address counter points into CGRAM afterwards, so the cursor is moved back home.
    pub fn create_char(&mut self, location: u8, rows: &[u8; 8]) -> LcdResult<()> {
        if location > 7 {
            return Err(LcdError::InvalidArgument);
        }
        self.driver.set_cgram_address(location << 3)?;
        for &row in rows {
            self.driver.send_data(row & 0b0001_1111)?;
        }
        self.driver.set_ddram_address(0)
    }

    pub fn lines(&self) -> u8 {
        self.lines
    }

    pub fn columns(&self) -> u8 {
        self.columns
    }

    pub fn entry_mode(&self) -> EntryMode {
        self.entry_mode
    }

    pub fn display_control(&self) -> DisplayControl {
        self.display_control
    }

    pub fn function_set(&self) -> FunctionSet {
        self.function_set
    }

    /// Whether an earlier write failed. A failed display rejects every operation.
    pub fn is_failed(&self) -> bool {
        self.driver.is_failed()
    }

    /// Gives back the transport and delay, e.g. to construct the display again after a failure.
    pub fn release(self) -> (T, D) {
        self.driver.release()
    }
}

impl<T: Transport, D: DelayNs> Debug for Lcd<T, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Lcd{}x{}({:?})", self.columns, self.lines, self.driver)
    }
}

impl<T: Transport, D: DelayNs> std::fmt::Write for Lcd<T, D> {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.print(s).map_err(|_| std::fmt::Error)
    }
}
