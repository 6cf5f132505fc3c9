use crate::ConfigError;
use std::time::Duration;

/// Hold times used by the nibble protocol.
///
/// All values are explicit [Duration]s. Use [Timing::datasheet] (the default) for values taken
/// from the HD44780 datasheet, or [Timing::legacy] for slower millisecond-scale holds that work
/// even with sluggish clones.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Timing {
    /// Wait before the first reset nibble, for the controller's own power-on reset.
    pub power_on: Duration,
    /// Hold after each of the reset nibbles.
    pub reset: Duration,
    /// How long `E` stays high during a strobe.
    pub enable_pulse: Duration,
    /// Hold after `E` goes low again, before the next transfer.
    pub settle: Duration,
    /// Extra hold after clear display and return home, which take ~1.52 ms to execute.
    pub long_command: Duration,
    /// Hold at the end of initialization.
    pub init_settle: Duration,
}

impl Timing {
    pub const fn datasheet() -> Self {
        Timing {
            power_on: Duration::from_millis(50),
            reset: Duration::from_millis(5),
            enable_pulse: Duration::from_micros(1),
            settle: Duration::from_micros(50),
            long_command: Duration::from_millis(2),
            init_settle: Duration::from_millis(200),
        }
    }

    pub const fn legacy() -> Self {
        Timing {
            power_on: Duration::from_millis(50),
            reset: Duration::from_millis(5),
            enable_pulse: Duration::from_millis(5),
            settle: Duration::from_millis(1),
            long_command: Duration::from_millis(2),
            init_settle: Duration::from_millis(200),
        }
    }

    /// No holds at all. Only useful against simulated transports.
    pub const fn none() -> Self {
        Timing {
            power_on: Duration::ZERO,
            reset: Duration::ZERO,
            enable_pulse: Duration::ZERO,
            settle: Duration::ZERO,
            long_command: Duration::ZERO,
            init_settle: Duration::ZERO,
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Timing::datasheet()
    }
}

/// Bus most Raspberry Pi boards expose on the header, `/dev/i2c-1`.
pub const DEFAULT_BUS: u8 = 1;
/// Factory address of a PCF8574 backpack. PCF8574A boards answer at `0x3F` instead.
pub const DEFAULT_ADDRESS: u16 = 0x27;

/// Construction parameters of an [Lcd](crate::Lcd).
///
/// Bus and device address belong to the [Transport](crate::Transport), which is opened
/// separately and handed to the display.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LcdConfig {
    /// Number of display lines, 1 or 2.
    pub lines: u8,
    /// Number of visible columns, 16 or 20.
    pub columns: u8,
    /// Use the 5x10 dot font. Single-line displays only.
    pub large_font: bool,
    /// Initial backlight state.
    pub backlight: bool,
    pub timing: Timing,
}

impl Default for LcdConfig {
    fn default() -> Self {
        LcdConfig {
            lines: 2,
            columns: 16,
            large_font: false,
            backlight: true,
            timing: Timing::default(),
        }
    }
}

impl LcdConfig {
    /// Checks the display geometry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.lines, 1 | 2) {
            return Err(ConfigError::UnsupportedLineCount(self.lines));
        }
        if !matches!(self.columns, 16 | 20) {
            return Err(ConfigError::UnsupportedColumnCount(self.columns));
        }
        if self.large_font && self.lines != 1 {
            return Err(ConfigError::LargeFontNeedsSingleLine);
        }
        Ok(())
    }
}

/// Accepts any non-reserved 7-bit address (`0x08..=0x77`).
pub fn validate_address(address: u16) -> Result<(), ConfigError> {
    if (0x08..=0x77).contains(&address) {
        Ok(())
    } else {
        Err(ConfigError::InvalidAddress(address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(LcdConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_unsupported_geometry() {
        let config = LcdConfig { lines: 4, ..LcdConfig::default() };
        assert_eq!(config.validate(), Err(ConfigError::UnsupportedLineCount(4)));

        let config = LcdConfig { columns: 40, ..LcdConfig::default() };
        assert_eq!(config.validate(), Err(ConfigError::UnsupportedColumnCount(40)));

        let config = LcdConfig { lines: 2, large_font: true, ..LcdConfig::default() };
        assert_eq!(config.validate(), Err(ConfigError::LargeFontNeedsSingleLine));

        let config = LcdConfig { lines: 1, large_font: true, columns: 20, ..LcdConfig::default() };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_reserved_addresses() {
        assert_eq!(validate_address(DEFAULT_ADDRESS), Ok(()));
        assert_eq!(validate_address(0x3F), Ok(()));
        assert_eq!(validate_address(0x00), Err(ConfigError::InvalidAddress(0x00)));
        assert_eq!(validate_address(0x78), Err(ConfigError::InvalidAddress(0x78)));
        assert_eq!(validate_address(0x127), Err(ConfigError::InvalidAddress(0x127)));
    }

    #[test]
    fn legacy_timing_is_never_faster_than_datasheet() {
        let fast = Timing::datasheet();
        let slow = Timing::legacy();
        assert!(slow.enable_pulse >= fast.enable_pulse);
        assert!(slow.settle >= fast.settle);
        assert!(slow.init_settle >= fast.init_settle);
    }
}
