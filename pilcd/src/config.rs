use std::env::var_os;
use std::ffi::OsStr;
use std::path::Path;
use dotenv::var;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use pilcd_driver::config::{DEFAULT_ADDRESS, DEFAULT_BUS};
use pilcd_driver::{LcdConfig, Timing};

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigParseError {
    #[error("{name}: invalid number {value:?}")]
    Number { name: &'static str, value: String },
    #[error("{name}: expected on/off, got {value:?}")]
    Flag { name: &'static str, value: String },
    #[error("{name}: unknown timing profile {value:?}, expected datasheet or legacy")]
    Timing { name: &'static str, value: String },
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimingProfile {
    #[default]
    Datasheet,
    Legacy,
}

impl TimingProfile {
    pub fn timing(&self) -> Timing {
        match self {
            TimingProfile::Datasheet => Timing::datasheet(),
            TimingProfile::Legacy => Timing::legacy(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq)]
#[serde(default)]
pub struct Config {
    pub bus: u8,
    pub address: u16,
    pub lines: u8,
    pub columns: u8,
    pub large_font: bool,
    pub backlight: bool,
    pub timing: TimingProfile,
}

impl Default for Config {
    fn default() -> Self {
        let lcd = LcdConfig::default();
        Config {
            bus: DEFAULT_BUS,
            address: DEFAULT_ADDRESS,
            lines: lcd.lines,
            columns: lcd.columns,
            large_font: lcd.large_font,
            backlight: lcd.backlight,
            timing: TimingProfile::default(),
        }
    }
}

impl Config {
    /// Reads the JSON file named by `CONFIG_FILE` (`pilcd.json` by default), if there is one.
    pub fn try_load() -> Option<Self> {
        let config_str = var_os("CONFIG_FILE");
        let config_str: &OsStr = config_str.as_deref().unwrap_or(OsStr::new("pilcd.json"));
        let config_path = Path::new(config_str);
        if config_path.exists() {
            let file = std::fs::File::open(config_path).ok()?;
            let reader = std::io::BufReader::new(file);
            serde_json::from_reader(reader).ok()
        } else {
            None
        }
    }

    /// The config file (or defaults) with `PILCD_*` environment variables on top.
    pub fn load() -> Result<Self, ConfigParseError> {
        let mut config = Self::try_load().unwrap_or_else(|| {
            debug!("No config file, using defaults.");
            Config::default()
        });
        config.apply_overrides(|name| var(name).ok())?;
        Ok(config)
    }

    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<(), ConfigParseError> {
        if let Some(value) = lookup("PILCD_I2C_BUS") {
            self.bus = parse_number("PILCD_I2C_BUS", &value)?;
        }
        if let Some(value) = lookup("PILCD_I2C_ADDRESS") {
            self.address = parse_number("PILCD_I2C_ADDRESS", &value)?;
        }
        if let Some(value) = lookup("PILCD_LINES") {
            self.lines = parse_number("PILCD_LINES", &value)?;
        }
        if let Some(value) = lookup("PILCD_COLUMNS") {
            self.columns = parse_number("PILCD_COLUMNS", &value)?;
        }
        if let Some(value) = lookup("PILCD_LARGE_FONT") {
            self.large_font = parse_flag("PILCD_LARGE_FONT", &value)?;
        }
        if let Some(value) = lookup("PILCD_BACKLIGHT") {
            self.backlight = parse_flag("PILCD_BACKLIGHT", &value)?;
        }
        if let Some(value) = lookup("PILCD_TIMING") {
            self.timing = match value.trim().to_ascii_lowercase().as_str() {
                "datasheet" => TimingProfile::Datasheet,
                "legacy" => TimingProfile::Legacy,
                _ => return Err(ConfigParseError::Timing { name: "PILCD_TIMING", value }),
            };
        }
        Ok(())
    }

    pub fn lcd_config(&self) -> LcdConfig {
        LcdConfig {
            lines: self.lines,
            columns: self.columns,
            large_font: self.large_font,
            backlight: self.backlight,
            timing: self.timing.timing(),
        }
    }
}

/// Parses decimal or `0x`-prefixed hexadecimal.
fn parse_number<N: TryFrom<u32>>(name: &'static str, value: &str) -> Result<N, ConfigParseError> {
    let trimmed = value.trim();
    let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => trimmed.parse().ok(),
    };
    parsed
        .and_then(|n| N::try_from(n).ok())
        .ok_or_else(|| ConfigParseError::Number { name, value: value.to_string() })
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigParseError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "on" | "true" | "yes" => Ok(true),
        "0" | "off" | "false" | "no" => Ok(false),
        _ => Err(ConfigParseError::Flag { name, value: value.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let map: HashMap<&'static str, String> =
            pairs.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn numbers_accept_hex_and_decimal() {
        assert_eq!(parse_number::<u16>("X", "0x27"), Ok(0x27));
        assert_eq!(parse_number::<u16>("X", " 63 "), Ok(63));
        assert_eq!(parse_number::<u8>("X", "0X3f"), Ok(0x3F));
        assert!(parse_number::<u8>("X", "300").is_err());
        assert!(parse_number::<u8>("X", "bus").is_err());
    }

    #[test]
    fn environment_overrides_defaults() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[
                ("PILCD_I2C_BUS", "0"),
                ("PILCD_I2C_ADDRESS", "0x3F"),
                ("PILCD_COLUMNS", "20"),
                ("PILCD_BACKLIGHT", "off"),
                ("PILCD_TIMING", "Legacy"),
            ]))
            .unwrap();

        assert_eq!(
            config,
            Config {
                bus: 0,
                address: 0x3F,
                lines: 2,
                columns: 20,
                large_font: false,
                backlight: false,
                timing: TimingProfile::Legacy,
            }
        );
        let lcd = config.lcd_config();
        assert_eq!(lcd.timing, Timing::legacy());
        assert_eq!(lcd.validate(), Ok(()));
    }

    #[test]
    fn bad_values_are_reported() {
        let mut config = Config::default();
        assert_eq!(
            config.apply_overrides(env(&[("PILCD_BACKLIGHT", "dim")])),
            Err(ConfigParseError::Flag { name: "PILCD_BACKLIGHT", value: "dim".to_string() })
        );
        assert!(matches!(
            config.apply_overrides(env(&[("PILCD_TIMING", "fast")])),
            Err(ConfigParseError::Timing { .. })
        ));
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config: Config = serde_json::from_str(r#"{ "address": 63, "timing": "legacy" }"#).unwrap();
        assert_eq!(config.address, 0x3F);
        assert_eq!(config.timing, TimingProfile::Legacy);
        assert_eq!(config.lines, 2);
        assert_eq!(config.bus, 1);
    }

    #[test]
    fn large_font_is_configurable() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[("PILCD_LINES", "1"), ("PILCD_LARGE_FONT", "yes")]))
            .unwrap();
        let lcd = config.lcd_config();
        assert!(lcd.large_font);
        assert_eq!(lcd.validate(), Ok(()));

        let config: Config = serde_json::from_str(r#"{ "large_font": true }"#).unwrap();
        assert_eq!(
            config.lcd_config().validate(),
            Err(pilcd_driver::ConfigError::LargeFontNeedsSingleLine)
        );
    }
}
