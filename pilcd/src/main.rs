mod config;

use std::env::args;
use dotenv::dotenv;
use log::{debug, info};
use pilcd_driver::transport::RppalTransport;
use pilcd_driver::{Lcd, StdDelay};
use crate::config::Config;

/// Prints the given lines on the display, or a banner if none are given.
///
/// ```text
/// pilcd "Hello" "world"
/// ```
fn main() -> eyre::Result<()> {
    // Initialize environment and logger
    dotenv().ok();
    pretty_env_logger::init();

    info!("pilcd starting...");

    let config = Config::load()?;
    let lcd_config = config.lcd_config();
    lcd_config.validate()?;

    info!(
        "LCD @ i2c-{}, address {:#04x}, {}x{}, {:?} timing",
        config.bus, config.address, config.columns, config.lines, config.timing
    );

    debug!("Opening I2C transport...");
    let transport = RppalTransport::open(config.bus, config.address)?;
    debug!("{:?} opened.", transport);

    debug!("Initializing LCD driver...");
    let mut lcd = Lcd::new(transport, StdDelay, &lcd_config)?;
    debug!("{:?} initialized.", lcd);

    let mut lines: Vec<String> = args().skip(1).collect();
    if lines.is_empty() {
        lines.push("pilcd".to_string());
        lines.push(concat!("v.", env!("CARGO_PKG_VERSION")).to_string());
    }

    if lines.len() > lcd.lines() as usize {
        eyre::bail!(
            "{} lines given, but the display only has {}",
            lines.len(),
            lcd.lines()
        );
    }

    lcd.clear()?;
    for (index, line) in lines.iter().enumerate() {
        let columns = lcd.columns() as usize;
        let text: String = line.chars().take(columns).collect();
        if text.chars().count() < line.chars().count() {
            info!("Line {} truncated to {} columns", index + 1, columns);
        }
        lcd.display_string(&text, index as u8 + 1, 0)?;
    }

    info!("Done.");
    Ok(())
}
