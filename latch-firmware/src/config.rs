//! Board configuration
//!
//! The constants are generated by build.rs from board.toml, which is
//! validated at compile time.

use heapless::{String, Vec};
use latch_core::config::{
    BoardConfig, GpioteConfig, InputConfig, OutputConfig, PinConfig, WatchConfig,
};
use latch_core::{Error, MwuError};
use latch_hal::{Level, Polarity, Pull, Region};

include!(concat!(env!("OUT_DIR"), "/board.rs"));

/// Memory watch as written in board.toml
pub struct WatchEntry {
    pub label: &'static str,
    pub region: Region,
    pub start: u32,
    pub end: u32,
    pub reads: bool,
    pub writes: bool,
    pub subregions: u32,
    pub interrupt: bool,
}

impl WatchEntry {
    fn to_config(&self) -> WatchConfig {
        WatchConfig {
            label: String::try_from(self.label).unwrap_or_default(),
            region: self.region,
            start: self.start,
            end: self.end,
            reads: self.reads,
            writes: self.writes,
            subregions: self.subregions,
            interrupt: self.interrupt,
        }
    }
}

/// Build and check the board configuration
pub fn board_config() -> Result<BoardConfig, Error> {
    let mut watches = Vec::new();
    for entry in WATCHES {
        watches
            .push(entry.to_config())
            .map_err(|_| MwuError::InvalidRegion)?;
    }

    let config = BoardConfig {
        name: String::try_from(BOARD_NAME).unwrap_or_default(),
        button: BUTTON,
        led: LED,
        gpiote: GpioteConfig {
            gpio_slots: GPIO_SLOTS,
            irq_priority: IRQ_PRIORITY,
        },
        watches,
    };
    config.validate()?;
    Ok(config)
}

/// Input channel for the button
pub fn button_input(pin: &PinConfig) -> InputConfig {
    let config = InputConfig {
        sense: BUTTON_SENSE,
        ..InputConfig::sense_toggle(BUTTON_HI_ACCURACY)
    };
    config.with_pull(if pin.pull_up { Pull::Up } else { Pull::None })
}

/// Task output for the LED, starting off
pub fn led_output(pin: &PinConfig) -> OutputConfig {
    let off = if pin.inverted { Level::High } else { Level::Low };
    OutputConfig::task_toggle(off)
}
