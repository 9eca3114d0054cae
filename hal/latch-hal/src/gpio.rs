//! GPIO pin abstractions
//!
//! The GPIOTE driver needs more of the GPIO port than a plain output/input
//! pin: it reconfigures pins when channels are bound and released, arms the
//! `SENSE` field for low-accuracy inputs, and reads back levels. This module
//! provides that register-level surface plus the pin vocabulary shared with
//! the GPIOTE layer.

/// Number of GPIO pins on the nRF52840 (P0.00-P0.31, P1.00-P1.15)
pub const PIN_COUNT: u8 = 48;

/// Number of pins per GPIO port
pub const PINS_PER_PORT: u8 = 32;

/// `PIN_CNF[n]` field layout
pub mod pin_cnf {
    /// DIR: 1 = output
    pub const DIR_OUTPUT: u32 = 1 << 0;
    /// INPUT: 1 = input buffer disconnected
    pub const INPUT_DISCONNECT: u32 = 1 << 1;
    /// PULL field position
    pub const PULL_SHIFT: u32 = 2;
    /// PULL field mask
    pub const PULL_MASK: u32 = 0b11 << PULL_SHIFT;
    /// SENSE field position
    pub const SENSE_SHIFT: u32 = 16;
    /// SENSE field mask
    pub const SENSE_MASK: u32 = 0b11 << SENSE_SHIFT;
    /// Reset value: input, buffer disconnected, no pull, sense disabled
    pub const DEFAULT: u32 = INPUT_DISCONNECT;
}

/// GPIO pin identifier
///
/// Pins are numbered across both ports: 0-31 are `P0.00`-`P0.31`,
/// 32-47 are `P1.00`-`P1.15`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pin(u8);

impl Pin {
    /// Lowest-numbered pin (`P0.00`)
    pub const MIN: Pin = Pin(0);

    /// Create a pin from its absolute number, or `None` if it does not exist
    pub const fn new(number: u8) -> Option<Self> {
        if number < PIN_COUNT {
            Some(Self(number))
        } else {
            None
        }
    }

    /// Create a pin from a port and an index within the port
    pub const fn from_port(port: u8, index: u8) -> Option<Self> {
        if index >= PINS_PER_PORT || port > 1 {
            return None;
        }
        Self::new(port * PINS_PER_PORT + index)
    }

    /// Absolute pin number (0-47)
    pub const fn number(self) -> u8 {
        self.0
    }

    /// GPIO port (0 or 1)
    pub const fn port(self) -> u8 {
        self.0 / PINS_PER_PORT
    }

    /// Index within the port (0-31)
    pub const fn index(self) -> u8 {
        self.0 % PINS_PER_PORT
    }

    /// Single-bit mask of this pin within its port registers
    pub const fn port_mask(self) -> u32 {
        1 << self.index()
    }
}

impl TryFrom<u8> for Pin {
    type Error = u8;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Pin::new(number).ok_or(number)
    }
}

/// Logic level of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Level {
    /// Logic 0
    #[default]
    Low,
    /// Logic 1
    High,
}

impl Level {
    /// The opposite level
    pub const fn toggled(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }

    /// Check if the level is high
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl From<Level> for bool {
    fn from(level: Level) -> bool {
        level.is_high()
    }
}

/// Internal pull resistor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Pull {
    /// No pull resistor
    #[default]
    None,
    /// Pull-down resistor
    Down,
    /// Pull-up resistor
    Up,
}

impl Pull {
    /// Value of the `PIN_CNF.PULL` field
    pub const fn bits(self) -> u32 {
        match self {
            Pull::None => 0,
            Pull::Down => 1,
            Pull::Up => 3,
        }
    }

    /// Decode the `PIN_CNF.PULL` field
    pub const fn from_bits(bits: u32) -> Self {
        match bits & 0b11 {
            1 => Pull::Down,
            3 => Pull::Up,
            _ => Pull::None,
        }
    }
}

/// Pin sense configuration (drives the GPIO `DETECT` signal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sense {
    /// Sense disabled
    #[default]
    Disabled,
    /// Sense for high level
    High,
    /// Sense for low level
    Low,
}

impl Sense {
    /// Value of the `PIN_CNF.SENSE` field
    pub const fn bits(self) -> u32 {
        match self {
            Sense::Disabled => 0,
            Sense::High => 2,
            Sense::Low => 3,
        }
    }

    /// Decode the `PIN_CNF.SENSE` field
    pub const fn from_bits(bits: u32) -> Self {
        match bits & 0b11 {
            2 => Sense::High,
            3 => Sense::Low,
            _ => Sense::Disabled,
        }
    }

    /// Check whether `level` satisfies this sense condition
    pub const fn matches(self, level: Level) -> bool {
        matches!(
            (self, level),
            (Sense::High, Level::High) | (Sense::Low, Level::Low)
        )
    }
}

/// Register-level GPIO port access
///
/// Implementations handle the port selection for pins on P1 and must use
/// the atomic `OUTSET`/`OUTCLR` registers for level changes.
pub trait GpioHal {
    /// Configure a pin as an input with its input buffer connected
    fn configure_input(&mut self, pin: Pin, pull: Pull);

    /// Configure a pin as an output driving `initial`
    ///
    /// The level is written before the direction is switched so the pin
    /// never glitches. With `connect_input` the input buffer stays
    /// connected and the pin level can still be read back.
    fn configure_output(&mut self, pin: Pin, initial: Level, connect_input: bool);

    /// Connect the input buffer without touching direction or pull
    fn connect_input(&mut self, pin: Pin);

    /// Return a pin to its reset configuration
    fn disconnect(&mut self, pin: Pin);

    /// Program the `SENSE` field of a pin
    fn set_sense(&mut self, pin: Pin, sense: Sense);

    /// Current `SENSE` field of a pin
    fn sense(&self, pin: Pin) -> Sense;

    /// Current input level of a pin
    fn read(&self, pin: Pin) -> Level;

    /// Drive the pin high
    fn set_high(&mut self, pin: Pin);

    /// Drive the pin low
    fn set_low(&mut self, pin: Pin);

    /// Level currently written to the output register
    fn output_level(&self, pin: Pin) -> Level;

    /// Drive the pin to a specific level
    fn write(&mut self, pin: Pin, level: Level) {
        match level {
            Level::High => self.set_high(pin),
            Level::Low => self.set_low(pin),
        }
    }

    /// Invert the output register bit of a pin
    fn toggle(&mut self, pin: Pin) {
        let level = self.output_level(pin).toggled();
        self.write(pin, level);
    }
}
