//! GPIOTE (GPIO Tasks and Events) register abstractions
//!
//! Each GPIOTE channel binds one pin and works either in event mode (a pin
//! transition latches `EVENTS_IN[n]`) or in task mode (writing
//! `TASKS_OUT/SET/CLR[n]` drives the pin). `EVENTS_PORT` is shared by all
//! pins whose `SENSE` field is armed.

use bitflags::bitflags;

use crate::gpio::{Level, Pin};

/// Number of GPIOTE channels on the nRF52840
pub const CHANNEL_COUNT: usize = 8;

/// Task and event register offsets from the GPIOTE base address
pub mod offset {
    /// `TASKS_OUT[0]`
    pub const TASKS_OUT: usize = 0x000;
    /// `TASKS_SET[0]`
    pub const TASKS_SET: usize = 0x030;
    /// `TASKS_CLR[0]`
    pub const TASKS_CLR: usize = 0x060;
    /// `EVENTS_IN[0]`
    pub const EVENTS_IN: usize = 0x100;
    /// `EVENTS_PORT`
    pub const EVENTS_PORT: usize = 0x17C;
}

/// Hardware GPIOTE channel index (0-7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Channel(u8);

impl Channel {
    /// Create a channel index, or `None` if out of range
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < CHANNEL_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Channel index as `usize`
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Byte offset of this channel's word within a register array
    pub const fn word_offset(self) -> usize {
        self.0 as usize * 4
    }

    /// Iterate over all hardware channels
    pub fn all() -> impl Iterator<Item = Channel> {
        (0..CHANNEL_COUNT as u8).map(Channel)
    }
}

/// Channel mode (`CONFIG.MODE`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Channel disabled, pin controlled by GPIO
    #[default]
    Disabled,
    /// Pin transitions generate `EVENTS_IN[n]`
    Event,
    /// Pin driven by `TASKS_OUT/SET/CLR[n]`
    Task,
}

impl Mode {
    const fn bits(self) -> u32 {
        match self {
            Mode::Disabled => 0,
            Mode::Event => 1,
            Mode::Task => 3,
        }
    }

    const fn from_bits(bits: u32) -> Self {
        match bits & 0b11 {
            1 => Mode::Event,
            3 => Mode::Task,
            _ => Mode::Disabled,
        }
    }
}

/// Transition sensed by an event channel, or action of `TASKS_OUT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Polarity {
    /// No event / no effect on pin from `TASKS_OUT`
    #[default]
    None,
    /// Rising edge / `TASKS_OUT` sets the pin high
    LoToHi,
    /// Falling edge / `TASKS_OUT` sets the pin low
    HiToLo,
    /// Any change / `TASKS_OUT` toggles the pin
    Toggle,
}

impl Polarity {
    const fn bits(self) -> u32 {
        match self {
            Polarity::None => 0,
            Polarity::LoToHi => 1,
            Polarity::HiToLo => 2,
            Polarity::Toggle => 3,
        }
    }

    const fn from_bits(bits: u32) -> Self {
        match bits & 0b11 {
            1 => Polarity::LoToHi,
            2 => Polarity::HiToLo,
            3 => Polarity::Toggle,
            _ => Polarity::None,
        }
    }

    /// Output level after applying this action to `current`
    pub const fn apply(self, current: Level) -> Level {
        match self {
            Polarity::None => current,
            Polarity::LoToHi => Level::High,
            Polarity::HiToLo => Level::Low,
            Polarity::Toggle => current.toggled(),
        }
    }
}

/// Decoded contents of a `CONFIG[n]` register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    /// Channel mode
    pub mode: Mode,
    /// Bound pin (`PSEL` + `PORT`)
    pub pin: Pin,
    /// Sensed transition or task action
    pub polarity: Polarity,
    /// Initial output level in task mode
    pub outinit: Level,
}

impl ChannelConfig {
    const PSEL_SHIFT: u32 = 8;
    const PORT_BIT: u32 = 1 << 13;
    const POLARITY_SHIFT: u32 = 16;
    const OUTINIT_BIT: u32 = 1 << 20;

    /// Disabled channel configuration (reset value)
    pub const fn disabled(pin: Pin) -> Self {
        Self {
            mode: Mode::Disabled,
            pin,
            polarity: Polarity::None,
            outinit: Level::Low,
        }
    }

    /// Encode into the raw register value
    pub const fn to_bits(self) -> u32 {
        let mut bits = self.mode.bits()
            | ((self.pin.index() as u32) << Self::PSEL_SHIFT)
            | (self.polarity.bits() << Self::POLARITY_SHIFT);
        if self.pin.port() == 1 {
            bits |= Self::PORT_BIT;
        }
        if self.outinit.is_high() {
            bits |= Self::OUTINIT_BIT;
        }
        bits
    }

    /// Decode a raw register value
    pub fn from_bits(bits: u32) -> Self {
        let index = ((bits >> Self::PSEL_SHIFT) & 0x1F) as u8;
        let port = u8::from(bits & Self::PORT_BIT != 0);
        // PORT=1 with PSEL >= 16 addresses a pin the package does not have;
        // fall back to the port 0 pin like the hardware reset value does.
        let pin = Pin::from_port(port, index)
            .or_else(|| Pin::new(index))
            .unwrap_or(Pin::MIN);
        Self {
            mode: Mode::from_bits(bits),
            pin,
            polarity: Polarity::from_bits(bits >> Self::POLARITY_SHIFT),
            outinit: Level::from(bits & Self::OUTINIT_BIT != 0),
        }
    }
}

bitflags! {
    /// GPIOTE interrupt enable bits (`INTEN` layout)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GpioteInterrupts: u32 {
        const IN0 = 1 << 0;
        const IN1 = 1 << 1;
        const IN2 = 1 << 2;
        const IN3 = 1 << 3;
        const IN4 = 1 << 4;
        const IN5 = 1 << 5;
        const IN6 = 1 << 6;
        const IN7 = 1 << 7;
        const PORT = 1 << 31;
    }
}

impl GpioteInterrupts {
    /// Interrupt bit of a channel's `EVENTS_IN`
    pub const fn channel(channel: Channel) -> Self {
        Self::from_bits_truncate(1 << channel.index())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for GpioteInterrupts {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "GpioteInterrupts({=u32:#x})", self.bits())
    }
}

/// Register-level GPIOTE access
///
/// Address getters are provided from [`GpioteHal::base_address`] and the
/// register offsets, so PPI wiring can reference tasks and events.
pub trait GpioteHal {
    /// Base address of the peripheral instance
    fn base_address(&self) -> usize;

    /// Trigger `TASKS_OUT[n]`
    fn trigger_out(&mut self, channel: Channel);

    /// Trigger `TASKS_SET[n]`
    fn trigger_set(&mut self, channel: Channel);

    /// Trigger `TASKS_CLR[n]`
    fn trigger_clr(&mut self, channel: Channel);

    /// Check `EVENTS_IN[n]`
    fn event_in(&self, channel: Channel) -> bool;

    /// Clear `EVENTS_IN[n]`
    fn clear_event_in(&mut self, channel: Channel);

    /// Check `EVENTS_PORT`
    fn event_port(&self) -> bool;

    /// Clear `EVENTS_PORT`
    fn clear_event_port(&mut self);

    /// Enable interrupts (`INTENSET`)
    fn int_enable(&mut self, mask: GpioteInterrupts);

    /// Disable interrupts (`INTENCLR`)
    fn int_disable(&mut self, mask: GpioteInterrupts);

    /// Currently enabled interrupts
    fn int_enabled(&self) -> GpioteInterrupts;

    /// Read `CONFIG[n]`
    fn config(&self, channel: Channel) -> ChannelConfig;

    /// Write `CONFIG[n]`
    fn set_config(&mut self, channel: Channel, config: ChannelConfig);

    /// Address of `TASKS_OUT[n]`
    fn out_task_address(&self, channel: Channel) -> usize {
        self.base_address() + offset::TASKS_OUT + channel.word_offset()
    }

    /// Address of `TASKS_SET[n]`
    fn set_task_address(&self, channel: Channel) -> usize {
        self.base_address() + offset::TASKS_SET + channel.word_offset()
    }

    /// Address of `TASKS_CLR[n]`
    fn clr_task_address(&self, channel: Channel) -> usize {
        self.base_address() + offset::TASKS_CLR + channel.word_offset()
    }

    /// Address of `EVENTS_IN[n]`
    fn in_event_address(&self, channel: Channel) -> usize {
        self.base_address() + offset::EVENTS_IN + channel.word_offset()
    }

    /// Address of `EVENTS_PORT`
    fn port_event_address(&self) -> usize {
        self.base_address() + offset::EVENTS_PORT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_encoding() {
        let config = ChannelConfig {
            mode: Mode::Task,
            pin: Pin::new(13).unwrap(),
            polarity: Polarity::Toggle,
            outinit: Level::High,
        };
        assert_eq!(config.to_bits(), 0x0013_0D03);
        assert_eq!(ChannelConfig::from_bits(config.to_bits()), config);
    }

    #[test]
    fn test_config_port1() {
        let config = ChannelConfig {
            mode: Mode::Event,
            pin: Pin::from_port(1, 2).unwrap(),
            polarity: Polarity::HiToLo,
            outinit: Level::Low,
        };
        // PSEL=2, PORT=1, POLARITY=HiToLo, MODE=Event
        assert_eq!(config.to_bits(), 0x0002_2201);
        assert_eq!(ChannelConfig::from_bits(config.to_bits()).pin.number(), 34);
    }

    #[test]
    fn test_polarity_apply() {
        assert_eq!(Polarity::LoToHi.apply(Level::Low), Level::High);
        assert_eq!(Polarity::HiToLo.apply(Level::High), Level::Low);
        assert_eq!(Polarity::Toggle.apply(Level::High), Level::Low);
        assert_eq!(Polarity::None.apply(Level::High), Level::High);
    }

    #[test]
    fn test_channel_range() {
        assert!(Channel::new(7).is_some());
        assert!(Channel::new(8).is_none());
        assert_eq!(Channel::all().count(), CHANNEL_COUNT);
        assert_eq!(
            GpioteInterrupts::channel(Channel::new(3).unwrap()),
            GpioteInterrupts::IN3
        );
    }
}
