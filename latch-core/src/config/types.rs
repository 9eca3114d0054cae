//! Driver configuration type definitions

use heapless::String;
use latch_hal::{Access, Level, Polarity, Pull, Region, RegionWatch};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::MwuError;

/// Maximum label length
pub const MAX_LABEL_LEN: usize = 16;

/// Maximum number of port-event slots for low-accuracy inputs
pub const MAX_GPIO_SLOTS: usize = 4;

/// Default interrupt priority of the GPIOTE driver
pub const DEFAULT_IRQ_PRIORITY: u8 = 6;

/// Input channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InputConfig {
    /// Transition that generates the event
    pub sense: Polarity,
    /// Pull resistor applied when the pin is configured
    pub pull: Pull,
    /// Pin is an output being monitored; it keeps driving while its input
    /// buffer stays connected
    pub is_watcher: bool,
    /// Use a GPIOTE channel (`EVENTS_IN`) instead of a port-event slot
    /// driven by the pin's `SENSE` field
    pub hi_accuracy: bool,
    /// Leave the pin configuration untouched
    pub skip_gpio_setup: bool,
}

impl InputConfig {
    const fn sense(sense: Polarity, hi_accuracy: bool) -> Self {
        Self {
            sense,
            pull: Pull::None,
            is_watcher: false,
            hi_accuracy,
            skip_gpio_setup: false,
        }
    }

    /// Event on a low-to-high transition
    pub const fn sense_lo_to_hi(hi_accuracy: bool) -> Self {
        Self::sense(Polarity::LoToHi, hi_accuracy)
    }

    /// Event on a high-to-low transition
    pub const fn sense_hi_to_lo(hi_accuracy: bool) -> Self {
        Self::sense(Polarity::HiToLo, hi_accuracy)
    }

    /// Event on any transition
    pub const fn sense_toggle(hi_accuracy: bool) -> Self {
        Self::sense(Polarity::Toggle, hi_accuracy)
    }

    /// Like [`InputConfig::sense_lo_to_hi`] without touching the pin configuration
    pub const fn raw_sense_lo_to_hi(hi_accuracy: bool) -> Self {
        Self::sense_lo_to_hi(hi_accuracy).skip_gpio_setup()
    }

    /// Like [`InputConfig::sense_hi_to_lo`] without touching the pin configuration
    pub const fn raw_sense_hi_to_lo(hi_accuracy: bool) -> Self {
        Self::sense_hi_to_lo(hi_accuracy).skip_gpio_setup()
    }

    /// Like [`InputConfig::sense_toggle`] without touching the pin configuration
    pub const fn raw_sense_toggle(hi_accuracy: bool) -> Self {
        Self::sense_toggle(hi_accuracy).skip_gpio_setup()
    }

    /// Set the pull resistor
    pub const fn with_pull(mut self, pull: Pull) -> Self {
        self.pull = pull;
        self
    }

    /// Monitor a pin that is configured as an output
    pub const fn watcher(mut self) -> Self {
        self.is_watcher = true;
        self
    }

    const fn skip_gpio_setup(mut self) -> Self {
        self.skip_gpio_setup = true;
        self
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self::sense_toggle(true)
    }
}

/// Output channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OutputConfig {
    /// Effect of `TASKS_OUT` on the pin
    pub action: Polarity,
    /// Level driven when the channel is bound
    pub init_state: Level,
    /// Drive the pin from a GPIOTE task channel
    pub task_pin: bool,
}

impl OutputConfig {
    /// GPIO-driven output without a task channel
    pub const fn simple(init_state: Level) -> Self {
        Self {
            action: Polarity::None,
            init_state,
            task_pin: false,
        }
    }

    /// Task output starting high; `TASKS_OUT` drives it low
    pub const fn task_low() -> Self {
        Self {
            action: Polarity::HiToLo,
            init_state: Level::High,
            task_pin: true,
        }
    }

    /// Task output starting low; `TASKS_OUT` drives it high
    pub const fn task_high() -> Self {
        Self {
            action: Polarity::LoToHi,
            init_state: Level::Low,
            task_pin: true,
        }
    }

    /// Task output toggled by `TASKS_OUT`
    pub const fn task_toggle(init_state: Level) -> Self {
        Self {
            action: Polarity::Toggle,
            init_state,
            task_pin: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::simple(Level::Low)
    }
}

/// GPIOTE driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GpioteConfig {
    /// Port-event slots available to low-accuracy inputs and simple
    /// outputs (capped at [`MAX_GPIO_SLOTS`])
    pub gpio_slots: u8,
    /// Interrupt priority (0 = highest, 7 = lowest)
    pub irq_priority: u8,
}

impl GpioteConfig {
    /// Number of usable slots
    pub const fn slots(&self) -> usize {
        let slots = self.gpio_slots as usize;
        if slots > MAX_GPIO_SLOTS {
            MAX_GPIO_SLOTS
        } else {
            slots
        }
    }
}

impl Default for GpioteConfig {
    fn default() -> Self {
        Self {
            gpio_slots: MAX_GPIO_SLOTS as u8,
            irq_priority: DEFAULT_IRQ_PRIORITY,
        }
    }
}

/// Memory watch configuration for one region
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WatchConfig {
    /// Display label
    pub label: String<MAX_LABEL_LEN>,
    /// Watched region
    pub region: Region,
    /// First watched address (user regions only)
    pub start: u32,
    /// Last watched address (user regions only)
    pub end: u32,
    /// Watch read accesses
    pub reads: bool,
    /// Watch write accesses
    pub writes: bool,
    /// Included sub-regions (peripheral regions only)
    pub subregions: u32,
    /// Raise the MWU interrupt on access
    pub interrupt: bool,
}

impl WatchConfig {
    /// Armed access kinds as a watch mask
    pub fn watch(&self) -> RegionWatch {
        let mut mask = RegionWatch::empty();
        if self.writes {
            mask |= RegionWatch::region(self.region, Access::Write);
        }
        if self.reads {
            mask |= RegionWatch::region(self.region, Access::Read);
        }
        mask
    }

    /// Check the address range
    ///
    /// Peripheral regions have fixed ranges and must leave `start`/`end`
    /// at zero; user regions must not end before they start.
    pub fn validate(&self) -> Result<(), MwuError> {
        if self.region.is_peripheral() {
            if self.start != 0 || self.end != 0 {
                return Err(MwuError::InvalidRegion);
            }
        } else if self.start > self.end {
            return Err(MwuError::InvalidRange);
        }
        Ok(())
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            label: String::new(),
            region: Region::User0,
            start: 0,
            end: 0,
            reads: false,
            writes: true,
            subregions: 0,
            interrupt: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_constructors() {
        let cfg = InputConfig::sense_hi_to_lo(false).with_pull(Pull::Up);
        assert_eq!(cfg.sense, Polarity::HiToLo);
        assert_eq!(cfg.pull, Pull::Up);
        assert!(!cfg.hi_accuracy);
        assert!(!cfg.skip_gpio_setup);

        let raw = InputConfig::raw_sense_toggle(true);
        assert!(raw.skip_gpio_setup);
        assert!(raw.hi_accuracy);
        assert!(InputConfig::sense_lo_to_hi(true).watcher().is_watcher);
    }

    #[test]
    fn test_output_constructors() {
        let low = OutputConfig::task_low();
        assert_eq!(low.init_state, Level::High);
        assert_eq!(low.action.apply(low.init_state), Level::Low);

        let high = OutputConfig::task_high();
        assert_eq!(high.action.apply(high.init_state), Level::High);

        assert!(!OutputConfig::simple(Level::High).task_pin);
        assert!(OutputConfig::task_toggle(Level::Low).task_pin);
    }

    #[test]
    fn test_gpio_slots_capped() {
        let cfg = GpioteConfig {
            gpio_slots: 9,
            ..GpioteConfig::default()
        };
        assert_eq!(cfg.slots(), MAX_GPIO_SLOTS);
        assert_eq!(GpioteConfig::default().slots(), 4);
    }

    #[test]
    fn test_watch_mask() {
        let cfg = WatchConfig {
            region: Region::User1,
            reads: true,
            writes: true,
            ..WatchConfig::default()
        };
        assert_eq!(
            cfg.watch(),
            RegionWatch::REGION1_WRITE | RegionWatch::REGION1_READ
        );
    }

    #[test]
    fn test_watch_validation() {
        let mut cfg = WatchConfig {
            start: 0x2000_1000,
            end: 0x2000_0000,
            ..WatchConfig::default()
        };
        assert_eq!(cfg.validate(), Err(MwuError::InvalidRange));

        cfg.end = 0x2000_1000;
        assert_eq!(cfg.validate(), Ok(()));

        cfg.region = Region::Peripheral0;
        assert_eq!(cfg.validate(), Err(MwuError::InvalidRegion));
    }
}
