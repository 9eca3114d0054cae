//! Board-level configuration
//!
//! Built by the firmware from the constants generated out of `board.toml`.

use heapless::{String, Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use latch_hal::mwu::REGION_COUNT;

use super::types::{GpioteConfig, WatchConfig, MAX_LABEL_LEN};
use crate::error::{Error, MwuError};
use crate::pins::PinAllocator;

/// Maximum watches per board (one per region)
pub const MAX_WATCHES: usize = REGION_COUNT;

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// Absolute pin number (0-47)
    pub pin: u8,
    /// Pin is active-low
    pub inverted: bool,
    /// Enable internal pull-up
    pub pull_up: bool,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: false,
        }
    }

    /// Create an active-low pin with pull-up, the usual button wiring
    pub const fn active_low_pullup(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: true,
        }
    }

    /// Create an inverted (active-low) pin
    pub const fn inverted(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: false,
        }
    }
}

/// Complete board configuration
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardConfig {
    /// Board name
    pub name: String<MAX_LABEL_LEN>,
    /// Button input (event on press)
    pub button: Option<PinConfig>,
    /// LED output (toggled by a GPIOTE task)
    pub led: Option<PinConfig>,
    /// GPIOTE driver settings
    pub gpiote: GpioteConfig,
    /// Memory watches
    pub watches: Vec<WatchConfig, MAX_WATCHES>,
}

impl BoardConfig {
    /// Check pins and watches
    ///
    /// Pins must exist and be distinct; every watch must be valid and no
    /// region may be watched twice.
    pub fn validate(&self) -> Result<(), Error> {
        let mut pins = PinAllocator::new();
        for pin in [self.button, self.led].into_iter().flatten() {
            pins.allocate_number(pin.pin)?;
        }

        let mut seen = [false; REGION_COUNT];
        for watch in &self.watches {
            watch.validate()?;
            let index = watch.region.index();
            if seen[index] {
                return Err(MwuError::InvalidRegion.into());
            }
            seen[index] = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GpioteError;
    use latch_hal::Region;

    fn board() -> BoardConfig {
        BoardConfig {
            button: Some(PinConfig::active_low_pullup(11)),
            led: Some(PinConfig::inverted(13)),
            ..BoardConfig::default()
        }
    }

    #[test]
    fn test_pin_constructors() {
        const BUTTON: PinConfig = PinConfig::active_low_pullup(11);
        assert_eq!((BUTTON.pin, BUTTON.inverted, BUTTON.pull_up), (11, true, true));

        let led = PinConfig::inverted(13);
        assert_eq!((led.inverted, led.pull_up), (true, false));

        let plain = PinConfig::new(47);
        assert_eq!(plain, PinConfig { pin: 47, ..PinConfig::default() });

        let pulled = PinConfig {
            pull_up: true,
            ..PinConfig::new(3)
        };
        assert!(!pulled.inverted);
    }

    #[test]
    fn test_valid_board() {
        let mut cfg = board();
        cfg.watches
            .push(WatchConfig {
                region: Region::User0,
                start: 0x2003_0000,
                end: 0x2003_00FF,
                ..WatchConfig::default()
            })
            .unwrap();
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn test_shared_pin_rejected() {
        let mut cfg = board();
        cfg.led = Some(PinConfig::new(11));
        assert_eq!(
            cfg.validate(),
            Err(Error::Gpiote(GpioteError::PinAlreadyBound))
        );
    }

    #[test]
    fn test_missing_pin_rejected() {
        let mut cfg = board();
        cfg.button = Some(PinConfig::new(48));
        assert_eq!(cfg.validate(), Err(Error::Gpiote(GpioteError::InvalidPin)));
    }

    #[test]
    fn test_region_watched_twice() {
        let mut cfg = board();
        let watch = WatchConfig {
            region: Region::User3,
            ..WatchConfig::default()
        };
        cfg.watches.push(watch.clone()).unwrap();
        cfg.watches.push(watch).unwrap();
        assert_eq!(cfg.validate(), Err(Error::Mwu(MwuError::InvalidRegion)));
    }
}
