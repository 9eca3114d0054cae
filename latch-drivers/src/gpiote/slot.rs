//! Channel slot arena
//!
//! Slots `0..CHANNEL_COUNT` are the hardware GPIOTE channels; the slots
//! after them are port-event slots used by low-accuracy inputs and by
//! outputs without a task.

use latch_core::config::{InputConfig, OutputConfig, MAX_GPIO_SLOTS};
use latch_core::state::{ChannelState, Direction};
use latch_hal::gpiote::CHANNEL_COUNT;
use latch_hal::{Channel, Level, Pin, Polarity};

/// Total number of slots
pub const SLOT_COUNT: usize = CHANNEL_COUNT + MAX_GPIO_SLOTS;

/// Callback invoked from [`super::Gpiote::handle_interrupt`]
pub type EventHandler = fn(ChannelHandle, Pin, Polarity);

/// Identifies a bound channel
///
/// Carries a generation counter so a handle kept after
/// [`super::Gpiote::uninit`] cannot reach the next binding of the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelHandle {
    slot: u8,
    generation: u16,
}

impl ChannelHandle {
    pub(crate) const fn new(slot: usize, generation: u16) -> Self {
        Self {
            slot: slot as u8,
            generation,
        }
    }

    /// Slot index (the dispatch table key)
    pub const fn index(self) -> usize {
        self.slot as usize
    }

    /// Hardware GPIOTE channel, `None` for port-event slots
    pub const fn channel(self) -> Option<Channel> {
        Channel::new(self.slot)
    }

    /// Check if the handle refers to a port-event slot
    pub const fn is_port_slot(self) -> bool {
        self.index() >= CHANNEL_COUNT
    }

    pub(crate) const fn generation(self) -> u16 {
        self.generation
    }
}

/// What a slot was bound as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    Input(InputConfig),
    Output(OutputConfig),
}

impl Role {
    pub(crate) fn direction(&self) -> Direction {
        match self {
            Role::Input(_) => Direction::Input,
            Role::Output(_) => Direction::Output,
        }
    }

    /// Pin configuration belongs to someone else and survives release
    pub(crate) fn keeps_pin_config(&self) -> bool {
        matches!(self, Role::Input(cfg) if cfg.skip_gpio_setup || cfg.is_watcher)
    }
}

/// Pin binding of an occupied slot
#[derive(Clone, Copy)]
pub(crate) struct Binding {
    pub pin: Pin,
    pub role: Role,
    pub handler: Option<EventHandler>,
    /// Last level driven on an output
    pub level: Level,
    /// Software event latch of a port-event input
    pub latched: bool,
}

impl Binding {
    pub(crate) fn input(&self) -> Option<&InputConfig> {
        match &self.role {
            Role::Input(cfg) => Some(cfg),
            Role::Output(_) => None,
        }
    }

    pub(crate) fn output(&self) -> Option<&OutputConfig> {
        match &self.role {
            Role::Output(cfg) => Some(cfg),
            Role::Input(_) => None,
        }
    }
}

/// One entry of the arena
#[derive(Clone, Copy, Default)]
pub(crate) struct Slot {
    pub state: ChannelState,
    pub generation: u16,
    pub binding: Option<Binding>,
    /// Generations used up; the slot is never handed out again
    pub retired: bool,
}

impl Slot {
    pub(crate) fn is_free(&self) -> bool {
        self.binding.is_none() && !self.retired
    }

    /// Move to the next generation after a release
    ///
    /// A wrapped counter would make old handles valid again, so the last
    /// generation retires the slot instead.
    pub(crate) fn next_generation(&mut self) {
        match self.generation.checked_add(1) {
            Some(next) => self.generation = next,
            None => self.retired = true,
        }
    }
}
