//! GPIO Tasks and Events

use latch_hal::{Channel, ChannelConfig, GpioteHal, GpioteInterrupts};
use nrf52840_pac::gpiote::RegisterBlock;

use crate::mmio::{clear_event, write_bits, Regs};

/// GPIOTE register block
#[derive(Debug)]
pub struct Gpiote {
    regs: Regs<RegisterBlock>,
}

impl Gpiote {
    /// Create a handle for the GPIOTE register block at `ptr`
    ///
    /// # Safety
    ///
    /// `ptr` must point to a GPIOTE register block and the handle must be
    /// the only one in use for it.
    pub unsafe fn from_ptr(ptr: *const RegisterBlock) -> Self {
        Self {
            regs: Regs::new(ptr),
        }
    }
}

impl GpioteHal for Gpiote {
    fn base_address(&self) -> usize {
        self.regs.addr()
    }

    fn trigger_out(&mut self, channel: Channel) {
        write_bits!(self.regs.tasks_out[channel.index()], 1);
    }

    fn trigger_set(&mut self, channel: Channel) {
        write_bits!(self.regs.tasks_set[channel.index()], 1);
    }

    fn trigger_clr(&mut self, channel: Channel) {
        write_bits!(self.regs.tasks_clr[channel.index()], 1);
    }

    fn event_in(&self, channel: Channel) -> bool {
        self.regs.events_in[channel.index()].read().bits() != 0
    }

    fn clear_event_in(&mut self, channel: Channel) {
        clear_event!(self.regs.events_in[channel.index()]);
    }

    fn event_port(&self) -> bool {
        self.regs.events_port.read().bits() != 0
    }

    fn clear_event_port(&mut self) {
        clear_event!(self.regs.events_port);
    }

    fn int_enable(&mut self, mask: GpioteInterrupts) {
        write_bits!(self.regs.intenset, mask.bits());
    }

    fn int_disable(&mut self, mask: GpioteInterrupts) {
        write_bits!(self.regs.intenclr, mask.bits());
    }

    fn int_enabled(&self) -> GpioteInterrupts {
        // Reading INTENSET returns the enabled set
        GpioteInterrupts::from_bits_truncate(self.regs.intenset.read().bits())
    }

    fn config(&self, channel: Channel) -> ChannelConfig {
        ChannelConfig::from_bits(self.regs.config[channel.index()].read().bits())
    }

    fn set_config(&mut self, channel: Channel, config: ChannelConfig) {
        write_bits!(self.regs.config[channel.index()], config.to_bits());
    }
}
