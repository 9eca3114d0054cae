//! GPIOTE driver
//!
//! Binds pins to input event channels and output task channels. Every
//! binding lives in a fixed slot arena and follows the channel lifecycle in
//! [`latch_core::state`]:
//!
//! - High-accuracy inputs and task outputs take one of the 8 hardware
//!   channels.
//! - Low-accuracy inputs and outputs without a task take a port-event slot.
//!   Low-accuracy inputs arm the pin's `SENSE` field and share
//!   `EVENTS_PORT`; the driver keeps a software latch per slot.
//!
//! Handlers are plain function pointers stored in the dispatch table and
//! called from [`Gpiote::handle_interrupt`].

mod slot;

use heapless::Vec;
use latch_core::config::{GpioteConfig, InputConfig, OutputConfig};
use latch_core::pins::PinAllocator;
use latch_core::state::{ChannelEvent, ChannelState, Direction};
use latch_core::GpioteError;
use latch_hal::gpiote::{Mode, CHANNEL_COUNT};
use latch_hal::{
    Channel, ChannelConfig, GpioHal, GpioteHal, GpioteInterrupts, Level, Pin, Polarity, Sense,
};

use slot::{Binding, Role, Slot};
pub use slot::{ChannelHandle, EventHandler, SLOT_COUNT};

/// Channels that fired during one interrupt
pub type Fired = Vec<ChannelHandle, SLOT_COUNT>;

/// Scans of the port-event inputs per `EVENTS_PORT`
///
/// A second scan picks up pins that changed while the first one re-armed
/// their neighbours.
const PORT_SCAN_PASSES: usize = 2;

/// GPIOTE driver
pub struct Gpiote<T, G> {
    gpiote: T,
    gpio: G,
    config: GpioteConfig,
    initialized: bool,
    slots: [Slot; SLOT_COUNT],
    pins: PinAllocator,
}

impl<T: GpioteHal, G: GpioHal> Gpiote<T, G> {
    /// Create an uninitialized driver
    pub fn new(gpiote: T, gpio: G, config: GpioteConfig) -> Self {
        Self {
            gpiote,
            gpio,
            config,
            initialized: false,
            slots: [Slot::default(); SLOT_COUNT],
            pins: PinAllocator::new(),
        }
    }

    /// Driver configuration
    pub fn config(&self) -> &GpioteConfig {
        &self.config
    }

    /// Access the GPIOTE register layer
    pub fn gpiote(&self) -> &T {
        &self.gpiote
    }

    /// Mutable access to the GPIOTE register layer
    pub fn gpiote_mut(&mut self) -> &mut T {
        &mut self.gpiote
    }

    /// Access the GPIO register layer
    pub fn gpio(&self) -> &G {
        &self.gpio
    }

    /// Mutable access to the GPIO register layer
    pub fn gpio_mut(&mut self) -> &mut G {
        &mut self.gpio
    }

    /// Consume the driver and return the register layers
    pub fn release(self) -> (T, G) {
        (self.gpiote, self.gpio)
    }

    /// Initialize the driver: clear every event and disable interrupts
    pub fn init(&mut self) -> Result<(), GpioteError> {
        if self.initialized {
            return Err(GpioteError::InvalidState);
        }

        self.gpiote.int_disable(GpioteInterrupts::all());
        for channel in Channel::all() {
            self.gpiote.clear_event_in(channel);
        }
        self.gpiote.clear_event_port();

        for slot in self.slots.iter_mut() {
            slot.state = ChannelState::Uninit;
            slot.binding = None;
        }
        self.pins.clear();
        self.initialized = true;

        debug!("gpiote: init, {=usize} port slots", self.config.slots());
        Ok(())
    }

    /// Release every channel and disable interrupts; no-op when not initialized
    pub fn uninit_all(&mut self) {
        if !self.initialized {
            return;
        }
        for index in 0..SLOT_COUNT {
            self.release_slot(index);
        }
        self.gpiote.int_disable(GpioteInterrupts::all());
        self.initialized = false;
        debug!("gpiote: uninit");
    }

    /// Check if the driver is initialized
    pub fn is_init(&self) -> bool {
        self.initialized
    }

    /// Lifecycle state of a channel; `Uninit` for released handles
    pub fn state(&self, handle: ChannelHandle) -> ChannelState {
        self.bound(handle)
            .map(|(index, _)| self.slots[index].state)
            .unwrap_or_default()
    }

    /// Pin bound to a channel
    pub fn pin(&self, handle: ChannelHandle) -> Option<Pin> {
        self.bound(handle).ok().map(|(_, binding)| binding.pin)
    }

    /// Direction a channel was bound with
    pub fn direction(&self, handle: ChannelHandle) -> Option<Direction> {
        self.bound(handle)
            .ok()
            .map(|(_, binding)| binding.role.direction())
    }

    /// Check if a pin is owned by any channel
    pub fn is_pin_bound(&self, pin: Pin) -> bool {
        self.pins.is_allocated(pin)
    }

    /// Bind an input channel
    ///
    /// The event stays off until [`Gpiote::in_event_enable`]. With a handler
    /// the channel is serviced by [`Gpiote::handle_interrupt`]; without one
    /// its event can only be polled.
    pub fn in_init(
        &mut self,
        pin: Pin,
        config: InputConfig,
        handler: Option<EventHandler>,
    ) -> Result<ChannelHandle, GpioteError> {
        self.ensure_init()?;
        if self.pins.is_allocated(pin) {
            return Err(GpioteError::PinAlreadyBound);
        }
        let index = self.free_slot(config.hi_accuracy)?;
        let state = self.slots[index].state.transition(ChannelEvent::Bind)?;
        self.pins.allocate(pin)?;

        if !config.skip_gpio_setup {
            if config.is_watcher {
                self.gpio.connect_input(pin);
            } else {
                self.gpio.configure_input(pin, config.pull);
            }
        }
        if let Some(channel) = Channel::new(index as u8) {
            self.gpiote.set_config(
                channel,
                ChannelConfig {
                    mode: Mode::Disabled,
                    pin,
                    polarity: config.sense,
                    outinit: Level::Low,
                },
            );
            self.gpiote.clear_event_in(channel);
        }

        debug!("gpiote: input on pin {=u8} in slot {=usize}", pin.number(), index);
        Ok(self.occupy(index, state, pin, Role::Input(config), handler, Level::Low))
    }

    /// Start generating events for an input channel
    pub fn in_event_enable(&mut self, handle: ChannelHandle) -> Result<(), GpioteError> {
        let (index, binding, config) = self.input(handle)?;
        let next = self.slots[index].state.transition(ChannelEvent::Enable)?;
        self.slots[index].state = next;

        match Channel::new(index as u8) {
            Some(channel) => {
                self.gpiote.set_config(
                    channel,
                    ChannelConfig {
                        mode: Mode::Event,
                        pin: binding.pin,
                        polarity: config.sense,
                        outinit: Level::Low,
                    },
                );
                self.gpiote.clear_event_in(channel);
                if binding.handler.is_some() {
                    self.gpiote.int_enable(GpioteInterrupts::channel(channel));
                }
            }
            None => {
                let sense = match config.sense {
                    Polarity::LoToHi => Sense::High,
                    Polarity::HiToLo => Sense::Low,
                    Polarity::Toggle if self.gpio.read(binding.pin).is_high() => Sense::Low,
                    Polarity::Toggle => Sense::High,
                    Polarity::None => Sense::Disabled,
                };
                self.gpio.set_sense(binding.pin, sense);
                self.set_latch(index, false);
                self.update_port_interrupt();
            }
        }
        Ok(())
    }

    /// Stop generating events for an input channel
    pub fn in_event_disable(&mut self, handle: ChannelHandle) -> Result<(), GpioteError> {
        let (index, binding, config) = self.input(handle)?;
        let next = self.slots[index].state.transition(ChannelEvent::Disable)?;
        self.slots[index].state = next;

        match Channel::new(index as u8) {
            Some(channel) => {
                self.gpiote.int_disable(GpioteInterrupts::channel(channel));
                self.gpiote.set_config(
                    channel,
                    ChannelConfig {
                        mode: Mode::Disabled,
                        pin: binding.pin,
                        polarity: config.sense,
                        outinit: Level::Low,
                    },
                );
            }
            None => {
                self.gpio.set_sense(binding.pin, Sense::Disabled);
                self.update_port_interrupt();
            }
        }
        Ok(())
    }

    /// Current input level of the bound pin
    pub fn in_is_set(&self, handle: ChannelHandle) -> Result<bool, GpioteError> {
        let (_, binding) = self.bound(handle)?;
        Ok(self.gpio.read(binding.pin).is_high())
    }

    /// Check the event latch of an input channel
    pub fn in_event_check(&self, handle: ChannelHandle) -> Result<bool, GpioteError> {
        let (index, binding, _) = self.input(handle)?;
        Ok(match Channel::new(index as u8) {
            Some(channel) => self.gpiote.event_in(channel),
            None => binding.latched,
        })
    }

    /// Clear the event latch of an input channel
    pub fn in_event_clear(&mut self, handle: ChannelHandle) -> Result<(), GpioteError> {
        let (index, _, _) = self.input(handle)?;
        match Channel::new(index as u8) {
            Some(channel) => self.gpiote.clear_event_in(channel),
            None => self.set_latch(index, false),
        }
        Ok(())
    }

    /// Address of the event register of an input channel (for PPI)
    ///
    /// Port-event inputs share `EVENTS_PORT`.
    pub fn in_event_address(&self, handle: ChannelHandle) -> Result<usize, GpioteError> {
        let (index, _, _) = self.input(handle)?;
        Ok(match Channel::new(index as u8) {
            Some(channel) => self.gpiote.in_event_address(channel),
            None => self.gpiote.port_event_address(),
        })
    }

    /// Bind an output channel
    ///
    /// The pin is driven to `init_state` immediately. A task output stays
    /// under GPIO control until [`Gpiote::out_task_enable`].
    pub fn out_init(&mut self, pin: Pin, config: OutputConfig) -> Result<ChannelHandle, GpioteError> {
        self.ensure_init()?;
        if self.pins.is_allocated(pin) {
            return Err(GpioteError::PinAlreadyBound);
        }
        let index = self.free_slot(config.task_pin)?;
        let state = self.slots[index].state.transition(ChannelEvent::Bind)?;
        self.pins.allocate(pin)?;

        self.gpio.configure_output(pin, config.init_state, false);
        if let Some(channel) = Channel::new(index as u8) {
            self.gpiote.set_config(
                channel,
                ChannelConfig {
                    mode: Mode::Disabled,
                    pin,
                    polarity: config.action,
                    outinit: config.init_state,
                },
            );
        }

        debug!("gpiote: output on pin {=u8} in slot {=usize}", pin.number(), index);
        Ok(self.occupy(index, state, pin, Role::Output(config), None, config.init_state))
    }

    /// Hand the pin to its GPIOTE task channel
    pub fn out_task_enable(&mut self, handle: ChannelHandle) -> Result<(), GpioteError> {
        let (index, channel, binding, config) = self.task(handle)?;
        let next = self.slots[index].state.transition(ChannelEvent::Enable)?;
        self.slots[index].state = next;

        // Start from the level GPIO drives so the pin does not glitch
        self.gpiote.set_config(
            channel,
            ChannelConfig {
                mode: Mode::Task,
                pin: binding.pin,
                polarity: config.action,
                outinit: binding.level,
            },
        );
        Ok(())
    }

    /// Return the pin to GPIO control at the last driven level
    pub fn out_task_disable(&mut self, handle: ChannelHandle) -> Result<(), GpioteError> {
        let (index, channel, binding, config) = self.task(handle)?;
        let next = self.slots[index].state.transition(ChannelEvent::Disable)?;
        self.slots[index].state = next;

        self.gpio.write(binding.pin, binding.level);
        self.gpiote.set_config(
            channel,
            ChannelConfig {
                mode: Mode::Disabled,
                pin: binding.pin,
                polarity: config.action,
                outinit: binding.level,
            },
        );
        Ok(())
    }

    /// Trigger `TASKS_OUT`
    pub fn out_task_trigger(&mut self, handle: ChannelHandle) -> Result<(), GpioteError> {
        let (index, channel, binding, config) = self.enabled_task(handle)?;
        self.gpiote.trigger_out(channel);
        self.set_level(index, config.action.apply(binding.level));
        Ok(())
    }

    /// Force the task-controlled pin to `level`
    pub fn out_task_force(&mut self, handle: ChannelHandle, level: Level) -> Result<(), GpioteError> {
        let (index, channel, binding, config) = self.enabled_task(handle)?;
        self.gpiote.set_config(
            channel,
            ChannelConfig {
                mode: Mode::Task,
                pin: binding.pin,
                polarity: config.action,
                outinit: level,
            },
        );
        self.set_level(index, level);
        Ok(())
    }

    /// Invert the task-controlled pin through a hardware task
    ///
    /// Uses `TASKS_OUT` for toggle channels and `TASKS_SET`/`TASKS_CLR`
    /// otherwise.
    pub fn out_task_toggle(&mut self, handle: ChannelHandle) -> Result<(), GpioteError> {
        let (index, channel, binding, config) = self.enabled_task(handle)?;
        let level = binding.level.toggled();
        match (config.action, level) {
            (Polarity::Toggle, _) => self.gpiote.trigger_out(channel),
            (_, Level::High) => self.gpiote.trigger_set(channel),
            (_, Level::Low) => self.gpiote.trigger_clr(channel),
        }
        self.set_level(index, level);
        Ok(())
    }

    /// Trigger `TASKS_SET`
    pub fn set_task_trigger(&mut self, handle: ChannelHandle) -> Result<(), GpioteError> {
        let (index, channel, _, _) = self.enabled_task(handle)?;
        self.gpiote.trigger_set(channel);
        self.set_level(index, Level::High);
        Ok(())
    }

    /// Trigger `TASKS_CLR`
    pub fn clr_task_trigger(&mut self, handle: ChannelHandle) -> Result<(), GpioteError> {
        let (index, channel, _, _) = self.enabled_task(handle)?;
        self.gpiote.trigger_clr(channel);
        self.set_level(index, Level::Low);
        Ok(())
    }

    /// Drive the output high through GPIO
    pub fn out_set(&mut self, handle: ChannelHandle) -> Result<(), GpioteError> {
        let (index, binding) = self.gpio_output(handle)?;
        self.gpio.set_high(binding.pin);
        self.set_level(index, Level::High);
        Ok(())
    }

    /// Drive the output low through GPIO
    pub fn out_clear(&mut self, handle: ChannelHandle) -> Result<(), GpioteError> {
        let (index, binding) = self.gpio_output(handle)?;
        self.gpio.set_low(binding.pin);
        self.set_level(index, Level::Low);
        Ok(())
    }

    /// Invert the output through GPIO
    pub fn out_toggle(&mut self, handle: ChannelHandle) -> Result<(), GpioteError> {
        let (index, binding) = self.gpio_output(handle)?;
        self.gpio.toggle(binding.pin);
        self.set_level(index, binding.level.toggled());
        Ok(())
    }

    /// Address of `TASKS_OUT` of a task output (for PPI)
    pub fn out_task_address(&self, handle: ChannelHandle) -> Result<usize, GpioteError> {
        let (_, channel, _, _) = self.task(handle)?;
        Ok(self.gpiote.out_task_address(channel))
    }

    /// Address of `TASKS_SET` of a task output (for PPI)
    pub fn set_task_address(&self, handle: ChannelHandle) -> Result<usize, GpioteError> {
        let (_, channel, _, _) = self.task(handle)?;
        Ok(self.gpiote.set_task_address(channel))
    }

    /// Address of `TASKS_CLR` of a task output (for PPI)
    pub fn clr_task_address(&self, handle: ChannelHandle) -> Result<usize, GpioteError> {
        let (_, channel, _, _) = self.task(handle)?;
        Ok(self.gpiote.clr_task_address(channel))
    }

    /// Release a channel and its pin; idempotent
    ///
    /// The pin returns to its reset configuration unless it was bound with
    /// `skip_gpio_setup` or as a watcher.
    pub fn uninit(&mut self, handle: ChannelHandle) -> Result<(), GpioteError> {
        self.ensure_init()?;
        if self.bound(handle).is_ok() {
            self.release_slot(handle.index());
        }
        Ok(())
    }

    /// Service the GPIOTE interrupt
    ///
    /// Clears the latched events of channels whose interrupt is enabled,
    /// latches port-event detections, calls the registered handlers and
    /// returns the channels that fired.
    pub fn handle_interrupt(&mut self) -> Fired {
        let mut fired = Fired::new();
        if !self.initialized {
            return fired;
        }

        let enabled = self.gpiote.int_enabled();
        for channel in Channel::all() {
            if !enabled.contains(GpioteInterrupts::channel(channel)) || !self.gpiote.event_in(channel) {
                continue;
            }
            self.gpiote.clear_event_in(channel);

            let index = channel.index();
            let slot = self.slots[index];
            let Some(binding) = slot.binding else {
                warn!("gpiote: event on unbound channel {=usize}", index);
                continue;
            };
            if !slot.state.is_enabled() {
                continue;
            }
            let polarity = binding.input().map(|cfg| cfg.sense).unwrap_or_default();
            let handle = ChannelHandle::new(index, slot.generation);
            Self::dispatch(&mut fired, handle, &binding, polarity);
        }

        if enabled.contains(GpioteInterrupts::PORT) && self.gpiote.event_port() {
            self.gpiote.clear_event_port();
            self.scan_port(&mut fired);
        }

        fired
    }

    fn scan_port(&mut self, fired: &mut Fired) {
        for _ in 0..PORT_SCAN_PASSES {
            let mut detected = false;

            for index in CHANNEL_COUNT..SLOT_COUNT {
                let slot = self.slots[index];
                let Some(binding) = slot.binding else {
                    continue;
                };
                let Some(config) = binding.input().copied() else {
                    continue;
                };
                if !slot.state.is_enabled() {
                    continue;
                }

                let sense = self.gpio.sense(binding.pin);
                if !sense.matches(self.gpio.read(binding.pin)) {
                    continue;
                }
                detected = true;

                // Wait for the opposite level next; this also releases DETECT
                let rearm = if sense == Sense::High {
                    Sense::Low
                } else {
                    Sense::High
                };
                self.gpio.set_sense(binding.pin, rearm);

                let wanted = match config.sense {
                    Polarity::Toggle => true,
                    Polarity::LoToHi => sense == Sense::High,
                    Polarity::HiToLo => sense == Sense::Low,
                    Polarity::None => false,
                };
                if wanted {
                    self.set_latch(index, true);
                    let handle = ChannelHandle::new(index, slot.generation);
                    trace!("gpiote: port event on pin {=u8}", binding.pin.number());
                    Self::dispatch(fired, handle, &binding, config.sense);
                }
            }

            if !detected {
                break;
            }
        }
    }

    fn dispatch(fired: &mut Fired, handle: ChannelHandle, binding: &Binding, polarity: Polarity) {
        if !fired.contains(&handle) {
            // Capacity matches the number of slots
            let _ = fired.push(handle);
        }
        if let Some(handler) = binding.handler {
            handler(handle, binding.pin, polarity);
        }
    }

    fn ensure_init(&self) -> Result<(), GpioteError> {
        if self.initialized {
            Ok(())
        } else {
            Err(GpioteError::InvalidState)
        }
    }

    fn free_slot(&self, hardware: bool) -> Result<usize, GpioteError> {
        let range = if hardware {
            0..CHANNEL_COUNT
        } else {
            CHANNEL_COUNT..CHANNEL_COUNT + self.config.slots()
        };
        let found = range.into_iter().find(|&index| self.slots[index].is_free());
        if found.is_none() {
            warn!("gpiote: pool exhausted (hardware: {=bool})", hardware);
        }
        found.ok_or(GpioteError::NoChannelAvailable)
    }

    fn occupy(
        &mut self,
        index: usize,
        state: ChannelState,
        pin: Pin,
        role: Role,
        handler: Option<EventHandler>,
        level: Level,
    ) -> ChannelHandle {
        let slot = &mut self.slots[index];
        slot.state = state;
        slot.binding = Some(Binding {
            pin,
            role,
            handler,
            level,
            latched: false,
        });
        ChannelHandle::new(index, slot.generation)
    }

    fn release_slot(&mut self, index: usize) {
        let Some(binding) = self.slots[index].binding else {
            return;
        };

        match Channel::new(index as u8) {
            Some(channel) => {
                self.gpiote.int_disable(GpioteInterrupts::channel(channel));
                self.gpiote
                    .set_config(channel, ChannelConfig::disabled(binding.pin));
                self.gpiote.clear_event_in(channel);
            }
            None => {
                if binding.input().is_some() {
                    self.gpio.set_sense(binding.pin, Sense::Disabled);
                }
            }
        }
        if !binding.role.keeps_pin_config() {
            self.gpio.disconnect(binding.pin);
        }
        self.pins.release(binding.pin);

        let slot = &mut self.slots[index];
        slot.state = slot
            .state
            .transition(ChannelEvent::Release)
            .unwrap_or_default();
        slot.binding = None;
        slot.next_generation();
        if slot.retired {
            warn!("gpiote: slot {=usize} retired", index);
        }

        self.update_port_interrupt();
        debug!("gpiote: released pin {=u8}", binding.pin.number());
    }

    /// Slot index and binding of a live handle
    fn bound(&self, handle: ChannelHandle) -> Result<(usize, Binding), GpioteError> {
        self.ensure_init()?;
        let slot = self
            .slots
            .get(handle.index())
            .ok_or(GpioteError::InvalidState)?;
        match slot.binding {
            Some(binding) if slot.generation == handle.generation() => Ok((handle.index(), binding)),
            _ => Err(GpioteError::InvalidState),
        }
    }

    fn input(&self, handle: ChannelHandle) -> Result<(usize, Binding, InputConfig), GpioteError> {
        let (index, binding) = self.bound(handle)?;
        let config = *binding.input().ok_or(GpioteError::InvalidState)?;
        Ok((index, binding, config))
    }

    fn task(
        &self,
        handle: ChannelHandle,
    ) -> Result<(usize, Channel, Binding, OutputConfig), GpioteError> {
        let (index, binding) = self.bound(handle)?;
        let config = *binding.output().ok_or(GpioteError::InvalidState)?;
        if !config.task_pin {
            return Err(GpioteError::InvalidState);
        }
        let channel = Channel::new(index as u8).ok_or(GpioteError::InvalidState)?;
        Ok((index, channel, binding, config))
    }

    fn enabled_task(
        &self,
        handle: ChannelHandle,
    ) -> Result<(usize, Channel, Binding, OutputConfig), GpioteError> {
        let task = self.task(handle)?;
        if self.slots[task.0].state.is_enabled() {
            Ok(task)
        } else {
            Err(GpioteError::InvalidState)
        }
    }

    /// An output currently driven by GPIO
    fn gpio_output(&self, handle: ChannelHandle) -> Result<(usize, Binding), GpioteError> {
        let (index, binding) = self.bound(handle)?;
        let config = binding.output().ok_or(GpioteError::InvalidState)?;
        if config.task_pin && self.slots[index].state.is_enabled() {
            return Err(GpioteError::InvalidState);
        }
        Ok((index, binding))
    }

    fn set_level(&mut self, index: usize, level: Level) {
        if let Some(binding) = self.slots[index].binding.as_mut() {
            binding.level = level;
        }
    }

    fn set_latch(&mut self, index: usize, latched: bool) {
        if let Some(binding) = self.slots[index].binding.as_mut() {
            binding.latched = latched;
        }
    }

    /// Keep the PORT interrupt on while any port-event input is enabled
    fn update_port_interrupt(&mut self) {
        let active = self.slots[CHANNEL_COUNT..].iter().any(|slot| {
            slot.state.is_enabled()
                && slot
                    .binding
                    .as_ref()
                    .is_some_and(|binding| binding.input().is_some())
        });
        if active {
            self.gpiote.int_enable(GpioteInterrupts::PORT);
        } else {
            self.gpiote.int_disable(GpioteInterrupts::PORT);
        }
    }
}
