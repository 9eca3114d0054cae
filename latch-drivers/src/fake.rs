//! Fake register blocks for host tests
//!
//! Each fake keeps the decoded register state and applies the hardware's
//! set/clear semantics, so driver tests can assert on what the peripheral
//! would end up doing.

use latch_hal::gpio::PIN_COUNT;
use latch_hal::gpiote::CHANNEL_COUNT;
use latch_hal::mwu::REGION_COUNT;
use latch_hal::{
    Access, Channel, ChannelConfig, GpioHal, GpioteHal, GpioteInterrupts, Level, MwuEvent, MwuHal,
    MwuInterrupts, Pin, Pull, Region, RegionWatch, Sense,
};

pub const MWU_BASE: usize = 0x4002_0000;
pub const GPIOTE_BASE: usize = 0x4000_6000;

/// Memory Watch Unit
#[derive(Debug, Default)]
pub struct FakeMwu {
    pub events: [bool; MwuEvent::COUNT],
    pub inten: u32,
    pub nmien: u32,
    pub regionen: u32,
    pub ranges: [(u32, u32); REGION_COUNT],
    pub subs: [u32; 2],
    pub substat_ra: [u32; 2],
    pub substat_wa: [u32; 2],
}

impl FakeMwu {
    /// Simulate a watched access hitting a region
    pub fn access(&mut self, region: Region, access: Access) {
        if self.regionen & region.bits(access) != 0 {
            self.events[MwuEvent::new(region, access).index()] = true;
        }
    }

    /// Simulate an access to a peripheral sub-region
    pub fn access_subregion(&mut self, region: Region, access: Access, subregion: u32) {
        let bit = 1 << subregion;
        let n = region.hw_index();
        if self.subs[n] & bit == 0 {
            return;
        }
        match access {
            Access::Read => self.substat_ra[n] |= bit,
            Access::Write => self.substat_wa[n] |= bit,
        }
        self.access(region, access);
    }
}

impl MwuHal for FakeMwu {
    fn base_address(&self) -> usize {
        MWU_BASE
    }

    fn event_check(&self, event: MwuEvent) -> bool {
        self.events[event.index()]
    }

    fn event_clear(&mut self, event: MwuEvent) {
        self.events[event.index()] = false;
    }

    fn int_enable(&mut self, mask: MwuInterrupts) {
        self.inten |= mask.bits();
    }

    fn int_disable(&mut self, mask: MwuInterrupts) {
        self.inten &= !mask.bits();
    }

    fn int_enabled(&self) -> MwuInterrupts {
        MwuInterrupts::from_bits_truncate(self.inten)
    }

    fn nmi_enable(&mut self, mask: MwuInterrupts) {
        self.nmien |= mask.bits();
    }

    fn nmi_disable(&mut self, mask: MwuInterrupts) {
        self.nmien &= !mask.bits();
    }

    fn nmi_enabled(&self) -> MwuInterrupts {
        MwuInterrupts::from_bits_truncate(self.nmien)
    }

    fn region_watch_enable(&mut self, mask: RegionWatch) {
        self.regionen |= mask.bits();
    }

    fn region_watch_disable(&mut self, mask: RegionWatch) {
        self.regionen &= !mask.bits();
    }

    fn region_watch(&self) -> RegionWatch {
        RegionWatch::from_bits_truncate(self.regionen)
    }

    fn set_region_range(&mut self, region: Region, start: u32, end: u32) {
        if region.is_user() {
            self.ranges[region.index()] = (start, end);
        }
    }

    fn region_range(&self, region: Region) -> (u32, u32) {
        self.ranges[region.index()]
    }

    fn subregions_configure(&mut self, region: Region, mask: u32) {
        if region.is_peripheral() {
            self.subs[region.hw_index()] = mask;
        }
    }

    fn subregions(&self, region: Region) -> u32 {
        if region.is_peripheral() {
            self.subs[region.hw_index()]
        } else {
            0
        }
    }

    fn subregion_read_accesses(&self, region: Region) -> u32 {
        if region.is_peripheral() {
            self.substat_ra[region.hw_index()]
        } else {
            0
        }
    }

    fn subregion_read_accesses_clear(&mut self, region: Region, mask: u32) {
        if region.is_peripheral() {
            self.substat_ra[region.hw_index()] &= !mask;
        }
    }

    fn subregion_write_accesses(&self, region: Region) -> u32 {
        if region.is_peripheral() {
            self.substat_wa[region.hw_index()]
        } else {
            0
        }
    }

    fn subregion_write_accesses_clear(&mut self, region: Region, mask: u32) {
        if region.is_peripheral() {
            self.substat_wa[region.hw_index()] &= !mask;
        }
    }
}

/// Task trigger counters of one GPIOTE channel
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskCounts {
    pub out: u32,
    pub set: u32,
    pub clr: u32,
}

/// GPIOTE
#[derive(Debug, Default)]
pub struct FakeGpiote {
    pub configs: [u32; CHANNEL_COUNT],
    pub events_in: [bool; CHANNEL_COUNT],
    pub event_port: bool,
    pub inten: u32,
    pub tasks: [TaskCounts; CHANNEL_COUNT],
}

impl FakeGpiote {
    pub fn decoded(&self, channel: u8) -> ChannelConfig {
        ChannelConfig::from_bits(self.configs[channel as usize])
    }
}

impl GpioteHal for FakeGpiote {
    fn base_address(&self) -> usize {
        GPIOTE_BASE
    }

    fn trigger_out(&mut self, channel: Channel) {
        self.tasks[channel.index()].out += 1;
    }

    fn trigger_set(&mut self, channel: Channel) {
        self.tasks[channel.index()].set += 1;
    }

    fn trigger_clr(&mut self, channel: Channel) {
        self.tasks[channel.index()].clr += 1;
    }

    fn event_in(&self, channel: Channel) -> bool {
        self.events_in[channel.index()]
    }

    fn clear_event_in(&mut self, channel: Channel) {
        self.events_in[channel.index()] = false;
    }

    fn event_port(&self) -> bool {
        self.event_port
    }

    fn clear_event_port(&mut self) {
        self.event_port = false;
    }

    fn int_enable(&mut self, mask: GpioteInterrupts) {
        self.inten |= mask.bits();
    }

    fn int_disable(&mut self, mask: GpioteInterrupts) {
        self.inten &= !mask.bits();
    }

    fn int_enabled(&self) -> GpioteInterrupts {
        GpioteInterrupts::from_bits_truncate(self.inten)
    }

    fn config(&self, channel: Channel) -> ChannelConfig {
        ChannelConfig::from_bits(self.configs[channel.index()])
    }

    fn set_config(&mut self, channel: Channel, config: ChannelConfig) {
        self.configs[channel.index()] = config.to_bits();
    }
}

/// Decoded `PIN_CNF` plus level registers for all pins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakePin {
    pub output: bool,
    pub input_connected: bool,
    pub pull: Pull,
    pub sense: Sense,
    pub out: Level,
    pub input: Level,
}

impl Default for FakePin {
    fn default() -> Self {
        Self {
            output: false,
            input_connected: false,
            pull: Pull::None,
            sense: Sense::Disabled,
            out: Level::Low,
            input: Level::Low,
        }
    }
}

/// GPIO ports P0 and P1
#[derive(Debug)]
pub struct FakeGpio {
    pub pins: [FakePin; PIN_COUNT as usize],
}

impl Default for FakeGpio {
    fn default() -> Self {
        Self {
            pins: [FakePin::default(); PIN_COUNT as usize],
        }
    }
}

impl FakeGpio {
    pub fn pin(&self, pin: Pin) -> &FakePin {
        &self.pins[pin.number() as usize]
    }

    /// Drive the external level of a pin
    pub fn drive(&mut self, pin: Pin, level: Level) {
        self.pins[pin.number() as usize].input = level;
    }

    /// State of the port `DETECT` signal
    pub fn detect(&self) -> bool {
        self.pins.iter().any(|p| p.sense.matches(p.input))
    }
}

impl GpioHal for FakeGpio {
    fn configure_input(&mut self, pin: Pin, pull: Pull) {
        let p = &mut self.pins[pin.number() as usize];
        *p = FakePin {
            pull,
            input_connected: true,
            out: p.out,
            input: p.input,
            ..FakePin::default()
        };
    }

    fn configure_output(&mut self, pin: Pin, initial: Level, connect_input: bool) {
        let p = &mut self.pins[pin.number() as usize];
        p.out = initial;
        p.output = true;
        p.input_connected = connect_input;
        p.pull = Pull::None;
        p.sense = Sense::Disabled;
    }

    fn connect_input(&mut self, pin: Pin) {
        self.pins[pin.number() as usize].input_connected = true;
    }

    fn disconnect(&mut self, pin: Pin) {
        let p = &mut self.pins[pin.number() as usize];
        *p = FakePin {
            out: p.out,
            input: p.input,
            ..FakePin::default()
        };
    }

    fn set_sense(&mut self, pin: Pin, sense: Sense) {
        self.pins[pin.number() as usize].sense = sense;
    }

    fn sense(&self, pin: Pin) -> Sense {
        self.pin(pin).sense
    }

    fn read(&self, pin: Pin) -> Level {
        self.pin(pin).input
    }

    fn set_high(&mut self, pin: Pin) {
        self.pins[pin.number() as usize].out = Level::High;
    }

    fn set_low(&mut self, pin: Pin) {
        self.pins[pin.number() as usize].out = Level::Low;
    }

    fn output_level(&self, pin: Pin) -> Level {
        self.pin(pin).out
    }
}

