//! Memory Watch Unit

use latch_hal::{Access, MwuEvent, MwuHal, MwuInterrupts, Region, RegionWatch};
use nrf52840_pac::mwu::{RegisterBlock, PREGION, REGION};

use crate::mmio::{clear_event, write_bits, Regs};

/// MWU register block
#[derive(Debug)]
pub struct Mwu {
    regs: Regs<RegisterBlock>,
}

impl Mwu {
    /// Create a handle for the MWU register block at `ptr`
    ///
    /// # Safety
    ///
    /// `ptr` must point to an MWU register block and the handle must be the
    /// only one in use for it.
    pub unsafe fn from_ptr(ptr: *const RegisterBlock) -> Self {
        Self {
            regs: Regs::new(ptr),
        }
    }
}

/// User region range registers by hardware index
fn region_regs(regs: &RegisterBlock, n: usize) -> &REGION {
    match n {
        0 => &regs.region0,
        1 => &regs.region1,
        2 => &regs.region2,
        3 => &regs.region3,
        _ => panic!("MWU user region index out of range"),
    }
}

/// Peripheral region range registers by hardware index
fn pregion_regs(regs: &RegisterBlock, n: usize) -> &PREGION {
    match n {
        0 => &regs.pregion0,
        1 => &regs.pregion1,
        _ => panic!("MWU peripheral region index out of range"),
    }
}

/// Read or clear one event register, picked by region and access
macro_rules! with_event {
    ($regs:expr, $event:expr, |$reg:ident| $body:expr) => {{
        let n = $event.region().hw_index();
        match ($event.region().is_peripheral(), $event.access()) {
            (false, Access::Write) => {
                let $reg = &$regs.events_region[n].wa;
                $body
            }
            (false, Access::Read) => {
                let $reg = &$regs.events_region[n].ra;
                $body
            }
            (true, Access::Write) => {
                let $reg = &$regs.events_pregion[n].wa;
                $body
            }
            (true, Access::Read) => {
                let $reg = &$regs.events_pregion[n].ra;
                $body
            }
        }
    }};
}

impl MwuHal for Mwu {
    fn base_address(&self) -> usize {
        self.regs.addr()
    }

    fn event_check(&self, event: MwuEvent) -> bool {
        with_event!(self.regs, event, |reg| reg.read().bits() != 0)
    }

    fn event_clear(&mut self, event: MwuEvent) {
        with_event!(self.regs, event, |reg| clear_event!(reg))
    }

    fn int_enable(&mut self, mask: MwuInterrupts) {
        write_bits!(self.regs.intenset, mask.bits());
    }

    fn int_disable(&mut self, mask: MwuInterrupts) {
        write_bits!(self.regs.intenclr, mask.bits());
    }

    fn int_enabled(&self) -> MwuInterrupts {
        MwuInterrupts::from_bits_truncate(self.regs.inten.read().bits())
    }

    fn nmi_enable(&mut self, mask: MwuInterrupts) {
        write_bits!(self.regs.nmienset, mask.bits());
    }

    fn nmi_disable(&mut self, mask: MwuInterrupts) {
        write_bits!(self.regs.nmienclr, mask.bits());
    }

    fn nmi_enabled(&self) -> MwuInterrupts {
        MwuInterrupts::from_bits_truncate(self.regs.nmien.read().bits())
    }

    fn region_watch_enable(&mut self, mask: RegionWatch) {
        write_bits!(self.regs.regionenset, mask.bits());
    }

    fn region_watch_disable(&mut self, mask: RegionWatch) {
        write_bits!(self.regs.regionenclr, mask.bits());
    }

    fn region_watch(&self) -> RegionWatch {
        RegionWatch::from_bits_truncate(self.regs.regionen.read().bits())
    }

    fn set_region_range(&mut self, region: Region, start: u32, end: u32) {
        // Peripheral ranges are fixed in hardware
        if region.is_peripheral() {
            return;
        }
        let range = region_regs(&self.regs, region.hw_index());
        write_bits!(range.start, start);
        write_bits!(range.end, end);
    }

    fn region_range(&self, region: Region) -> (u32, u32) {
        let n = region.hw_index();
        if region.is_peripheral() {
            let range = pregion_regs(&self.regs, n);
            (range.start.read().bits(), range.end.read().bits())
        } else {
            let range = region_regs(&self.regs, n);
            (range.start.read().bits(), range.end.read().bits())
        }
    }

    fn subregions_configure(&mut self, region: Region, mask: u32) {
        if region.is_peripheral() {
            write_bits!(pregion_regs(&self.regs, region.hw_index()).subs, mask);
        }
    }

    fn subregions(&self, region: Region) -> u32 {
        if region.is_peripheral() {
            pregion_regs(&self.regs, region.hw_index()).subs.read().bits()
        } else {
            0
        }
    }

    fn subregion_read_accesses(&self, region: Region) -> u32 {
        if region.is_peripheral() {
            self.regs.perregion[region.hw_index()].substatra.read().bits()
        } else {
            0
        }
    }

    fn subregion_read_accesses_clear(&mut self, region: Region, mask: u32) {
        if region.is_peripheral() {
            // Write-one-to-clear
            write_bits!(self.regs.perregion[region.hw_index()].substatra, mask);
        }
    }

    fn subregion_write_accesses(&self, region: Region) -> u32 {
        if region.is_peripheral() {
            self.regs.perregion[region.hw_index()].substatwa.read().bits()
        } else {
            0
        }
    }

    fn subregion_write_accesses_clear(&mut self, region: Region, mask: u32) {
        if region.is_peripheral() {
            write_bits!(self.regs.perregion[region.hw_index()].substatwa, mask);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mmio::ram::{peek, poke, Ram};

    #[test]
    fn test_event_latch_and_clear() {
        let mut ram = Ram::new();
        let base = ram.base();
        let mut mwu = unsafe { Mwu::from_ptr(base as *const RegisterBlock) };

        let event = MwuEvent::new(Region::User1, Access::Read);
        assert!(!mwu.event_check(event));

        // Hardware latches EVENTS_REGION[1].RA
        poke(base, 0x10C, 1);
        assert!(mwu.event_check(event));
        assert!(!mwu.event_check(MwuEvent::new(Region::User1, Access::Write)));

        mwu.event_clear(event);
        assert!(!mwu.event_check(event));
        assert_eq!(peek(base, 0x10C), 0);
    }

    #[test]
    fn test_masks_use_set_clear_registers() {
        let mut ram = Ram::new();
        let base = ram.base();
        let mut mwu = unsafe { Mwu::from_ptr(base as *const RegisterBlock) };

        mwu.int_enable(MwuInterrupts::REGION0_WRITE | MwuInterrupts::PREGION1_READ);
        assert_eq!(peek(base, 0x304), 0x0800_0001);

        mwu.nmi_disable(MwuInterrupts::REGION3_READ);
        assert_eq!(peek(base, 0x328), 1 << 7);

        mwu.region_watch_enable(RegionWatch::REGION2_WRITE);
        assert_eq!(peek(base, 0x514), 1 << 4);

        // Undefined bits in the status register are dropped
        poke(base, 0x510, 0xFFFF_FFFF);
        assert_eq!(mwu.region_watch(), RegionWatch::all());
    }

    #[test]
    fn test_region_ranges() {
        let mut ram = Ram::new();
        let base = ram.base();
        let mut mwu = unsafe { Mwu::from_ptr(base as *const RegisterBlock) };

        mwu.set_region_range(Region::User2, 0x2000_0000, 0x2000_0FFF);
        assert_eq!(peek(base, 0x620), 0x2000_0000);
        assert_eq!(peek(base, 0x624), 0x2000_0FFF);
        assert_eq!(mwu.region_range(Region::User2), (0x2000_0000, 0x2000_0FFF));

        // Peripheral ranges are fixed
        mwu.set_region_range(Region::Peripheral0, 1, 2);
        assert_eq!(peek(base, 0x6C0), 0);
    }

    #[test]
    fn test_subregions() {
        let mut ram = Ram::new();
        let base = ram.base();
        let mut mwu = unsafe { Mwu::from_ptr(base as *const RegisterBlock) };

        mwu.subregions_configure(Region::Peripheral1, 0x0000_00F0);
        assert_eq!(peek(base, 0x6D8), 0x0000_00F0);
        assert_eq!(mwu.subregions(Region::Peripheral1), 0x0000_00F0);

        mwu.subregions_configure(Region::User0, 0xFF);
        assert_eq!(mwu.subregions(Region::User0), 0);

        poke(base, 0x404, 0b1010);
        assert_eq!(mwu.subregion_read_accesses(Region::Peripheral0), 0b1010);
        mwu.subregion_read_accesses_clear(Region::Peripheral0, 0b0010);
        assert_eq!(peek(base, 0x404), 0b0010);

        poke(base, 0x408, 0b1);
        assert_eq!(mwu.subregion_write_accesses(Region::Peripheral1), 0b1);
    }

    #[test]
    fn test_event_address() {
        let mut ram = Ram::new();
        let base = ram.base();
        let mwu = unsafe { Mwu::from_ptr(base as *const RegisterBlock) };
        let event = MwuEvent::new(Region::Peripheral0, Access::Read);
        assert_eq!(mwu.event_address(event), base + 0x164);

        // Published addresses match the register block layout
        let regs = unsafe { &*(base as *const RegisterBlock) };
        for n in 0..4 {
            let event = MwuEvent::new(Region::ALL[n], Access::Write);
            let reg = &regs.events_region[n].wa as *const _ as usize;
            assert_eq!(mwu.event_address(event), reg);
        }
        let event = MwuEvent::new(Region::Peripheral1, Access::Read);
        let reg = &regs.events_pregion[1].ra as *const _ as usize;
        assert_eq!(mwu.event_address(event), reg);
    }

    #[test]
    fn test_peripheral_range_reads_pregion() {
        let mut ram = Ram::new();
        let base = ram.base();
        let mwu = unsafe { Mwu::from_ptr(base as *const RegisterBlock) };

        poke(base, 0x6D0, 0x4000_0000);
        poke(base, 0x6D4, 0x4001_FFFF);
        assert_eq!(
            mwu.region_range(Region::Peripheral1),
            (0x4000_0000, 0x4001_FFFF)
        );
    }
}
