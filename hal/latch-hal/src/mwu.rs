//! Memory Watch Unit register abstractions
//!
//! The MWU watches four user-defined address ranges and two fixed
//! peripheral ranges for read and/or write accesses. Every (region, access)
//! pair has its own event register, interrupt enable bit, NMI enable bit and
//! watch enable bit. All masks share one bit layout:
//!
//! | Region | Write bit | Read bit |
//! |--------|-----------|----------|
//! | User n (0-3) | `2n` | `2n + 1` |
//! | Peripheral n (0-1) | `24 + 2n` | `25 + 2n` |
//!
//! Peripheral regions are split into 32 sub-regions; `PREGION[n].SUBS`
//! selects which sub-regions are included in the watch and
//! `PERREGION[n].SUBSTAT{WA,RA}` record which sub-regions were accessed.

use bitflags::bitflags;

/// Number of user-configurable regions
pub const USER_REGION_COUNT: usize = 4;

/// Number of peripheral regions
pub const PERIPHERAL_REGION_COUNT: usize = 2;

/// Total number of watched regions
pub const REGION_COUNT: usize = USER_REGION_COUNT + PERIPHERAL_REGION_COUNT;

/// Event register offsets from the MWU base address
pub mod offset {
    /// `EVENTS_REGION[0].WA`
    pub const EVENTS_REGION: usize = 0x100;
    /// `EVENTS_PREGION[0].WA`
    pub const EVENTS_PREGION: usize = 0x160;
    /// Stride between region event pairs
    pub const EVENTS_STRIDE: usize = 0x8;
}

/// Kind of memory access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Access {
    /// Read access
    Read,
    /// Write access
    Write,
}

/// Watched memory region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Region {
    /// User region 0
    User0,
    /// User region 1
    User1,
    /// User region 2
    User2,
    /// User region 3
    User3,
    /// Peripheral region 0
    Peripheral0,
    /// Peripheral region 1
    Peripheral1,
}

impl Region {
    /// All regions in hardware order
    pub const ALL: [Region; REGION_COUNT] = [
        Region::User0,
        Region::User1,
        Region::User2,
        Region::User3,
        Region::Peripheral0,
        Region::Peripheral1,
    ];

    /// Position in [`Region::ALL`]
    pub const fn index(self) -> usize {
        match self {
            Region::User0 => 0,
            Region::User1 => 1,
            Region::User2 => 2,
            Region::User3 => 3,
            Region::Peripheral0 => 4,
            Region::Peripheral1 => 5,
        }
    }

    /// Check if the address range of this region is software-defined
    pub const fn is_user(self) -> bool {
        !self.is_peripheral()
    }

    /// Check if this is a fixed peripheral region with sub-regions
    pub const fn is_peripheral(self) -> bool {
        matches!(self, Region::Peripheral0 | Region::Peripheral1)
    }

    /// Index within the region's own register array (`REGION[n]` or `PREGION[n]`)
    pub const fn hw_index(self) -> usize {
        if self.is_peripheral() {
            self.index() - USER_REGION_COUNT
        } else {
            self.index()
        }
    }

    /// Bit position of the write-access bit in every MWU mask
    const fn write_bit(self) -> u32 {
        if self.is_peripheral() {
            24 + 2 * self.hw_index() as u32
        } else {
            2 * self.hw_index() as u32
        }
    }

    /// Raw mask bits for one access kind of this region
    pub const fn bits(self, access: Access) -> u32 {
        match access {
            Access::Write => 1 << self.write_bit(),
            Access::Read => 1 << (self.write_bit() + 1),
        }
    }

    /// Raw mask bits for both access kinds of this region
    pub const fn all_bits(self) -> u32 {
        self.bits(Access::Write) | self.bits(Access::Read)
    }
}

/// MWU event (one latch per region and access kind)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MwuEvent {
    region: Region,
    access: Access,
}

impl MwuEvent {
    /// Number of distinct events
    pub const COUNT: usize = REGION_COUNT * 2;

    /// Event for a region and access kind
    pub const fn new(region: Region, access: Access) -> Self {
        Self { region, access }
    }

    /// Watched region
    pub const fn region(self) -> Region {
        self.region
    }

    /// Access kind
    pub const fn access(self) -> Access {
        self.access
    }

    /// Offset of the event register from the MWU base address
    pub const fn offset(self) -> usize {
        let pair = if self.region.is_peripheral() {
            offset::EVENTS_PREGION
        } else {
            offset::EVENTS_REGION
        } + self.region.hw_index() * offset::EVENTS_STRIDE;
        match self.access {
            Access::Write => pair,
            Access::Read => pair + 4,
        }
    }

    /// Position in [`MwuEvent::all`] order
    pub const fn index(self) -> usize {
        self.region.index() * 2
            + match self.access {
                Access::Write => 0,
                Access::Read => 1,
            }
    }

    /// Mask bit of this event in `INTEN`/`NMIEN`
    pub const fn bits(self) -> u32 {
        self.region.bits(self.access)
    }

    /// Iterate over all events, write before read for each region
    pub fn all() -> impl Iterator<Item = MwuEvent> {
        Region::ALL.into_iter().flat_map(|region| {
            [Access::Write, Access::Read]
                .into_iter()
                .map(move |access| MwuEvent::new(region, access))
        })
    }
}

bitflags! {
    /// Watch enable bits (`REGIONEN` layout)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RegionWatch: u32 {
        const REGION0_WRITE = 1 << 0;
        const REGION0_READ = 1 << 1;
        const REGION1_WRITE = 1 << 2;
        const REGION1_READ = 1 << 3;
        const REGION2_WRITE = 1 << 4;
        const REGION2_READ = 1 << 5;
        const REGION3_WRITE = 1 << 6;
        const REGION3_READ = 1 << 7;
        const PREGION0_WRITE = 1 << 24;
        const PREGION0_READ = 1 << 25;
        const PREGION1_WRITE = 1 << 26;
        const PREGION1_READ = 1 << 27;
    }
}

bitflags! {
    /// Interrupt / NMI enable bits (`INTEN` and `NMIEN` layout)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MwuInterrupts: u32 {
        const REGION0_WRITE = 1 << 0;
        const REGION0_READ = 1 << 1;
        const REGION1_WRITE = 1 << 2;
        const REGION1_READ = 1 << 3;
        const REGION2_WRITE = 1 << 4;
        const REGION2_READ = 1 << 5;
        const REGION3_WRITE = 1 << 6;
        const REGION3_READ = 1 << 7;
        const PREGION0_WRITE = 1 << 24;
        const PREGION0_READ = 1 << 25;
        const PREGION1_WRITE = 1 << 26;
        const PREGION1_READ = 1 << 27;
    }
}

impl RegionWatch {
    /// Watch bits for one access kind of a region
    pub const fn region(region: Region, access: Access) -> Self {
        Self::from_bits_retain(region.bits(access))
    }

    /// Watch bits for both access kinds of a region
    pub const fn region_all(region: Region) -> Self {
        Self::from_bits_retain(region.all_bits())
    }

    /// Check whether the mask sets bits outside the defined regions
    pub const fn has_undefined(self) -> bool {
        self.bits() & !Self::all().bits() != 0
    }
}

impl MwuInterrupts {
    /// Interrupt bit of a single event
    pub const fn event(event: MwuEvent) -> Self {
        Self::from_bits_retain(event.bits())
    }

    /// Interrupt bits for both access kinds of a region
    pub const fn region_all(region: Region) -> Self {
        Self::from_bits_retain(region.all_bits())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RegionWatch {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "RegionWatch({=u32:#x})", self.bits())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for MwuInterrupts {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "MwuInterrupts({=u32:#x})", self.bits())
    }
}

/// Register-level MWU access
///
/// Mirrors the hardware one register at a time; validation of region
/// kinds and ranges is the driver's job. Operations that only exist for one
/// kind of region are ignored (or read as zero) for the other kind, matching
/// what the hardware does with its read-only registers.
pub trait MwuHal {
    /// Base address of the peripheral instance
    fn base_address(&self) -> usize;

    /// Check whether an event is latched
    fn event_check(&self, event: MwuEvent) -> bool;

    /// Clear a latched event
    fn event_clear(&mut self, event: MwuEvent);

    /// Enable interrupts (`INTENSET`)
    fn int_enable(&mut self, mask: MwuInterrupts);

    /// Disable interrupts (`INTENCLR`)
    fn int_disable(&mut self, mask: MwuInterrupts);

    /// Currently enabled interrupts (`INTEN`)
    fn int_enabled(&self) -> MwuInterrupts;

    /// Enable non-maskable interrupts (`NMIENSET`)
    fn nmi_enable(&mut self, mask: MwuInterrupts);

    /// Disable non-maskable interrupts (`NMIENCLR`)
    fn nmi_disable(&mut self, mask: MwuInterrupts);

    /// Currently enabled non-maskable interrupts (`NMIEN`)
    fn nmi_enabled(&self) -> MwuInterrupts;

    /// Start watching (`REGIONENSET`)
    fn region_watch_enable(&mut self, mask: RegionWatch);

    /// Stop watching (`REGIONENCLR`)
    fn region_watch_disable(&mut self, mask: RegionWatch);

    /// Currently watched regions (`REGIONEN`)
    fn region_watch(&self) -> RegionWatch;

    /// Program `REGION[n].START/END`; ignored for peripheral regions
    fn set_region_range(&mut self, region: Region, start: u32, end: u32);

    /// Read `START/END` of a user or peripheral region
    fn region_range(&self, region: Region) -> (u32, u32);

    /// Program `PREGION[n].SUBS`; ignored for user regions
    fn subregions_configure(&mut self, region: Region, mask: u32);

    /// Read `PREGION[n].SUBS`; zero for user regions
    fn subregions(&self, region: Region) -> u32;

    /// Read `PERREGION[n].SUBSTATRA`; zero for user regions
    fn subregion_read_accesses(&self, region: Region) -> u32;

    /// Clear bits of `PERREGION[n].SUBSTATRA`
    fn subregion_read_accesses_clear(&mut self, region: Region, mask: u32);

    /// Read `PERREGION[n].SUBSTATWA`; zero for user regions
    fn subregion_write_accesses(&self, region: Region) -> u32;

    /// Clear bits of `PERREGION[n].SUBSTATWA`
    fn subregion_write_accesses_clear(&mut self, region: Region, mask: u32);

    /// Absolute address of an event register
    fn event_address(&self, event: MwuEvent) -> usize {
        self.base_address() + event.offset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_offsets() {
        assert_eq!(MwuEvent::new(Region::User0, Access::Write).offset(), 0x100);
        assert_eq!(MwuEvent::new(Region::User0, Access::Read).offset(), 0x104);
        assert_eq!(MwuEvent::new(Region::User3, Access::Read).offset(), 0x11C);
        assert_eq!(
            MwuEvent::new(Region::Peripheral0, Access::Write).offset(),
            0x160
        );
        assert_eq!(
            MwuEvent::new(Region::Peripheral1, Access::Read).offset(),
            0x16C
        );
    }

    #[test]
    fn test_mask_layout_matches_flags() {
        assert_eq!(
            RegionWatch::region(Region::User2, Access::Read),
            RegionWatch::REGION2_READ
        );
        assert_eq!(
            RegionWatch::region(Region::Peripheral1, Access::Write),
            RegionWatch::PREGION1_WRITE
        );
        assert_eq!(
            MwuInterrupts::region_all(Region::Peripheral0),
            MwuInterrupts::PREGION0_WRITE | MwuInterrupts::PREGION0_READ
        );
    }

    #[test]
    fn test_all_events_cover_all_bits() {
        let mut bits = 0;
        for (i, event) in MwuEvent::all().enumerate() {
            assert_eq!(event.index(), i);
            bits |= event.bits();
        }
        assert_eq!(MwuEvent::all().count(), MwuEvent::COUNT);
        assert_eq!(bits, RegionWatch::all().bits());
        assert_eq!(bits, MwuInterrupts::all().bits());
    }

    #[test]
    fn test_undefined_bits() {
        assert!(!RegionWatch::all().has_undefined());
        assert!(RegionWatch::from_bits_retain(1 << 12).has_undefined());
    }

    #[test]
    fn test_region_kinds() {
        assert!(Region::User3.is_user());
        assert!(Region::Peripheral0.is_peripheral());
        assert_eq!(Region::Peripheral1.hw_index(), 1);
        assert_eq!(Region::User2.hw_index(), 2);
    }
}
