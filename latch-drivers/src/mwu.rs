//! Memory Watch Unit driver
//!
//! Watches are configured in two steps: [`WatchUnit::configure`] records
//! which access kinds are armed for each region (and programs the
//! sub-region selection of peripheral regions), then
//! [`WatchUnit::enable`] starts watching the armed kinds of one region.
//! Event flags latch until they are cleared explicitly.

use heapless::Vec;
use latch_core::config::WatchConfig;
use latch_core::MwuError;
use latch_hal::{Access, MwuEvent, MwuHal, MwuInterrupts, Region, RegionWatch};

/// Snapshot of one watched region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegionInfo {
    /// Region this snapshot describes
    pub region: Region,
    /// First watched address
    pub start: u32,
    /// Last watched address
    pub end: u32,
    /// Access kinds armed by [`WatchUnit::configure`]
    pub armed: RegionWatch,
    /// Access kinds currently watched by the hardware
    pub watching: RegionWatch,
    /// Included sub-regions (zero for user regions)
    pub subregions: u32,
    /// Latched access kind; write wins when both are latched
    pub last_access: Option<Access>,
}

impl RegionInfo {
    /// Check if the hardware is watching any access kind of the region
    pub fn is_enabled(&self) -> bool {
        !self.watching.is_empty()
    }

    /// Size of the watched range in bytes
    pub fn size(&self) -> u64 {
        (self.end as u64).saturating_sub(self.start as u64) + 1
    }
}

/// Memory Watch Unit driver
pub struct WatchUnit<H> {
    hal: H,
    armed: RegionWatch,
}

impl<H: MwuHal> WatchUnit<H> {
    /// Create a driver; nothing is armed until [`WatchUnit::configure`]
    pub fn new(hal: H) -> Self {
        Self {
            hal,
            armed: RegionWatch::empty(),
        }
    }

    /// Access the register layer
    pub fn hal(&self) -> &H {
        &self.hal
    }

    /// Mutable access to the register layer
    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }

    /// Consume the driver and return the register layer
    pub fn release(self) -> H {
        self.hal
    }

    /// Arm access kinds for the regions referenced by `regions`
    ///
    /// Replaces the armed kinds of every referenced region and writes
    /// `subregion_mask` into `PREGION[n].SUBS` of each referenced
    /// peripheral region. Regions not referenced keep their setup.
    /// Watching only starts with [`WatchUnit::enable`].
    pub fn configure(&mut self, regions: RegionWatch, subregion_mask: u32) -> Result<(), MwuError> {
        if regions.has_undefined() {
            warn!("mwu: undefined region bits {=u32:#x}", regions.bits());
            return Err(MwuError::InvalidRegion);
        }

        for region in Region::ALL {
            let all = RegionWatch::region_all(region);
            if !regions.intersects(all) {
                continue;
            }
            self.armed = self.armed.difference(all) | regions.intersection(all);
            if region.is_peripheral() {
                self.hal.subregions_configure(region, subregion_mask);
            }
        }

        debug!("mwu: armed {=u32:#x}", self.armed.bits());
        Ok(())
    }

    /// Access kinds currently armed
    pub fn armed(&self) -> RegionWatch {
        self.armed
    }

    /// Start watching the armed access kinds of a region
    ///
    /// Idempotent; does nothing for a region with nothing armed.
    pub fn enable(&mut self, region: Region) {
        let mask = self.armed.intersection(RegionWatch::region_all(region));
        if !mask.is_empty() {
            self.hal.region_watch_enable(mask);
        }
    }

    /// Stop watching both access kinds of a region; idempotent
    pub fn disable(&mut self, region: Region) {
        self.hal.region_watch_disable(RegionWatch::region_all(region));
    }

    /// Check if the hardware watches any access kind of a region
    pub fn is_enabled(&self, region: Region) -> bool {
        self.hal
            .region_watch()
            .intersects(RegionWatch::region_all(region))
    }

    /// Check whether an event is latched, without side effects
    pub fn event_check(&self, event: MwuEvent) -> bool {
        self.hal.event_check(event)
    }

    /// Clear a latched event; no-op if already clear
    pub fn event_clear(&mut self, event: MwuEvent) {
        self.hal.event_clear(event);
    }

    /// Absolute address of an event register (for PPI)
    pub fn event_address(&self, event: MwuEvent) -> usize {
        self.hal.event_address(event)
    }

    /// Let the events in `mask` raise the MWU interrupt
    pub fn interrupt_enable(&mut self, mask: MwuInterrupts) {
        self.hal.int_enable(mask);
    }

    /// Stop the events in `mask` from raising the MWU interrupt
    pub fn interrupt_disable(&mut self, mask: MwuInterrupts) {
        self.hal.int_disable(mask);
    }

    /// Subset of `mask` whose interrupts are enabled
    pub fn interrupt_enabled(&self, mask: MwuInterrupts) -> MwuInterrupts {
        self.hal.int_enabled().intersection(mask)
    }

    /// Let the events in `mask` raise the non-maskable interrupt
    pub fn nmi_enable(&mut self, mask: MwuInterrupts) {
        self.hal.nmi_enable(mask);
    }

    /// Stop the events in `mask` from raising the non-maskable interrupt
    pub fn nmi_disable(&mut self, mask: MwuInterrupts) {
        self.hal.nmi_disable(mask);
    }

    /// Subset of `mask` routed to the non-maskable interrupt
    pub fn nmi_enabled(&self, mask: MwuInterrupts) -> MwuInterrupts {
        self.hal.nmi_enabled().intersection(mask)
    }

    /// Raw `REGIONENSET` write, bypassing the armed set
    pub fn watch_enable(&mut self, mask: RegionWatch) {
        self.hal.region_watch_enable(mask);
    }

    /// Raw `REGIONENCLR` write
    pub fn watch_disable(&mut self, mask: RegionWatch) {
        self.hal.region_watch_disable(mask);
    }

    /// Raw `REGIONEN` read
    pub fn watch_get(&self) -> RegionWatch {
        self.hal.region_watch()
    }

    /// Program the address range of a user region
    pub fn set_user_range(&mut self, region: Region, start: u32, end: u32) -> Result<(), MwuError> {
        if region.is_peripheral() {
            return Err(MwuError::InvalidRegion);
        }
        if start > end {
            return Err(MwuError::InvalidRange);
        }
        self.hal.set_region_range(region, start, end);
        Ok(())
    }

    /// Snapshot of a region's configuration and latched events
    pub fn region_info(&self, region: Region) -> RegionInfo {
        let (start, end) = self.hal.region_range(region);
        let all = RegionWatch::region_all(region);
        let last_access = if self.hal.event_check(MwuEvent::new(region, Access::Write)) {
            Some(Access::Write)
        } else if self.hal.event_check(MwuEvent::new(region, Access::Read)) {
            Some(Access::Read)
        } else {
            None
        };

        RegionInfo {
            region,
            start,
            end,
            armed: self.armed.intersection(all),
            watching: self.hal.region_watch().intersection(all),
            subregions: self.hal.subregions(region),
            last_access,
        }
    }

    /// Sub-regions of a peripheral region that saw a read access
    pub fn subregion_reads(&self, region: Region) -> Result<u32, MwuError> {
        Self::peripheral(region)?;
        Ok(self.hal.subregion_read_accesses(region))
    }

    /// Clear read-access status bits of a peripheral region
    pub fn subregion_reads_clear(&mut self, region: Region, mask: u32) -> Result<(), MwuError> {
        Self::peripheral(region)?;
        self.hal.subregion_read_accesses_clear(region, mask);
        Ok(())
    }

    /// Sub-regions of a peripheral region that saw a write access
    pub fn subregion_writes(&self, region: Region) -> Result<u32, MwuError> {
        Self::peripheral(region)?;
        Ok(self.hal.subregion_write_accesses(region))
    }

    /// Clear write-access status bits of a peripheral region
    pub fn subregion_writes_clear(&mut self, region: Region, mask: u32) -> Result<(), MwuError> {
        Self::peripheral(region)?;
        self.hal.subregion_write_accesses_clear(region, mask);
        Ok(())
    }

    /// Collect and clear every latched event
    ///
    /// Intended for the MWU interrupt handler. Only events that were seen
    /// latched are cleared, so an access landing between the check and the
    /// clear of another event is not lost.
    pub fn take_events(&mut self) -> Vec<MwuEvent, { MwuEvent::COUNT }> {
        let mut events = Vec::new();
        for event in MwuEvent::all() {
            if self.hal.event_check(event) {
                self.hal.event_clear(event);
                // Capacity matches the number of events
                let _ = events.push(event);
            }
        }
        if !events.is_empty() {
            trace!("mwu: {=usize} events", events.len());
        }
        events
    }

    /// Set up and start one watch from its configuration
    ///
    /// Programs the range of a user region, arms the configured access
    /// kinds, routes them to the interrupt when requested and enables the
    /// region.
    pub fn apply(&mut self, watch: &WatchConfig) -> Result<(), MwuError> {
        watch.validate()?;
        if watch.region.is_user() {
            self.set_user_range(watch.region, watch.start, watch.end)?;
        }

        let mask = watch.watch();
        self.configure(mask, watch.subregions)?;
        if watch.interrupt {
            self.interrupt_enable(MwuInterrupts::from_bits_truncate(mask.bits()));
        }
        self.enable(watch.region);
        Ok(())
    }

    fn peripheral(region: Region) -> Result<(), MwuError> {
        if region.is_peripheral() {
            Ok(())
        } else {
            Err(MwuError::InvalidRegion)
        }
    }
}
