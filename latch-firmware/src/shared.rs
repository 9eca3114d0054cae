//! Driver instances and inter-task signals
//!
//! The drivers are shared between thread mode and their interrupt handlers
//! through `critical_section::Mutex`; the handlers notify tasks through
//! embassy-sync signals.

use core::cell::RefCell;

use critical_section::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use heapless::Vec;

use latch_drivers::{ChannelHandle, Gpiote, WatchUnit};
use latch_hal::MwuEvent;
use latch_hal_nrf52840 as nrf;

pub type GpioteDriver = Gpiote<nrf::Gpiote, nrf::Gpio>;
pub type MwuDriver = WatchUnit<nrf::Mwu>;
pub type MwuEvents = Vec<MwuEvent, { MwuEvent::COUNT }>;

static GPIOTE: Mutex<RefCell<Option<GpioteDriver>>> = Mutex::new(RefCell::new(None));
static MWU: Mutex<RefCell<Option<MwuDriver>>> = Mutex::new(RefCell::new(None));

/// Button channel fired (set from the GPIOTE interrupt)
pub static BUTTON_EVENT: Signal<CriticalSectionRawMutex, ChannelHandle> = Signal::new();

/// Memory accesses latched by the MWU (set from the MWU interrupt)
pub static MWU_EVENTS: Signal<CriticalSectionRawMutex, MwuEvents> = Signal::new();

/// Hand the drivers over to the shared slots
pub fn install(gpiote: GpioteDriver, mwu: MwuDriver) {
    critical_section::with(|cs| {
        GPIOTE.borrow_ref_mut(cs).replace(gpiote);
        MWU.borrow_ref_mut(cs).replace(mwu);
    });
}

/// Run `f` on the GPIOTE driver; `None` before [`install`]
pub fn with_gpiote<R>(f: impl FnOnce(&mut GpioteDriver) -> R) -> Option<R> {
    critical_section::with(|cs| GPIOTE.borrow_ref_mut(cs).as_mut().map(f))
}

/// Run `f` on the MWU driver; `None` before [`install`]
pub fn with_mwu<R>(f: impl FnOnce(&mut MwuDriver) -> R) -> Option<R> {
    critical_section::with(|cs| MWU.borrow_ref_mut(cs).as_mut().map(f))
}
