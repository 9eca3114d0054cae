//! nRF52840 implementation of the Latch HAL
//!
//! This crate implements the `latch-hal` traits on the `nrf52840-pac`
//! register blocks:
//!
//! - [`mwu::Mwu`] implements [`latch_hal::MwuHal`]
//! - [`gpiote::Gpiote`] implements [`latch_hal::GpioteHal`]
//! - [`gpio::Gpio`] implements [`latch_hal::GpioHal`] across P0 and P1
//! - [`irq`] wraps the NVIC for the two peripheral interrupts
//!
//! Peripheral handles are obtained once through [`Peripherals::take`].

#![no_std]

pub mod gpio;
pub mod gpiote;
pub mod irq;
mod mmio;
pub mod mwu;

use nrf52840_pac as pac;
use portable_atomic::{AtomicBool, Ordering};

pub use gpio::Gpio;
pub use gpiote::Gpiote;
pub use irq::Interrupt;
pub use mwu::Mwu;

static TAKEN: AtomicBool = AtomicBool::new(false);

/// The peripherals managed by the Latch drivers
pub struct Peripherals {
    /// Memory Watch Unit
    pub mwu: Mwu,
    /// GPIO Tasks and Events
    pub gpiote: Gpiote,
    /// GPIO ports P0 and P1
    pub gpio: Gpio,
}

impl Peripherals {
    /// Take the peripherals, returns `None` on every call after the first
    pub fn take() -> Option<Self> {
        if TAKEN.swap(true, Ordering::AcqRel) {
            None
        } else {
            // SAFETY: the flag guarantees a single set of handles
            Some(unsafe { Self::steal() })
        }
    }

    /// Create the peripherals without checking whether they were taken
    ///
    /// # Safety
    ///
    /// Aliasing handles bypass the ownership the drivers rely on; callers
    /// must ensure only one of them is used at a time.
    pub unsafe fn steal() -> Self {
        Self {
            mwu: Mwu::from_ptr(pac::MWU::ptr()),
            gpiote: Gpiote::from_ptr(pac::GPIOTE::ptr()),
            gpio: Gpio::from_ptrs(pac::P0::ptr(), pac::P1::ptr()),
        }
    }
}
