//! Latch Hardware Abstraction Layer
//!
//! This crate defines register-level traits for the peripherals the Latch
//! drivers manage. A chip crate implements them over memory-mapped I/O;
//! the drivers only ever see the traits, so the same driver logic runs
//! against real registers on the target and against fake register blocks
//! in host tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (latch-firmware, etc.)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  latch-drivers (WatchUnit, Gpiote)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  latch-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │  latch-hal-   │
//!             │   nrf52840    │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`mwu::MwuHal`] - Memory Watch Unit events, masks and regions
//! - [`gpiote::GpioteHal`] - GPIOTE tasks, events and channel configuration
//! - [`gpio::GpioHal`] - Pin configuration, level and sense

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod gpiote;
pub mod mwu;

// Re-export key traits at crate root for convenience
pub use gpio::{GpioHal, Level, Pin, Pull, Sense};
pub use gpiote::{Channel, ChannelConfig, GpioteHal, GpioteInterrupts, Polarity};
pub use mwu::{Access, MwuEvent, MwuHal, MwuInterrupts, Region, RegionWatch};
