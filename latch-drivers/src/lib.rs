//! Drivers for the nRF52840 Memory Watch Unit and GPIOTE
//!
//! Both drivers are generic over the register traits in `latch-hal`:
//!
//! - [`mwu::WatchUnit`] - region watching, event latches, interrupt masks
//! - [`gpiote::Gpiote`] - input event channels and output task channels with
//!   per-channel lifecycle and pin ownership
//!
//! Neither driver blocks; every operation is a bounded sequence of register
//! accesses. Sharing a driver between thread mode and its interrupt handler
//! is the caller's job.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod gpiote;
pub mod mwu;

#[cfg(test)]
mod fake;

pub use gpiote::{ChannelHandle, EventHandler, Gpiote};
pub use mwu::{RegionInfo, WatchUnit};
