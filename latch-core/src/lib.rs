//! Board-agnostic core logic for the Latch drivers
//!
//! This crate contains everything the drivers need that does not touch
//! registers:
//!
//! - Error kinds shared by both drivers
//! - Channel lifecycle state machine
//! - Pin ownership tracking
//! - Driver and board configuration types

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod pins;
pub mod state;

pub use error::{Error, GpioteError, MwuError};
