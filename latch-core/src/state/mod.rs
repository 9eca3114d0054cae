//! Channel lifecycle
//!
//! Every GPIOTE channel (hardware channel or port-event slot) moves through
//! the same explicit, finite state machine. Drivers apply events and only
//! touch registers once the transition is accepted.

pub mod events;
pub mod machine;

pub use events::ChannelEvent;
pub use machine::{ChannelState, Direction};
