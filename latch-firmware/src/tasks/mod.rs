//! Embassy async tasks
//!
//! Each task waits on a signal raised by an interrupt handler.

pub mod button;
pub mod watch;

pub use button::button_task;
pub use watch::watch_task;
