//! Events that trigger channel state transitions

/// Events that can trigger channel state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelEvent {
    /// Channel bound to a pin (`in_init`/`out_init`)
    Bind,
    /// Event or task enabled
    Enable,
    /// Event or task disabled
    Disable,
    /// Pin binding released (`uninit`)
    Release,
}
