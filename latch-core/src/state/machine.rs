//! Channel state machine definition
//!
//! ```text
//! Uninit --Bind--> Init --Enable--> Enabled <--Enable/Disable--> Disabled
//!    ^                                                             |
//!    +--------------------------- Release (from any state) --------+
//! ```

use super::events::ChannelEvent;
use crate::error::GpioteError;

/// Channel states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelState {
    /// Not bound to any pin
    #[default]
    Uninit,
    /// Bound to a pin, event/task not yet enabled
    Init,
    /// Event sensing or task control active
    Enabled,
    /// Bound, event sensing or task control switched off
    Disabled,
}

/// Direction a channel was bound with; fixed until the channel is released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Event on pin transitions
    Input,
    /// Pin driven by tasks or GPIO
    Output,
}

impl ChannelState {
    /// Check if the channel owns a pin
    pub fn is_bound(&self) -> bool {
        !matches!(self, ChannelState::Uninit)
    }

    /// Check if event sensing or task control is active
    pub fn is_enabled(&self) -> bool {
        matches!(self, ChannelState::Enabled)
    }

    /// Process an event and return the next state
    ///
    /// Binding an already bound channel and enabling or disabling an
    /// unbound one are rejected. Release is accepted from every state,
    /// which makes it idempotent.
    pub fn transition(self, event: ChannelEvent) -> Result<Self, GpioteError> {
        use ChannelEvent::*;
        use ChannelState::*;

        match (self, event) {
            (Uninit, Bind) => Ok(Init),
            (Init | Enabled | Disabled, Bind) => Err(GpioteError::InvalidState),

            (Uninit, Enable | Disable) => Err(GpioteError::InvalidState),
            (Init | Enabled | Disabled, Enable) => Ok(Enabled),
            (Init | Enabled | Disabled, Disable) => Ok(Disabled),

            (_, Release) => Ok(Uninit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_lifecycle() {
        let state = ChannelState::default();
        assert!(!state.is_bound());

        let state = state.transition(ChannelEvent::Bind).unwrap();
        assert_eq!(state, ChannelState::Init);
        assert!(state.is_bound());
        assert!(!state.is_enabled());

        let state = state.transition(ChannelEvent::Enable).unwrap();
        assert!(state.is_enabled());

        let state = state.transition(ChannelEvent::Disable).unwrap();
        assert_eq!(state, ChannelState::Disabled);

        let state = state.transition(ChannelEvent::Enable).unwrap();
        assert_eq!(state, ChannelState::Enabled);

        let state = state.transition(ChannelEvent::Release).unwrap();
        assert_eq!(state, ChannelState::Uninit);
    }

    #[test]
    fn test_unbound_rejects_enable_disable() {
        assert_eq!(
            ChannelState::Uninit.transition(ChannelEvent::Enable),
            Err(GpioteError::InvalidState)
        );
        assert_eq!(
            ChannelState::Uninit.transition(ChannelEvent::Disable),
            Err(GpioteError::InvalidState)
        );
    }

    #[test]
    fn test_double_bind_rejected() {
        assert_eq!(
            ChannelState::Enabled.transition(ChannelEvent::Bind),
            Err(GpioteError::InvalidState)
        );
    }

    #[test]
    fn test_disable_twice_is_noop() {
        let state = ChannelState::Enabled
            .transition(ChannelEvent::Disable)
            .unwrap();
        assert_eq!(state.transition(ChannelEvent::Disable), Ok(state));
    }

    fn any_state() -> impl Strategy<Value = ChannelState> {
        prop_oneof![
            Just(ChannelState::Uninit),
            Just(ChannelState::Init),
            Just(ChannelState::Enabled),
            Just(ChannelState::Disabled),
        ]
    }

    fn any_event() -> impl Strategy<Value = ChannelEvent> {
        prop_oneof![
            Just(ChannelEvent::Bind),
            Just(ChannelEvent::Enable),
            Just(ChannelEvent::Disable),
            Just(ChannelEvent::Release),
        ]
    }

    proptest! {
        #[test]
        fn release_is_idempotent(state in any_state()) {
            let once = state.transition(ChannelEvent::Release).unwrap();
            let twice = once.transition(ChannelEvent::Release).unwrap();
            prop_assert_eq!(once, ChannelState::Uninit);
            prop_assert_eq!(twice, ChannelState::Uninit);
        }

        #[test]
        fn never_returns_to_init(
            start in any_state(),
            events in proptest::collection::vec(any_event(), 0..16),
        ) {
            // Init is only reachable by binding an unbound channel
            let mut state = start;
            for event in events {
                let previous = state;
                if let Ok(next) = state.transition(event) {
                    if next == ChannelState::Init {
                        prop_assert_eq!(previous, ChannelState::Uninit);
                        prop_assert_eq!(event, ChannelEvent::Bind);
                    }
                    state = next;
                }
            }
        }
    }
}
