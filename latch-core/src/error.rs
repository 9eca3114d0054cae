//! Error types
//!
//! Every failure is local and synchronous; nothing is retried. Each driver
//! has its own error enum and both convert into [`Error`] for code that
//! uses the two drivers together.

use core::fmt;

/// Memory Watch Unit errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MwuError {
    /// Region set references an undefined region, or the operation does not
    /// apply to this kind of region
    InvalidRegion,
    /// Region start address lies after its end address
    InvalidRange,
}

/// GPIOTE driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioteError {
    /// Operation not allowed in the current driver or channel state
    InvalidState,
    /// Channel (or port-event slot) pool exhausted
    NoChannelAvailable,
    /// Pin already owned by another channel
    PinAlreadyBound,
    /// Pin number outside the package
    InvalidPin,
}

/// Any Latch driver error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Memory Watch Unit error
    Mwu(MwuError),
    /// GPIOTE error
    Gpiote(GpioteError),
}

impl From<MwuError> for Error {
    fn from(e: MwuError) -> Self {
        Error::Mwu(e)
    }
}

impl From<GpioteError> for Error {
    fn from(e: GpioteError) -> Self {
        Error::Gpiote(e)
    }
}

impl fmt::Display for MwuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MwuError::InvalidRegion => f.write_str("invalid region"),
            MwuError::InvalidRange => f.write_str("region start after end"),
        }
    }
}

impl fmt::Display for GpioteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpioteError::InvalidState => f.write_str("invalid state"),
            GpioteError::NoChannelAvailable => f.write_str("no channel available"),
            GpioteError::PinAlreadyBound => f.write_str("pin already bound"),
            GpioteError::InvalidPin => f.write_str("invalid pin"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Mwu(e) => write!(f, "mwu: {}", e),
            Error::Gpiote(e) => write!(f, "gpiote: {}", e),
        }
    }
}
