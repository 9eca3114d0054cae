//! Pin ownership tracking
//!
//! A pin may be bound to at most one channel at a time. The allocator keeps
//! one bit per pin across both GPIO ports.

use latch_hal::Pin;

use crate::error::GpioteError;

/// Pin allocator to track pin ownership
#[derive(Debug, Clone, Default)]
pub struct PinAllocator {
    /// Bitmask of allocated pins (bit n = pin n)
    allocated: u64,
}

impl PinAllocator {
    /// Create a new pin allocator with every pin free
    pub const fn new() -> Self {
        Self { allocated: 0 }
    }

    /// Claim a pin
    pub fn allocate(&mut self, pin: Pin) -> Result<(), GpioteError> {
        let mask = Self::mask(pin);
        if self.allocated & mask != 0 {
            return Err(GpioteError::PinAlreadyBound);
        }
        self.allocated |= mask;
        Ok(())
    }

    /// Claim a pin by number
    pub fn allocate_number(&mut self, number: u8) -> Result<Pin, GpioteError> {
        let pin = Pin::new(number).ok_or(GpioteError::InvalidPin)?;
        self.allocate(pin)?;
        Ok(pin)
    }

    /// Release a pin; releasing a free pin does nothing
    pub fn release(&mut self, pin: Pin) {
        self.allocated &= !Self::mask(pin);
    }

    /// Check if a pin is claimed
    pub fn is_allocated(&self, pin: Pin) -> bool {
        self.allocated & Self::mask(pin) != 0
    }

    /// Number of claimed pins
    pub fn count(&self) -> u32 {
        self.allocated.count_ones()
    }

    /// Release every pin
    pub fn clear(&mut self) {
        self.allocated = 0;
    }

    fn mask(pin: Pin) -> u64 {
        1 << pin.number()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latch_hal::gpio::PIN_COUNT;
    use proptest::prelude::*;

    #[test]
    fn test_allocate_release() {
        let mut pins = PinAllocator::new();
        let p = Pin::new(17).unwrap();

        assert!(pins.allocate(p).is_ok());
        assert!(pins.is_allocated(p));
        assert_eq!(pins.allocate(p), Err(GpioteError::PinAlreadyBound));

        pins.release(p);
        assert!(!pins.is_allocated(p));
        pins.release(p);
        assert!(pins.allocate(p).is_ok());
    }

    #[test]
    fn test_invalid_pin_number() {
        let mut pins = PinAllocator::new();
        assert_eq!(pins.allocate_number(48), Err(GpioteError::InvalidPin));
        assert_eq!(pins.allocate_number(47).map(|p| p.number()), Ok(47));
        assert_eq!(pins.count(), 1);
    }

    proptest! {
        #[test]
        fn second_claim_always_fails(number in 0u8..PIN_COUNT, other in 0u8..PIN_COUNT) {
            let mut pins = PinAllocator::new();
            pins.allocate_number(number).unwrap();
            let second = pins.allocate_number(other);
            if other == number {
                prop_assert_eq!(second, Err(GpioteError::PinAlreadyBound));
            } else {
                prop_assert!(second.is_ok());
                prop_assert_eq!(pins.count(), 2);
            }
        }
    }
}
