//! NVIC helpers for the MWU and GPIOTE interrupts

use cortex_m::interrupt::InterruptNumber;
use cortex_m::peripheral::NVIC;

/// Number of priority bits implemented by the nRF52840
pub const PRIORITY_BITS: u8 = 3;

/// Interrupt lines used by the Latch drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum Interrupt {
    /// GPIOTE
    Gpiote = 6,
    /// Memory Watch Unit
    Mwu = 32,
}

// SAFETY: the discriminants are the nRF52840 IRQ numbers
unsafe impl InterruptNumber for Interrupt {
    #[inline(always)]
    fn number(self) -> u16 {
        self as u16
    }
}

/// Convert a logical priority (0 = highest, 7 = lowest) to the NVIC value
pub const fn priority_bits(priority: u8) -> u8 {
    let max = (1 << PRIORITY_BITS) - 1;
    let priority = if priority > max { max } else { priority };
    priority << (8 - PRIORITY_BITS)
}

/// Clear any pending request and enable the interrupt at `priority`
///
/// # Safety
///
/// Unmasking can break mask-based critical sections; the interrupt
/// handler must be ready to run.
pub unsafe fn enable(nvic: &mut NVIC, irq: Interrupt, priority: u8) {
    NVIC::unpend(irq);
    nvic.set_priority(irq, priority_bits(priority));
    NVIC::unmask(irq);
}

/// Mask the interrupt and clear any pending request
pub fn disable(irq: Interrupt) {
    NVIC::mask(irq);
    NVIC::unpend(irq);
}

/// Check whether the interrupt is pending
pub fn is_pending(irq: Interrupt) -> bool {
    NVIC::is_pending(irq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_encoding() {
        assert_eq!(priority_bits(0), 0x00);
        assert_eq!(priority_bits(2), 0x40);
        assert_eq!(priority_bits(7), 0xE0);
        assert_eq!(priority_bits(200), 0xE0);
    }

    #[test]
    fn test_irq_numbers() {
        assert_eq!(Interrupt::Gpiote.number(), 6);
        assert_eq!(Interrupt::Mwu.number(), 32);
    }
}
