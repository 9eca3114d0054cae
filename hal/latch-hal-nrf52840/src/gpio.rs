//! GPIO ports P0 and P1

use latch_hal::gpio::pin_cnf;
use latch_hal::{GpioHal, Level, Pin, Pull, Sense};
use nrf52840_pac::p0::RegisterBlock;

use crate::mmio::{write_bits, Regs};

/// Both GPIO ports of the nRF52840
#[derive(Debug)]
pub struct Gpio {
    p0: Regs<RegisterBlock>,
    p1: Regs<RegisterBlock>,
}

impl Gpio {
    /// Create a handle for the GPIO port register blocks at `p0` and `p1`
    ///
    /// # Safety
    ///
    /// Both pointers must point to GPIO port register blocks and the handle
    /// must be the only one in use for them.
    pub unsafe fn from_ptrs(p0: *const RegisterBlock, p1: *const RegisterBlock) -> Self {
        Self {
            p0: Regs::new(p0),
            p1: Regs::new(p1),
        }
    }

    fn port(&self, pin: Pin) -> &RegisterBlock {
        if pin.port() == 0 {
            &self.p0
        } else {
            &self.p1
        }
    }

    fn cnf(&self, pin: Pin) -> u32 {
        self.port(pin).pin_cnf[pin.index() as usize].read().bits()
    }

    fn set_cnf(&mut self, pin: Pin, cnf: u32) {
        write_bits!(self.port(pin).pin_cnf[pin.index() as usize], cnf);
    }
}

impl GpioHal for Gpio {
    fn configure_input(&mut self, pin: Pin, pull: Pull) {
        write_bits!(self.port(pin).dirclr, pin.port_mask());
        self.set_cnf(pin, pull.bits() << pin_cnf::PULL_SHIFT);
    }

    fn configure_output(&mut self, pin: Pin, initial: Level, connect_input: bool) {
        self.write(pin, initial);
        let mut cnf = pin_cnf::DIR_OUTPUT;
        if !connect_input {
            cnf |= pin_cnf::INPUT_DISCONNECT;
        }
        self.set_cnf(pin, cnf);
        write_bits!(self.port(pin).dirset, pin.port_mask());
    }

    fn connect_input(&mut self, pin: Pin) {
        let cnf = self.cnf(pin) & !pin_cnf::INPUT_DISCONNECT;
        self.set_cnf(pin, cnf);
    }

    fn disconnect(&mut self, pin: Pin) {
        write_bits!(self.port(pin).dirclr, pin.port_mask());
        self.set_cnf(pin, pin_cnf::DEFAULT);
    }

    fn set_sense(&mut self, pin: Pin, sense: Sense) {
        let cnf = self.cnf(pin) & !pin_cnf::SENSE_MASK;
        self.set_cnf(pin, cnf | (sense.bits() << pin_cnf::SENSE_SHIFT));
    }

    fn sense(&self, pin: Pin) -> Sense {
        Sense::from_bits(self.cnf(pin) >> pin_cnf::SENSE_SHIFT)
    }

    fn read(&self, pin: Pin) -> Level {
        Level::from(self.port(pin).in_.read().bits() & pin.port_mask() != 0)
    }

    fn set_high(&mut self, pin: Pin) {
        write_bits!(self.port(pin).outset, pin.port_mask());
    }

    fn set_low(&mut self, pin: Pin) {
        write_bits!(self.port(pin).outclr, pin.port_mask());
    }

    fn output_level(&self, pin: Pin) -> Level {
        Level::from(self.port(pin).out.read().bits() & pin.port_mask() != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mmio::ram::{peek, poke, Ram};

    fn pin(n: u8) -> Pin {
        Pin::new(n).unwrap()
    }

    #[test]
    fn test_port_selection() {
        let (mut r0, mut r1) = (Ram::new(), Ram::new());
        let (b0, b1) = (r0.base(), r1.base());
        let mut gpio = unsafe { Gpio::from_ptrs(b0 as *const _, b1 as *const _) };

        gpio.set_high(pin(3));
        gpio.set_high(pin(35));
        assert_eq!(peek(b0, 0x508), 1 << 3);
        assert_eq!(peek(b1, 0x508), 1 << 3);

        gpio.set_low(pin(47));
        assert_eq!(peek(b1, 0x50C), 1 << 15);
        assert_eq!(peek(b0, 0x50C), 0);
    }

    #[test]
    fn test_configure_input() {
        let (mut r0, mut r1) = (Ram::new(), Ram::new());
        let (b0, b1) = (r0.base(), r1.base());
        let mut gpio = unsafe { Gpio::from_ptrs(b0 as *const _, b1 as *const _) };

        poke(b0, 0x700 + 4 * 6, pin_cnf::DEFAULT);
        gpio.configure_input(pin(6), Pull::Up);
        assert_eq!(peek(b0, 0x718), 0b1100);
        assert_eq!(peek(b0, 0x51C), 1 << 6);
    }

    #[test]
    fn test_configure_output_as_watcher() {
        let (mut r0, mut r1) = (Ram::new(), Ram::new());
        let (b0, b1) = (r0.base(), r1.base());
        let mut gpio = unsafe { Gpio::from_ptrs(b0 as *const _, b1 as *const _) };

        gpio.configure_output(pin(10), Level::High, true);
        assert_eq!(peek(b0, 0x728), pin_cnf::DIR_OUTPUT);
        assert_eq!(peek(b0, 0x508), 1 << 10);
        assert_eq!(peek(b0, 0x518), 1 << 10);

        gpio.configure_output(pin(11), Level::Low, false);
        assert_eq!(
            peek(b0, 0x72C),
            pin_cnf::DIR_OUTPUT | pin_cnf::INPUT_DISCONNECT
        );
        gpio.connect_input(pin(11));
        assert_eq!(peek(b0, 0x72C), pin_cnf::DIR_OUTPUT);
    }

    #[test]
    fn test_sense_field() {
        let (mut r0, mut r1) = (Ram::new(), Ram::new());
        let (b0, b1) = (r0.base(), r1.base());
        let mut gpio = unsafe { Gpio::from_ptrs(b0 as *const _, b1 as *const _) };

        gpio.configure_input(pin(33), Pull::Down);
        gpio.set_sense(pin(33), Sense::Low);
        assert_eq!(peek(b1, 0x704), 0x3_0004);
        assert_eq!(gpio.sense(pin(33)), Sense::Low);

        gpio.set_sense(pin(33), Sense::Disabled);
        assert_eq!(peek(b1, 0x704), 0x0_0004);
    }

    #[test]
    fn test_levels() {
        let (mut r0, mut r1) = (Ram::new(), Ram::new());
        let (b0, b1) = (r0.base(), r1.base());
        let gpio = unsafe { Gpio::from_ptrs(b0 as *const _, b1 as *const _) };

        poke(b0, 0x510, 1 << 4);
        poke(b1, 0x504, 1 << 1);
        assert_eq!(gpio.read(pin(4)), Level::High);
        assert_eq!(gpio.read(pin(5)), Level::Low);
        assert_eq!(gpio.output_level(pin(33)), Level::High);
    }
}
