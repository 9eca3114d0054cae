//! Handles to PAC register blocks

use core::fmt;
use core::marker::PhantomData;
use core::ops::Deref;

/// A PAC register block at a fixed address
///
/// Holds the address rather than a reference so the handle stays `Send`
/// and can live in a static shared with interrupt handlers.
pub(crate) struct Regs<T> {
    addr: usize,
    _block: PhantomData<fn() -> T>,
}

impl<T> Regs<T> {
    /// # Safety
    ///
    /// `ptr` must point to a register block (or memory laid out like one)
    /// that stays valid for as long as the handle is used.
    pub(crate) unsafe fn new(ptr: *const T) -> Self {
        Self {
            addr: ptr as usize,
            _block: PhantomData,
        }
    }

    #[inline(always)]
    pub(crate) fn addr(&self) -> usize {
        self.addr
    }
}

impl<T> Deref for Regs<T> {
    type Target = T;

    #[inline(always)]
    fn deref(&self) -> &T {
        // SAFETY: validity of the address is the constructor's contract
        unsafe { &*(self.addr as *const T) }
    }
}

impl<T> fmt::Debug for Regs<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Regs({:#010x})", self.addr)
    }
}

/// Write a raw value to a register
macro_rules! write_bits {
    ($reg:expr, $value:expr) => {
        // SAFETY: every bit pattern is accepted by the registers written here
        $reg.write(|w| unsafe { w.bits($value) })
    };
}

/// Clear an event register
///
/// The read back makes sure the write has reached the peripheral before
/// an interrupt handler returns, so the event does not re-trigger it.
macro_rules! clear_event {
    ($reg:expr) => {{
        $crate::mmio::write_bits!($reg, 0);
        let _ = $reg.read().bits();
    }};
}

pub(crate) use {clear_event, write_bits};

#[cfg(test)]
pub(crate) mod ram {
    //! RAM-backed register blocks for host tests

    use core::ptr::{read_volatile, write_volatile};

    /// Words of backing memory per fake block (0x800 bytes)
    pub const WORDS: usize = 0x200;

    /// Backing memory for one register block
    #[repr(C, align(4))]
    pub struct Ram {
        words: [u32; WORDS],
    }

    impl Ram {
        pub fn new() -> Self {
            Self { words: [0; WORDS] }
        }

        /// Base address of the block; all later accesses go through it
        pub fn base(&mut self) -> usize {
            self.words.as_mut_ptr() as usize
        }
    }

    /// Read a word of a RAM block through its base address
    pub fn peek(base: usize, offset: usize) -> u32 {
        assert!(offset < WORDS * 4);
        // SAFETY: offset checked against the backing array
        unsafe { read_volatile((base + offset) as *const u32) }
    }

    /// Write a word of a RAM block through its base address
    pub fn poke(base: usize, offset: usize, value: u32) {
        assert!(offset < WORDS * 4);
        // SAFETY: offset checked against the backing array
        unsafe { write_volatile((base + offset) as *mut u32, value) }
    }
}
