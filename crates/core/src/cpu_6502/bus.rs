//! The CPU's view of the outside world: the address bus, the per-cycle
//! clock callback and the ready line.

use std::cell::Cell;
use std::rc::Rc;
use thiserror::Error;

/// Failure reported by a bus participant or by the cycle clock
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusFault {
    #[error("address {0:#06X} is not readable")]
    Unreadable(u16),
    #[error("address {0:#06X} is not writable")]
    Unwritable(u16),
    /// A chip-level failure; never swallowed by the CPU
    #[error("device failure: {0}")]
    Device(String),
}

impl BusFault {
    /// Unmapped-location faults, the ones non-strict addressing ignores
    pub fn is_unmapped(&self) -> bool {
        matches!(self, BusFault::Unreadable(_) | BusFault::Unwritable(_))
    }
}

/// Memory interface for the 6502 family
///
/// Implemented by whatever sits on the address bus (RAM, chip registers,
/// cartridge mappers). Reads take `&mut self` because reading a chip register
/// can have side effects.
pub trait Bus6502 {
    fn read(&mut self, addr: u16) -> Result<u8, BusFault>;

    fn write(&mut self, addr: u16, val: u8) -> Result<(), BusFault>;
}

/// Invoked once per consumed machine cycle, after that cycle's bus access.
///
/// Sibling chips advance their own state inside `tick` before returning, so
/// cycle N is complete before the CPU performs cycle N+1's bus access.
pub trait CycleClock {
    fn tick(&mut self) -> Result<(), BusFault>;
}

impl<F> CycleClock for F
where
    F: FnMut() -> Result<(), BusFault>,
{
    #[inline]
    fn tick(&mut self) -> Result<(), BusFault> {
        self()
    }
}

/// Clock for callers with no sibling chips to advance
#[derive(Debug, Default, Clone, Copy)]
pub struct NullClock;

impl CycleClock for NullClock {
    #[inline]
    fn tick(&mut self) -> Result<(), BusFault> {
        Ok(())
    }
}

/// The RDY input.
///
/// Clones share one line. A chip pulls it with [`ReadyLine::hold`] (the TIA
/// does this on a WSYNC strobe) and lets go with [`ReadyLine::release`]. The
/// handle is deliberately `!Send`: a CPU core and its chips run on one
/// thread of control.
#[derive(Debug, Clone)]
pub struct ReadyLine(Rc<Cell<bool>>);

impl Default for ReadyLine {
    fn default() -> Self {
        Self(Rc::new(Cell::new(true)))
    }
}

impl ReadyLine {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.0.get()
    }

    pub fn hold(&self) {
        self.0.set(false);
    }

    pub fn release(&self) {
        self.0.set(true);
    }

    pub fn set(&self, ready: bool) {
        self.0.set(ready);
    }
}

/// Flat 64K memory, handy for tests and benchmarks
#[derive(Debug, Clone)]
pub struct ArrayMemory {
    pub data: Box<[u8; 0x10000]>,
}

impl ArrayMemory {
    pub fn new() -> Self {
        Self {
            data: Box::new([0; 0x10000]),
        }
    }

    /// Load a program into memory and point the reset vector at it
    pub fn load_program(&mut self, offset: u16, program: &[u8]) {
        let off = offset as usize;
        self.data[off..off + program.len()].copy_from_slice(program);
        let [lo, hi] = offset.to_le_bytes();
        self.data[0xFFFC] = lo;
        self.data[0xFFFD] = hi;
    }
}

impl Default for ArrayMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus6502 for ArrayMemory {
    fn read(&mut self, addr: u16) -> Result<u8, BusFault> {
        Ok(self.data[addr as usize])
    }

    fn write(&mut self, addr: u16, val: u8) -> Result<(), BusFault> {
        self.data[addr as usize] = val;
        Ok(())
    }
}
