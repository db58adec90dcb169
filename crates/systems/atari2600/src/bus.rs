//! Atari 2600 memory bus implementation
//!
//! The 6507 has a 13-bit address bus (8KB addressable space), decoded on
//! three address lines:
//! - A12=1: Cartridge ROM ($1000-$1FFF)
//! - A12=0, A7=0: TIA registers ($00-$7F and mirrors)
//! - A12=0, A7=1, A9=0: RIOT RAM, 128 bytes ($80-$FF, mirrored at $180-$1FF
//!   where the stack lives)
//! - A12=0, A7=1, A9=1: RIOT I/O and timer ($280-$29F and mirrors)
//!
//! Only RAM, ROM and the TIA WSYNC strobe are modelled. Other chip
//! registers report an unmapped access and the CPU's addressing policy
//! decides what happens.

use vcs_core::cpu_6502::{Bus6502, BusFault, ReadyLine};
use vcs_core::logging::{log, LogCategory, LogLevel};

use crate::cartridge::Cartridge;

const ADDRESS_MASK: u16 = 0x1FFF;
/// TIA write register that halts the CPU until the next scanline
const WSYNC: u16 = 0x02;

/// Atari 2600 memory bus
#[derive(Debug)]
pub struct Atari2600Bus {
    ram: [u8; 128],
    cartridge: Option<Cartridge>,
    ready: ReadyLine,
    wsync_count: u64,
}

impl Default for Atari2600Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Atari2600Bus {
    /// Create a new bus with its own (unconnected) ready line
    pub fn new() -> Self {
        Self {
            ram: [0; 128],
            cartridge: None,
            ready: ReadyLine::new(),
            wsync_count: 0,
        }
    }

    /// Drive `line` on WSYNC strobes; normally the CPU's own ready line
    pub fn connect_ready(&mut self, line: ReadyLine) {
        self.ready = line;
    }

    pub fn load_cartridge(&mut self, cartridge: Cartridge) {
        self.cartridge = Some(cartridge);
    }

    pub fn eject_cartridge(&mut self) -> Option<Cartridge> {
        self.cartridge.take()
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    /// Clear RAM and counters; the cartridge stays inserted
    pub fn reset(&mut self) {
        self.ram = [0; 128];
        self.wsync_count = 0;
    }

    /// RIOT RAM, indexed from $80
    pub fn ram(&self) -> &[u8; 128] {
        &self.ram
    }

    /// Number of WSYNC strobes since reset
    pub fn wsync_count(&self) -> u64 {
        self.wsync_count
    }

    #[inline]
    fn is_cartridge(addr: u16) -> bool {
        addr & 0x1000 != 0
    }

    #[inline]
    fn is_tia(addr: u16) -> bool {
        addr & 0x0080 == 0
    }

    #[inline]
    fn is_ram(addr: u16) -> bool {
        addr & 0x0200 == 0
    }
}

impl Bus6502 for Atari2600Bus {
    fn read(&mut self, addr: u16) -> Result<u8, BusFault> {
        let addr = addr & ADDRESS_MASK;

        if Self::is_cartridge(addr) {
            return self
                .cartridge
                .as_ref()
                .map(|cart| cart.read(addr))
                .ok_or(BusFault::Unreadable(addr));
        }
        if Self::is_tia(addr) {
            // Collision and input registers are not modelled
            return Err(BusFault::Unreadable(addr));
        }
        if Self::is_ram(addr) {
            return Ok(self.ram[(addr & 0x7F) as usize]);
        }
        Err(BusFault::Unreadable(addr))
    }

    fn write(&mut self, addr: u16, val: u8) -> Result<(), BusFault> {
        let addr = addr & ADDRESS_MASK;

        if Self::is_cartridge(addr) {
            return Err(BusFault::Unwritable(addr));
        }
        if Self::is_tia(addr) {
            if addr & 0x3F == WSYNC {
                self.wsync_count += 1;
                self.ready.hold();
                log(LogCategory::Bus, LogLevel::Trace, || {
                    format!("WSYNC strobe at {:04X}", addr)
                });
                return Ok(());
            }
            return Err(BusFault::Unwritable(addr));
        }
        if Self::is_ram(addr) {
            self.ram[(addr & 0x7F) as usize] = val;
            return Ok(());
        }
        Err(BusFault::Unwritable(addr))
    }
}
