//! Atari 2600 cartridge handling
//!
//! Only the plain ROM formats are supported:
//! - 2K: No banking, mirrored twice across $1000-$1FFF
//! - 4K: No banking, fills $1000-$1FFF
//!
//! 8K and larger images need a bank-switching mapper and are rejected.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartridgeError {
    #[error("Invalid ROM size: {0} bytes")]
    InvalidSize(usize),
    #[error("Unsupported banking scheme for a {0} byte ROM")]
    UnsupportedBanking(usize),
}

/// ROM layouts that need no mapper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RomLayout {
    /// 2K ROM, mirrored
    Rom2K,
    /// 4K ROM
    Rom4K,
}

/// Atari 2600 cartridge
#[derive(Debug, Clone)]
pub struct Cartridge {
    rom: Vec<u8>,
    layout: RomLayout,
}

impl Cartridge {
    /// Create a new cartridge from ROM data
    pub fn new(rom: Vec<u8>) -> Result<Self, CartridgeError> {
        let layout = Self::detect_layout(&rom)?;
        Ok(Self { rom, layout })
    }

    fn detect_layout(rom: &[u8]) -> Result<RomLayout, CartridgeError> {
        match rom.len() {
            2048 => Ok(RomLayout::Rom2K),
            4096 => Ok(RomLayout::Rom4K),
            // F8, FA, F6 and F4 bank-switched images
            8192 | 12288 | 16384 | 32768 => Err(CartridgeError::UnsupportedBanking(rom.len())),
            n => Err(CartridgeError::InvalidSize(n)),
        }
    }

    /// Read from the cartridge window; only the low address bits are decoded
    pub fn read(&self, addr: u16) -> u8 {
        let offset = match self.layout {
            RomLayout::Rom2K => addr & 0x07FF,
            RomLayout::Rom4K => addr & 0x0FFF,
        };
        self.rom[offset as usize]
    }

    pub fn layout(&self) -> RomLayout {
        self.layout
    }

    /// ROM size in bytes
    pub fn size(&self) -> usize {
        self.rom.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_2k_cartridge_is_mirrored() {
        let mut rom = vec![0x00; 2048];
        rom[0] = 0x42;
        rom[2047] = 0x24;
        let cart = Cartridge::new(rom).unwrap();

        assert_eq!(cart.layout(), RomLayout::Rom2K);
        assert_eq!(cart.read(0xF000), 0x42);
        assert_eq!(cart.read(0xF800), 0x42);
        assert_eq!(cart.read(0xF7FF), 0x24);
        assert_eq!(cart.read(0xFFFF), 0x24);
    }

    #[test]
    fn test_4k_cartridge() {
        let mut rom = vec![0x00; 4096];
        rom[0] = 0x12;
        rom[4095] = 0x34;
        let cart = Cartridge::new(rom).unwrap();

        assert_eq!(cart.layout(), RomLayout::Rom4K);
        assert_eq!(cart.size(), 4096);
        assert_eq!(cart.read(0xF000), 0x12);
        assert_eq!(cart.read(0x1FFF), 0x34);
        assert_eq!(cart.read(0xFFFF), 0x34);
    }

    #[test]
    fn test_bank_switched_sizes_are_unsupported() {
        for size in [8192, 12288, 16384, 32768] {
            assert_eq!(
                Cartridge::new(vec![0; size]).unwrap_err(),
                CartridgeError::UnsupportedBanking(size)
            );
        }
    }

    #[test]
    fn test_invalid_rom_size() {
        assert_eq!(
            Cartridge::new(vec![0x00; 1000]).unwrap_err(),
            CartridgeError::InvalidSize(1000)
        );
        assert!(Cartridge::new(Vec::new()).is_err());
    }
}
