//! Processor status register (NV-BDIZC)

use std::fmt;

pub const FLAG_CARRY: u8 = 0x01;
pub const FLAG_ZERO: u8 = 0x02;
pub const FLAG_INTERRUPT_DISABLE: u8 = 0x04;
pub const FLAG_DECIMAL: u8 = 0x08;
pub const FLAG_BREAK: u8 = 0x10;
/// Bit 5 has no latch and always reads back as 1
pub const FLAG_UNUSED: u8 = 0x20;
pub const FLAG_OVERFLOW: u8 = 0x40;
pub const FLAG_SIGN: u8 = 0x80;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusRegister {
    pub carry: bool,
    pub zero: bool,
    pub interrupt_disable: bool,
    pub decimal_mode: bool,
    pub break_command: bool,
    pub overflow: bool,
    pub sign: bool,
}

impl StatusRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear every flag.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn to_byte(&self) -> u8 {
        let mut v = FLAG_UNUSED;
        if self.carry {
            v |= FLAG_CARRY;
        }
        if self.zero {
            v |= FLAG_ZERO;
        }
        if self.interrupt_disable {
            v |= FLAG_INTERRUPT_DISABLE;
        }
        if self.decimal_mode {
            v |= FLAG_DECIMAL;
        }
        if self.break_command {
            v |= FLAG_BREAK;
        }
        if self.overflow {
            v |= FLAG_OVERFLOW;
        }
        if self.sign {
            v |= FLAG_SIGN;
        }
        v
    }

    pub fn from_byte(v: u8) -> Self {
        Self {
            carry: v & FLAG_CARRY != 0,
            zero: v & FLAG_ZERO != 0,
            interrupt_disable: v & FLAG_INTERRUPT_DISABLE != 0,
            decimal_mode: v & FLAG_DECIMAL != 0,
            break_command: v & FLAG_BREAK != 0,
            overflow: v & FLAG_OVERFLOW != 0,
            sign: v & FLAG_SIGN != 0,
        }
    }

    /// Set Zero and Sign from an 8-bit result
    #[inline]
    pub fn set_zero_and_sign(&mut self, v: u8) {
        self.zero = v == 0;
        self.sign = v & 0x80 != 0;
    }
}

impl fmt::Display for StatusRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |set: bool, c: char| if set { c.to_ascii_uppercase() } else { c };
        write!(
            f,
            "{}{}-{}{}{}{}{}",
            flag(self.sign, 's'),
            flag(self.overflow, 'v'),
            flag(self.break_command, 'b'),
            flag(self.decimal_mode, 'd'),
            flag(self.interrupt_disable, 'i'),
            flag(self.zero, 'z'),
            flag(self.carry, 'c'),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unused_bit_always_serialised() {
        assert_eq!(StatusRegister::new().to_byte(), FLAG_UNUSED);
    }

    #[test]
    fn byte_round_trip() {
        for v in 0..=255u8 {
            assert_eq!(StatusRegister::from_byte(v).to_byte(), v | FLAG_UNUSED);
        }
    }

    #[test]
    fn zero_and_sign_from_value() {
        let mut p = StatusRegister::new();
        p.set_zero_and_sign(0);
        assert!(p.zero && !p.sign);
        p.set_zero_and_sign(0x80);
        assert!(!p.zero && p.sign);
    }

    #[test]
    fn display_marks_set_flags_uppercase() {
        let p = StatusRegister::from_byte(FLAG_SIGN | FLAG_CARRY | FLAG_DECIMAL);
        assert_eq!(p.to_string(), "Sv-bDizC");
    }
}
