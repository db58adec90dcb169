//! Fixed-width register cells.
//!
//! Every register is a masked integer: the stored value never exceeds the
//! register's width, whatever operation or operand width produced it.

use std::fmt;

/// Width of a [`Register`] in bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Bits8,
    Bits16,
}

impl Width {
    #[inline]
    fn mask(self) -> u16 {
        match self {
            Width::Bits8 => 0x00FF,
            Width::Bits16 => 0xFFFF,
        }
    }

    #[inline]
    fn sign_bit(self) -> u16 {
        match self {
            Width::Bits8 => 0x0080,
            Width::Bits16 => 0x8000,
        }
    }
}

/// A value fed into a register operation.
///
/// The operand is always masked to the width of the receiving register, so
/// `Word(0x1234)` added to an 8-bit register contributes `0x34`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Byte(u8),
    Word(u16),
}

impl Operand {
    #[inline]
    pub fn value(self) -> u16 {
        match self {
            Operand::Byte(v) => v as u16,
            Operand::Word(v) => v,
        }
    }
}

impl From<u8> for Operand {
    fn from(v: u8) -> Self {
        Operand::Byte(v)
    }
}

impl From<u16> for Operand {
    fn from(v: u16) -> Self {
        Operand::Word(v)
    }
}

impl From<&Register> for Operand {
    fn from(r: &Register) -> Self {
        match r.width {
            Width::Bits8 => Operand::Byte(r.value as u8),
            Width::Bits16 => Operand::Word(r.value),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Byte(v) => write!(f, "${:02X}", v),
            Operand::Word(v) => write!(f, "${:04X}", v),
        }
    }
}

/// Flags left by a packed BCD operation.
///
/// On the NMOS part these do not all follow the stored value, so they are
/// reported separately instead of being derived from the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalFlags {
    pub carry: bool,
    pub overflow: bool,
    pub zero: bool,
    pub sign: bool,
}

/// Masked integer register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Register {
    value: u16,
    width: Width,
}

impl Register {
    pub fn new(width: Width) -> Self {
        Self { value: 0, width }
    }

    /// An 8-bit register (A, X, Y, SP)
    pub fn byte() -> Self {
        Self::new(Width::Bits8)
    }

    /// A 16-bit register (PC)
    pub fn word() -> Self {
        Self::new(Width::Bits16)
    }

    #[inline]
    pub fn width(&self) -> Width {
        self.width
    }

    #[inline]
    pub fn mask(&self) -> u16 {
        self.width.mask()
    }

    #[inline]
    pub fn value(&self) -> u16 {
        self.value
    }

    /// Low eight bits of the value
    #[inline]
    pub fn to_u8(&self) -> u8 {
        self.value as u8
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.value == 0
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.value & self.width.sign_bit() != 0
    }

    #[inline]
    fn masked(&self, v: impl Into<Operand>) -> u16 {
        v.into().value() & self.mask()
    }

    #[inline]
    pub fn load(&mut self, v: impl Into<Operand>) {
        self.value = self.masked(v);
    }

    /// Masked addition with optional unit carry-in.
    ///
    /// Returns `(carry, overflow)`. Overflow is set when both operands had the
    /// same sign and the result's sign differs from it.
    pub fn add(&mut self, v: impl Into<Operand>, carry_in: bool) -> (bool, bool) {
        let mask = self.mask() as u32;
        let sign = self.width.sign_bit() as u32;
        let lhs = self.value as u32;
        let rhs = self.masked(v) as u32;

        let sum = lhs + rhs + carry_in as u32;
        let result = sum & mask;
        let carry = sum > mask;
        let overflow = (!(lhs ^ rhs) & (lhs ^ result) & sign) != 0;

        self.value = result as u16;
        (carry, overflow)
    }

    /// Two's-complement subtraction built on [`Register::add`].
    ///
    /// `carry_in` means "no borrow"; the returned carry is likewise set when
    /// no borrow occurred.
    pub fn subtract(&mut self, v: impl Into<Operand>, carry_in: bool) -> (bool, bool) {
        let inverted = !self.masked(v) & self.mask();
        self.add(Operand::Word(inverted), carry_in)
    }

    /// Packed BCD addition (8-bit registers).
    ///
    /// Nibbles above 9 are not sanitised: the result is whatever the nibble
    /// arithmetic produces, as on the NMOS part. Sign and overflow are taken
    /// from the intermediate result before the high nibble is adjusted, and
    /// zero from the plain binary sum.
    pub fn add_decimal(&mut self, v: impl Into<Operand>, carry_in: bool) -> DecimalFlags {
        debug_assert_eq!(self.width, Width::Bits8);
        let a = self.value & 0xFF;
        let m = self.masked(v) & 0xFF;

        let mut lo = (a & 0x0F) + (m & 0x0F) + carry_in as u16;
        if lo > 0x09 {
            lo += 0x06;
        }
        let mut hi = (a >> 4) + (m >> 4) + u16::from(lo > 0x0F);

        let intermediate = ((hi << 4) | (lo & 0x0F)) & 0xFF;
        let overflow = (!(a ^ m) & (a ^ intermediate) & 0x80) != 0;
        let sign = intermediate & 0x80 != 0;
        let zero = (a + m + carry_in as u16) & 0xFF == 0;

        if hi > 0x09 {
            hi += 0x06;
        }
        let carry = hi > 0x0F;

        self.value = (((hi << 4) | (lo & 0x0F)) & 0xFF) & self.mask();
        DecimalFlags {
            carry,
            overflow,
            zero,
            sign,
        }
    }

    /// Packed BCD subtraction (8-bit registers).
    ///
    /// Every flag comes from the equivalent binary subtraction; only the
    /// stored value is decimal-adjusted.
    pub fn subtract_decimal(&mut self, v: impl Into<Operand>, carry_in: bool) -> DecimalFlags {
        debug_assert_eq!(self.width, Width::Bits8);
        let m = self.masked(v) & 0xFF;
        let a = (self.value & 0xFF) as i16;
        let borrow = i16::from(!carry_in);

        let mut binary = *self;
        let (carry, overflow) = binary.subtract(Operand::Word(m), carry_in);
        let flags = DecimalFlags {
            carry,
            overflow,
            zero: binary.is_zero(),
            sign: binary.is_negative(),
        };

        let m = m as i16;
        let mut lo = (a & 0x0F) - (m & 0x0F) - borrow;
        let mut hi = (a >> 4) - (m >> 4);
        if lo & 0x10 != 0 {
            lo -= 0x06;
            hi -= 1;
        }
        if hi & 0x10 != 0 {
            hi -= 0x06;
        }

        self.value = (((hi << 4) | (lo & 0x0F)) as u16) & 0xFF & self.mask();
        flags
    }

    pub fn and(&mut self, v: impl Into<Operand>) {
        self.value &= self.masked(v);
    }

    pub fn or(&mut self, v: impl Into<Operand>) {
        self.value |= self.masked(v);
    }

    pub fn xor(&mut self, v: impl Into<Operand>) {
        self.value ^= self.masked(v);
    }

    /// Shift left one bit; returns the bit shifted out.
    pub fn asl(&mut self) -> bool {
        let out = self.is_negative();
        self.value = (self.value << 1) & self.mask();
        out
    }

    /// Logical shift right one bit; returns the bit shifted out.
    pub fn lsr(&mut self) -> bool {
        let out = self.value & 1 != 0;
        self.value >>= 1;
        out
    }

    /// Rotate left through carry; returns the bit shifted out.
    pub fn rol(&mut self, carry_in: bool) -> bool {
        let out = self.asl();
        if carry_in {
            self.value |= 1;
        }
        out
    }

    /// Rotate right through carry; returns the bit shifted out.
    pub fn ror(&mut self, carry_in: bool) -> bool {
        let out = self.lsr();
        if carry_in {
            self.value |= self.width.sign_bit();
        }
        out
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.width {
            Width::Bits8 => write!(f, "{:02X}", self.value),
            Width::Bits16 => write!(f, "{:04X}", self.value),
        }
    }
}
