//! Opcode table for the NMOS 6502/6507.
//!
//! The table is built at compile time and shared by every CPU instance.
//! Base cycle counts include the phantom accesses that write and
//! read-modify-write instructions always pay; only page-sensitive reads and
//! branches can cost more than `base_cycles`.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// No operand, or the accumulator
    Implied,
    Immediate,
    Relative,
    Absolute,
    ZeroPage,
    /// JMP only
    Indirect,
    IndexedZeroPageX,
    IndexedZeroPageY,
    /// (zp,X)
    PreIndexedIndirect,
    /// (zp),Y
    PostIndexedIndirect,
    AbsoluteIndexedX,
    AbsoluteIndexedY,
}

/// What an instruction does with its effective address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    Read,
    Write,
    /// Read-modify-write
    Rmw,
    Flow,
    Subroutine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum Mnemonic {
    ADC, AND, ASL, BCC, BCS, BEQ, BIT, BMI, BNE, BPL, BRK, BVC, BVS, CLC,
    CLD, CLI, CLV, CMP, CPX, CPY, DEC, DEX, DEY, EOR, INC, INX, INY, JMP,
    JSR, LDA, LDX, LDY, LSR, NOP, ORA, PHA, PHP, PLA, PLP, ROL, ROR, RTI,
    RTS, SBC, SEC, SED, SEI, STA, STX, STY, TAX, TAY, TSX, TXA, TXS, TYA,
    // undocumented
    DCP, ISB, LAX, RLA, RRA, SAX, SLO, SRE,
}

impl Mnemonic {
    pub fn name(self) -> &'static str {
        use Mnemonic::*;
        match self {
            ADC => "ADC", AND => "AND", ASL => "ASL", BCC => "BCC", BCS => "BCS",
            BEQ => "BEQ", BIT => "BIT", BMI => "BMI", BNE => "BNE", BPL => "BPL",
            BRK => "BRK", BVC => "BVC", BVS => "BVS", CLC => "CLC", CLD => "CLD",
            CLI => "CLI", CLV => "CLV", CMP => "CMP", CPX => "CPX", CPY => "CPY",
            DEC => "DEC", DEX => "DEX", DEY => "DEY", EOR => "EOR", INC => "INC",
            INX => "INX", INY => "INY", JMP => "JMP", JSR => "JSR", LDA => "LDA",
            LDX => "LDX", LDY => "LDY", LSR => "LSR", NOP => "NOP", ORA => "ORA",
            PHA => "PHA", PHP => "PHP", PLA => "PLA", PLP => "PLP", ROL => "ROL",
            ROR => "ROR", RTI => "RTI", RTS => "RTS", SBC => "SBC", SEC => "SEC",
            SED => "SED", SEI => "SEI", STA => "STA", STX => "STX", STY => "STY",
            TAX => "TAX", TAY => "TAY", TSX => "TSX", TXA => "TXA", TXS => "TXS",
            TYA => "TYA", DCP => "DCP", ISB => "ISB", LAX => "LAX", RLA => "RLA",
            RRA => "RRA", SAX => "SAX", SLO => "SLO", SRE => "SRE",
        }
    }

    pub fn is_branch(self) -> bool {
        use Mnemonic::*;
        matches!(self, BCC | BCS | BEQ | BMI | BNE | BPL | BVC | BVS)
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionDefinition {
    pub opcode: u8,
    pub mnemonic: Mnemonic,
    pub addressing_mode: AddressingMode,
    pub byte_length: u8,
    pub base_cycles: u8,
    pub page_sensitive: bool,
    pub effect: Effect,
    pub undocumented: bool,
}

/// Look up the definition for an opcode byte.
#[inline]
pub fn lookup(opcode: u8) -> Option<&'static InstructionDefinition> {
    TABLE[opcode as usize].as_ref()
}

/// Every assigned opcode, in table order
pub fn definitions() -> &'static [InstructionDefinition] {
    DEFINITIONS
}

static TABLE: [Option<InstructionDefinition>; 256] = build_table();

const fn build_table() -> [Option<InstructionDefinition>; 256] {
    let mut table = [None; 256];
    let mut i = 0;
    while i < DEFINITIONS.len() {
        let def = DEFINITIONS[i];
        table[def.opcode as usize] = Some(def);
        i += 1;
    }
    table
}

const fn op(
    opcode: u8,
    mnemonic: Mnemonic,
    byte_length: u8,
    base_cycles: u8,
    addressing_mode: AddressingMode,
    page_sensitive: bool,
    effect: Effect,
) -> InstructionDefinition {
    InstructionDefinition {
        opcode,
        mnemonic,
        addressing_mode,
        byte_length,
        base_cycles,
        page_sensitive,
        effect,
        undocumented: false,
    }
}

const fn undoc(
    opcode: u8,
    mnemonic: Mnemonic,
    byte_length: u8,
    base_cycles: u8,
    addressing_mode: AddressingMode,
    page_sensitive: bool,
    effect: Effect,
) -> InstructionDefinition {
    let mut def = op(opcode, mnemonic, byte_length, base_cycles, addressing_mode, page_sensitive, effect);
    def.undocumented = true;
    def
}

use AddressingMode::{
    Absolute as ABS, AbsoluteIndexedX as ABX, AbsoluteIndexedY as ABY, Immediate as IMM,
    Implied as IMP, IndexedZeroPageX as ZPX, IndexedZeroPageY as ZPY, Indirect as IND,
    PostIndexedIndirect as IZY, PreIndexedIndirect as IZX, Relative as REL, ZeroPage as ZP,
};
use Effect::{Flow, Read, Rmw, Subroutine, Write};
use Mnemonic::*;

#[rustfmt::skip]
const DEFINITIONS: &[InstructionDefinition] = &[
    op(0x69, ADC, 2, 2, IMM, false, Read),
    op(0x65, ADC, 2, 3, ZP,  false, Read),
    op(0x75, ADC, 2, 4, ZPX, false, Read),
    op(0x6D, ADC, 3, 4, ABS, false, Read),
    op(0x7D, ADC, 3, 4, ABX, true,  Read),
    op(0x79, ADC, 3, 4, ABY, true,  Read),
    op(0x61, ADC, 2, 6, IZX, false, Read),
    op(0x71, ADC, 2, 5, IZY, true,  Read),

    op(0x29, AND, 2, 2, IMM, false, Read),
    op(0x25, AND, 2, 3, ZP,  false, Read),
    op(0x35, AND, 2, 4, ZPX, false, Read),
    op(0x2D, AND, 3, 4, ABS, false, Read),
    op(0x3D, AND, 3, 4, ABX, true,  Read),
    op(0x39, AND, 3, 4, ABY, true,  Read),
    op(0x21, AND, 2, 6, IZX, false, Read),
    op(0x31, AND, 2, 5, IZY, true,  Read),

    op(0x0A, ASL, 1, 2, IMP, false, Rmw),
    op(0x06, ASL, 2, 5, ZP,  false, Rmw),
    op(0x16, ASL, 2, 6, ZPX, false, Rmw),
    op(0x0E, ASL, 3, 6, ABS, false, Rmw),
    op(0x1E, ASL, 3, 7, ABX, false, Rmw),

    op(0x90, BCC, 2, 2, REL, true, Flow),
    op(0xB0, BCS, 2, 2, REL, true, Flow),
    op(0xF0, BEQ, 2, 2, REL, true, Flow),
    op(0x30, BMI, 2, 2, REL, true, Flow),
    op(0xD0, BNE, 2, 2, REL, true, Flow),
    op(0x10, BPL, 2, 2, REL, true, Flow),
    op(0x50, BVC, 2, 2, REL, true, Flow),
    op(0x70, BVS, 2, 2, REL, true, Flow),

    op(0x24, BIT, 2, 3, ZP,  false, Read),
    op(0x2C, BIT, 3, 4, ABS, false, Read),

    op(0x00, BRK, 1, 7, IMP, false, Flow),

    op(0x18, CLC, 1, 2, IMP, false, Read),
    op(0xD8, CLD, 1, 2, IMP, false, Read),
    op(0x58, CLI, 1, 2, IMP, false, Read),
    op(0xB8, CLV, 1, 2, IMP, false, Read),

    op(0xC9, CMP, 2, 2, IMM, false, Read),
    op(0xC5, CMP, 2, 3, ZP,  false, Read),
    op(0xD5, CMP, 2, 4, ZPX, false, Read),
    op(0xCD, CMP, 3, 4, ABS, false, Read),
    op(0xDD, CMP, 3, 4, ABX, true,  Read),
    op(0xD9, CMP, 3, 4, ABY, true,  Read),
    op(0xC1, CMP, 2, 6, IZX, false, Read),
    op(0xD1, CMP, 2, 5, IZY, true,  Read),

    op(0xE0, CPX, 2, 2, IMM, false, Read),
    op(0xE4, CPX, 2, 3, ZP,  false, Read),
    op(0xEC, CPX, 3, 4, ABS, false, Read),

    op(0xC0, CPY, 2, 2, IMM, false, Read),
    op(0xC4, CPY, 2, 3, ZP,  false, Read),
    op(0xCC, CPY, 3, 4, ABS, false, Read),

    op(0xC6, DEC, 2, 5, ZP,  false, Rmw),
    op(0xD6, DEC, 2, 6, ZPX, false, Rmw),
    op(0xCE, DEC, 3, 6, ABS, false, Rmw),
    op(0xDE, DEC, 3, 7, ABX, false, Rmw),

    op(0xCA, DEX, 1, 2, IMP, false, Read),
    op(0x88, DEY, 1, 2, IMP, false, Read),

    op(0x49, EOR, 2, 2, IMM, false, Read),
    op(0x45, EOR, 2, 3, ZP,  false, Read),
    op(0x55, EOR, 2, 4, ZPX, false, Read),
    op(0x4D, EOR, 3, 4, ABS, false, Read),
    op(0x5D, EOR, 3, 4, ABX, true,  Read),
    op(0x59, EOR, 3, 4, ABY, true,  Read),
    op(0x41, EOR, 2, 6, IZX, false, Read),
    op(0x51, EOR, 2, 5, IZY, true,  Read),

    op(0xE6, INC, 2, 5, ZP,  false, Rmw),
    op(0xF6, INC, 2, 6, ZPX, false, Rmw),
    op(0xEE, INC, 3, 6, ABS, false, Rmw),
    op(0xFE, INC, 3, 7, ABX, false, Rmw),

    op(0xE8, INX, 1, 2, IMP, false, Read),
    op(0xC8, INY, 1, 2, IMP, false, Read),

    op(0x4C, JMP, 3, 3, ABS, false, Flow),
    op(0x6C, JMP, 3, 5, IND, false, Flow),

    op(0x20, JSR, 3, 6, ABS, false, Subroutine),

    op(0xA9, LDA, 2, 2, IMM, false, Read),
    op(0xA5, LDA, 2, 3, ZP,  false, Read),
    op(0xB5, LDA, 2, 4, ZPX, false, Read),
    op(0xAD, LDA, 3, 4, ABS, false, Read),
    op(0xBD, LDA, 3, 4, ABX, true,  Read),
    op(0xB9, LDA, 3, 4, ABY, true,  Read),
    op(0xA1, LDA, 2, 6, IZX, false, Read),
    op(0xB1, LDA, 2, 5, IZY, true,  Read),

    op(0xA2, LDX, 2, 2, IMM, false, Read),
    op(0xA6, LDX, 2, 3, ZP,  false, Read),
    op(0xB6, LDX, 2, 4, ZPY, false, Read),
    op(0xAE, LDX, 3, 4, ABS, false, Read),
    op(0xBE, LDX, 3, 4, ABY, true,  Read),

    op(0xA0, LDY, 2, 2, IMM, false, Read),
    op(0xA4, LDY, 2, 3, ZP,  false, Read),
    op(0xB4, LDY, 2, 4, ZPX, false, Read),
    op(0xAC, LDY, 3, 4, ABS, false, Read),
    op(0xBC, LDY, 3, 4, ABX, true,  Read),

    op(0x4A, LSR, 1, 2, IMP, false, Rmw),
    op(0x46, LSR, 2, 5, ZP,  false, Rmw),
    op(0x56, LSR, 2, 6, ZPX, false, Rmw),
    op(0x4E, LSR, 3, 6, ABS, false, Rmw),
    op(0x5E, LSR, 3, 7, ABX, false, Rmw),

    op(0xEA, NOP, 1, 2, IMP, false, Read),

    op(0x09, ORA, 2, 2, IMM, false, Read),
    op(0x05, ORA, 2, 3, ZP,  false, Read),
    op(0x15, ORA, 2, 4, ZPX, false, Read),
    op(0x0D, ORA, 3, 4, ABS, false, Read),
    op(0x1D, ORA, 3, 4, ABX, true,  Read),
    op(0x19, ORA, 3, 4, ABY, true,  Read),
    op(0x01, ORA, 2, 6, IZX, false, Read),
    op(0x11, ORA, 2, 5, IZY, true,  Read),

    op(0x48, PHA, 1, 3, IMP, false, Write),
    op(0x08, PHP, 1, 3, IMP, false, Write),
    op(0x68, PLA, 1, 4, IMP, false, Read),
    op(0x28, PLP, 1, 4, IMP, false, Read),

    op(0x2A, ROL, 1, 2, IMP, false, Rmw),
    op(0x26, ROL, 2, 5, ZP,  false, Rmw),
    op(0x36, ROL, 2, 6, ZPX, false, Rmw),
    op(0x2E, ROL, 3, 6, ABS, false, Rmw),
    op(0x3E, ROL, 3, 7, ABX, false, Rmw),

    op(0x6A, ROR, 1, 2, IMP, false, Rmw),
    op(0x66, ROR, 2, 5, ZP,  false, Rmw),
    op(0x76, ROR, 2, 6, ZPX, false, Rmw),
    op(0x6E, ROR, 3, 6, ABS, false, Rmw),
    op(0x7E, ROR, 3, 7, ABX, false, Rmw),

    op(0x40, RTI, 1, 6, IMP, false, Flow),
    op(0x60, RTS, 1, 6, IMP, false, Subroutine),

    op(0xE9, SBC, 2, 2, IMM, false, Read),
    op(0xE5, SBC, 2, 3, ZP,  false, Read),
    op(0xF5, SBC, 2, 4, ZPX, false, Read),
    op(0xED, SBC, 3, 4, ABS, false, Read),
    op(0xFD, SBC, 3, 4, ABX, true,  Read),
    op(0xF9, SBC, 3, 4, ABY, true,  Read),
    op(0xE1, SBC, 2, 6, IZX, false, Read),
    op(0xF1, SBC, 2, 5, IZY, true,  Read),

    op(0x38, SEC, 1, 2, IMP, false, Read),
    op(0xF8, SED, 1, 2, IMP, false, Read),
    op(0x78, SEI, 1, 2, IMP, false, Read),

    op(0x85, STA, 2, 3, ZP,  false, Write),
    op(0x95, STA, 2, 4, ZPX, false, Write),
    op(0x8D, STA, 3, 4, ABS, false, Write),
    op(0x9D, STA, 3, 5, ABX, false, Write),
    op(0x99, STA, 3, 5, ABY, false, Write),
    op(0x81, STA, 2, 6, IZX, false, Write),
    op(0x91, STA, 2, 6, IZY, false, Write),

    op(0x86, STX, 2, 3, ZP,  false, Write),
    op(0x96, STX, 2, 4, ZPY, false, Write),
    op(0x8E, STX, 3, 4, ABS, false, Write),

    op(0x84, STY, 2, 3, ZP,  false, Write),
    op(0x94, STY, 2, 4, ZPX, false, Write),
    op(0x8C, STY, 3, 4, ABS, false, Write),

    op(0xAA, TAX, 1, 2, IMP, false, Read),
    op(0xA8, TAY, 1, 2, IMP, false, Read),
    op(0xBA, TSX, 1, 2, IMP, false, Read),
    op(0x8A, TXA, 1, 2, IMP, false, Read),
    op(0x9A, TXS, 1, 2, IMP, false, Read),
    op(0x98, TYA, 1, 2, IMP, false, Read),

    undoc(0xA7, LAX, 2, 3, ZP,  false, Read),
    undoc(0xB7, LAX, 2, 4, ZPY, false, Read),
    undoc(0xAF, LAX, 3, 4, ABS, false, Read),
    undoc(0xBF, LAX, 3, 4, ABY, true,  Read),
    undoc(0xA3, LAX, 2, 6, IZX, false, Read),
    undoc(0xB3, LAX, 2, 5, IZY, true,  Read),

    undoc(0x87, SAX, 2, 3, ZP,  false, Write),
    undoc(0x97, SAX, 2, 4, ZPY, false, Write),
    undoc(0x8F, SAX, 3, 4, ABS, false, Write),
    undoc(0x83, SAX, 2, 6, IZX, false, Write),

    undoc(0xC7, DCP, 2, 5, ZP,  false, Rmw),
    undoc(0xD7, DCP, 2, 6, ZPX, false, Rmw),
    undoc(0xCF, DCP, 3, 6, ABS, false, Rmw),
    undoc(0xDF, DCP, 3, 7, ABX, false, Rmw),
    undoc(0xDB, DCP, 3, 7, ABY, false, Rmw),
    undoc(0xC3, DCP, 2, 8, IZX, false, Rmw),
    undoc(0xD3, DCP, 2, 8, IZY, false, Rmw),

    undoc(0xE7, ISB, 2, 5, ZP,  false, Rmw),
    undoc(0xF7, ISB, 2, 6, ZPX, false, Rmw),
    undoc(0xEF, ISB, 3, 6, ABS, false, Rmw),
    undoc(0xFF, ISB, 3, 7, ABX, false, Rmw),
    undoc(0xFB, ISB, 3, 7, ABY, false, Rmw),
    undoc(0xE3, ISB, 2, 8, IZX, false, Rmw),
    undoc(0xF3, ISB, 2, 8, IZY, false, Rmw),

    undoc(0x07, SLO, 2, 5, ZP,  false, Rmw),
    undoc(0x17, SLO, 2, 6, ZPX, false, Rmw),
    undoc(0x0F, SLO, 3, 6, ABS, false, Rmw),
    undoc(0x1F, SLO, 3, 7, ABX, false, Rmw),
    undoc(0x1B, SLO, 3, 7, ABY, false, Rmw),
    undoc(0x03, SLO, 2, 8, IZX, false, Rmw),
    undoc(0x13, SLO, 2, 8, IZY, false, Rmw),

    undoc(0x27, RLA, 2, 5, ZP,  false, Rmw),
    undoc(0x37, RLA, 2, 6, ZPX, false, Rmw),
    undoc(0x2F, RLA, 3, 6, ABS, false, Rmw),
    undoc(0x3F, RLA, 3, 7, ABX, false, Rmw),
    undoc(0x3B, RLA, 3, 7, ABY, false, Rmw),
    undoc(0x23, RLA, 2, 8, IZX, false, Rmw),
    undoc(0x33, RLA, 2, 8, IZY, false, Rmw),

    undoc(0x47, SRE, 2, 5, ZP,  false, Rmw),
    undoc(0x57, SRE, 2, 6, ZPX, false, Rmw),
    undoc(0x4F, SRE, 3, 6, ABS, false, Rmw),
    undoc(0x5F, SRE, 3, 7, ABX, false, Rmw),
    undoc(0x5B, SRE, 3, 7, ABY, false, Rmw),
    undoc(0x43, SRE, 2, 8, IZX, false, Rmw),
    undoc(0x53, SRE, 2, 8, IZY, false, Rmw),

    undoc(0x67, RRA, 2, 5, ZP,  false, Rmw),
    undoc(0x77, RRA, 2, 6, ZPX, false, Rmw),
    undoc(0x6F, RRA, 3, 6, ABS, false, Rmw),
    undoc(0x7F, RRA, 3, 7, ABX, false, Rmw),
    undoc(0x7B, RRA, 3, 7, ABY, false, Rmw),
    undoc(0x63, RRA, 2, 8, IZX, false, Rmw),
    undoc(0x73, RRA, 2, 8, IZY, false, Rmw),

    undoc(0xEB, SBC, 2, 2, IMM, false, Read),

    undoc(0x1A, NOP, 1, 2, IMP, false, Read),
    undoc(0x3A, NOP, 1, 2, IMP, false, Read),
    undoc(0x5A, NOP, 1, 2, IMP, false, Read),
    undoc(0x7A, NOP, 1, 2, IMP, false, Read),
    undoc(0xDA, NOP, 1, 2, IMP, false, Read),
    undoc(0xFA, NOP, 1, 2, IMP, false, Read),
    undoc(0x80, NOP, 2, 2, IMM, false, Read),
    undoc(0x82, NOP, 2, 2, IMM, false, Read),
    undoc(0x89, NOP, 2, 2, IMM, false, Read),
    undoc(0xC2, NOP, 2, 2, IMM, false, Read),
    undoc(0xE2, NOP, 2, 2, IMM, false, Read),
    undoc(0x04, NOP, 2, 3, ZP,  false, Read),
    undoc(0x44, NOP, 2, 3, ZP,  false, Read),
    undoc(0x64, NOP, 2, 3, ZP,  false, Read),
    undoc(0x14, NOP, 2, 4, ZPX, false, Read),
    undoc(0x34, NOP, 2, 4, ZPX, false, Read),
    undoc(0x54, NOP, 2, 4, ZPX, false, Read),
    undoc(0x74, NOP, 2, 4, ZPX, false, Read),
    undoc(0xD4, NOP, 2, 4, ZPX, false, Read),
    undoc(0xF4, NOP, 2, 4, ZPX, false, Read),
    undoc(0x0C, NOP, 3, 4, ABS, false, Read),
    undoc(0x1C, NOP, 3, 4, ABX, true,  Read),
    undoc(0x3C, NOP, 3, 4, ABX, true,  Read),
    undoc(0x5C, NOP, 3, 4, ABX, true,  Read),
    undoc(0x7C, NOP, 3, 4, ABX, true,  Read),
    undoc(0xDC, NOP, 3, 4, ABX, true,  Read),
    undoc(0xFC, NOP, 3, 4, ABX, true,  Read),
];
