//! Per-instruction execution record

use std::fmt;

use super::register::Operand;
use super::table::{AddressingMode, Effect, InstructionDefinition};

pub const BUG_JMP_INDIRECT: &str = "indirect addressing bug (JMP bug)";
pub const BUG_ZERO_PAGE_INDEX: &str = "zero page index bug";

/// What happened during one `execute_instruction` call.
///
/// Only a finalized trace describes a completed instruction; a trace left
/// behind by a failed call shows how far the instruction got. A call made
/// while the ready line is held returns a stall trace: no definition, one
/// stalled cycle, never finalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionTrace {
    pub pc_at_fetch: u16,
    /// `None` for a stall
    pub definition: Option<&'static InstructionDefinition>,
    /// Operand bytes as they appear after the opcode (branch offsets are
    /// sign-extended to a word)
    pub operand: Option<Operand>,
    /// Effective address, for modes that produce one
    pub address: Option<u16>,
    /// Cycles spent on bus accesses, the opcode fetch included
    pub actual_cycles: u32,
    /// Cycles spent waiting on the ready line; 1 for a stall
    pub stalled_cycles: u32,
    pub page_fault: bool,
    pub bug: Option<&'static str>,
    finalized: bool,
}

impl ExecutionTrace {
    /// A fresh trace; the opcode fetch cycle is counted by the caller.
    pub(crate) fn new(pc_at_fetch: u16, definition: &'static InstructionDefinition) -> Self {
        Self {
            pc_at_fetch,
            definition: Some(definition),
            operand: None,
            address: None,
            actual_cycles: 0,
            stalled_cycles: 0,
            page_fault: false,
            bug: None,
            finalized: false,
        }
    }

    /// One held cycle at the instruction boundary; nothing was fetched.
    pub(crate) fn stall(pc: u16) -> Self {
        Self {
            pc_at_fetch: pc,
            definition: None,
            operand: None,
            address: None,
            actual_cycles: 0,
            stalled_cycles: 1,
            page_fault: false,
            bug: None,
            finalized: false,
        }
    }

    #[inline]
    pub fn is_stall(&self) -> bool {
        self.definition.is_none()
    }

    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub(crate) fn finalize(&mut self) {
        debug_assert!(!self.finalized, "trace finalized twice");
        self.finalized = true;
    }

    /// Cycles the instruction took including ready-line stalls
    pub fn total_cycles(&self) -> u32 {
        self.actual_cycles + self.stalled_cycles
    }

    fn write_operand(&self, def: &InstructionDefinition, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.operand.map(Operand::value).unwrap_or(0);
        match def.addressing_mode {
            AddressingMode::Implied => {
                if def.effect == Effect::Rmw {
                    write!(f, " A")?;
                }
                Ok(())
            }
            AddressingMode::Immediate => write!(f, " #${:02X}", value),
            AddressingMode::Relative => {
                let target = self
                    .pc_at_fetch
                    .wrapping_add(def.byte_length as u16)
                    .wrapping_add(value);
                write!(f, " ${:04X}", target)
            }
            AddressingMode::ZeroPage => write!(f, " ${:02X}", value),
            AddressingMode::IndexedZeroPageX => write!(f, " ${:02X},X", value),
            AddressingMode::IndexedZeroPageY => write!(f, " ${:02X},Y", value),
            AddressingMode::Absolute => write!(f, " ${:04X}", value),
            AddressingMode::AbsoluteIndexedX => write!(f, " ${:04X},X", value),
            AddressingMode::AbsoluteIndexedY => write!(f, " ${:04X},Y", value),
            AddressingMode::Indirect => write!(f, " (${:04X})", value),
            AddressingMode::PreIndexedIndirect => write!(f, " (${:02X},X)", value),
            AddressingMode::PostIndexedIndirect => write!(f, " (${:02X}),Y", value),
        }
    }
}

impl fmt::Display for ExecutionTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(def) = self.definition else {
            return write!(f, "${:04X}  <stalled>", self.pc_at_fetch);
        };
        write!(f, "${:04X}  {}", self.pc_at_fetch, def.mnemonic)?;
        self.write_operand(def, f)?;
        if !self.finalized {
            return write!(f, "  <incomplete>");
        }
        write!(f, "  [{}]", self.actual_cycles)?;
        if self.stalled_cycles > 0 {
            write!(f, " +{} stalled", self.stalled_cycles)?;
        }
        if self.page_fault {
            write!(f, " page fault")?;
        }
        if let Some(bug) = self.bug {
            write!(f, " ({})", bug)?;
        }
        Ok(())
    }
}
