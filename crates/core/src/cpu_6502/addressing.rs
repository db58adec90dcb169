//! Effective-address resolution, one bus cycle at a time.

use super::bus::{Bus6502, CycleClock};
use super::error::CpuError;
use super::register::Operand;
use super::table::{AddressingMode, Effect, InstructionDefinition, Mnemonic};
use super::trace::{ExecutionTrace, BUG_JMP_INDIRECT, BUG_ZERO_PAGE_INDEX};
use super::Cpu6502;

/// What the addressing phase hands to the executor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Resolved {
    /// Implied and accumulator forms
    None,
    Immediate(u8),
    /// Sign-extended branch offset
    Offset(u16),
    Address(u16),
    /// JSR has only read the low byte of its target at this point
    TargetLow(u8),
}

impl<B: Bus6502> Cpu6502<B> {
    pub(super) fn resolve<C: CycleClock>(
        &mut self,
        def: &'static InstructionDefinition,
        trace: &mut ExecutionTrace,
        clock: &mut C,
    ) -> Result<Resolved, CpuError> {
        match def.addressing_mode {
            AddressingMode::Implied => {
                if def.mnemonic == Mnemonic::BRK {
                    // BRK skips the padding byte after the opcode
                    self.fetch(clock)?;
                } else {
                    self.read_cycle(self.pc_value(), clock)?;
                }
                Ok(Resolved::None)
            }
            AddressingMode::Immediate => {
                let v = self.fetch(clock)?;
                trace.operand = Some(Operand::Byte(v));
                Ok(Resolved::Immediate(v))
            }
            AddressingMode::Relative => {
                let v = self.fetch(clock)?;
                self.acc16.load(v);
                if v & 0x80 != 0 {
                    self.acc16.or(0xFF00u16);
                }
                let offset = self.acc16.value();
                trace.operand = Some(Operand::Word(offset));
                Ok(Resolved::Offset(offset))
            }
            AddressingMode::ZeroPage => {
                let zp = self.fetch(clock)?;
                trace.operand = Some(Operand::Byte(zp));
                Ok(self.effective(trace, zp as u16))
            }
            AddressingMode::Absolute => {
                let lo = self.fetch(clock)?;
                if def.effect == Effect::Subroutine {
                    return Ok(Resolved::TargetLow(lo));
                }
                let hi = self.fetch(clock)?;
                let addr = u16::from_le_bytes([lo, hi]);
                trace.operand = Some(Operand::Word(addr));
                Ok(self.effective(trace, addr))
            }
            AddressingMode::Indirect => {
                let lo = self.fetch(clock)?;
                let hi = self.fetch(clock)?;
                let ptr = u16::from_le_bytes([lo, hi]);
                trace.operand = Some(Operand::Word(ptr));

                let target_lo = self.read_cycle(ptr, clock)?;
                // The pointer increment never carries into the high byte
                self.acc8.load(lo);
                let (carry, _) = self.acc8.add(1u8, false);
                if carry {
                    trace.bug = Some(BUG_JMP_INDIRECT);
                }
                let hi_ptr = (ptr & 0xFF00) | self.acc8.value();
                let target_hi = self.read_cycle(hi_ptr, clock)?;
                Ok(self.effective(trace, u16::from_le_bytes([target_lo, target_hi])))
            }
            AddressingMode::IndexedZeroPageX | AddressingMode::IndexedZeroPageY => {
                let base = self.fetch(clock)?;
                trace.operand = Some(Operand::Byte(base));
                self.read_cycle(base as u16, clock)?;

                let index = if def.addressing_mode == AddressingMode::IndexedZeroPageX {
                    Operand::from(&self.x)
                } else {
                    Operand::from(&self.y)
                };
                self.acc8.load(base);
                let (carry, _) = self.acc8.add(index, false);
                if carry {
                    trace.bug = Some(BUG_ZERO_PAGE_INDEX);
                }
                Ok(self.effective(trace, self.acc8.value()))
            }
            AddressingMode::PreIndexedIndirect => {
                let zp = self.fetch(clock)?;
                trace.operand = Some(Operand::Byte(zp));
                self.read_cycle(zp as u16, clock)?;

                self.acc8.load(zp);
                self.acc8.add(&self.x, false);
                let lo = self.read_cycle(self.acc8.value(), clock)?;
                self.acc8.add(1u8, false);
                let hi = self.read_cycle(self.acc8.value(), clock)?;
                Ok(self.effective(trace, u16::from_le_bytes([lo, hi])))
            }
            AddressingMode::PostIndexedIndirect => {
                let zp = self.fetch(clock)?;
                trace.operand = Some(Operand::Byte(zp));

                let lo = self.read_cycle(zp as u16, clock)?;
                self.acc8.load(zp);
                self.acc8.add(1u8, false);
                let hi = self.read_cycle(self.acc8.value(), clock)?;
                let index = Operand::from(&self.y);
                self.indexed(def, trace, u16::from_le_bytes([lo, hi]), index, clock)
            }
            AddressingMode::AbsoluteIndexedX | AddressingMode::AbsoluteIndexedY => {
                let lo = self.fetch(clock)?;
                let hi = self.fetch(clock)?;
                let base = u16::from_le_bytes([lo, hi]);
                trace.operand = Some(Operand::Word(base));

                let index = if def.addressing_mode == AddressingMode::AbsoluteIndexedX {
                    Operand::from(&self.x)
                } else {
                    Operand::from(&self.y)
                };
                self.indexed(def, trace, base, index, clock)
            }
        }
    }

    /// Add an index to a 16-bit base the way the 6502 does: the low byte
    /// first, and a phantom read at the uncorrected address whenever the
    /// high byte still has to be fixed up or the instruction writes.
    fn indexed<C: CycleClock>(
        &mut self,
        def: &'static InstructionDefinition,
        trace: &mut ExecutionTrace,
        base: u16,
        index: Operand,
        clock: &mut C,
    ) -> Result<Resolved, CpuError> {
        self.acc8.load(base);
        let (crossed, _) = self.acc8.add(index, false);
        let uncorrected = (base & 0xFF00) | self.acc8.value();

        self.acc16.load(base);
        self.acc16.add(index, false);
        let addr = self.acc16.value();

        if crossed && def.page_sensitive {
            trace.page_fault = true;
        }
        if crossed || def.effect != Effect::Read {
            self.read_cycle(uncorrected, clock)?;
        }
        Ok(self.effective(trace, addr))
    }

    #[inline]
    fn effective(&self, trace: &mut ExecutionTrace, addr: u16) -> Resolved {
        trace.address = Some(addr);
        Resolved::Address(addr)
    }
}
