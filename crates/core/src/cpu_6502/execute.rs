//! Instruction semantics.
//!
//! Runs after [`Cpu6502::resolve`] has fetched the operand bytes and formed
//! the effective address. Every remaining bus cycle of the instruction
//! happens here.

use super::addressing::Resolved;
use super::bus::{Bus6502, CycleClock};
use super::error::CpuError;
use super::register::{DecimalFlags, Operand, Register};
use super::status::{StatusRegister, FLAG_BREAK, FLAG_UNUSED};
use super::table::{Effect, InstructionDefinition, Mnemonic};
use super::trace::ExecutionTrace;
use super::{Cpu6502, IRQ_VECTOR};
use crate::logging::{log, LogCategory, LogLevel};

impl<B: Bus6502> Cpu6502<B> {
    pub(super) fn dispatch<C: CycleClock>(
        &mut self,
        def: &'static InstructionDefinition,
        trace: &mut ExecutionTrace,
        resolved: Resolved,
        clock: &mut C,
    ) -> Result<(), CpuError> {
        use Mnemonic::*;

        if def.effect == Effect::Rmw {
            return self.read_modify_write(def.mnemonic, resolved, clock);
        }
        if def.mnemonic.is_branch() {
            return self.branch(def.mnemonic, trace, resolved, clock);
        }

        match def.mnemonic {
            // Loads and arithmetic
            LDA => {
                let v = self.operand_value(resolved, clock)?;
                self.a.load(v);
                self.status.set_zero_and_sign(v);
            }
            LDX => {
                let v = self.operand_value(resolved, clock)?;
                self.x.load(v);
                self.status.set_zero_and_sign(v);
            }
            LDY => {
                let v = self.operand_value(resolved, clock)?;
                self.y.load(v);
                self.status.set_zero_and_sign(v);
            }
            LAX => {
                let v = self.operand_value(resolved, clock)?;
                self.a.load(v);
                self.x.load(v);
                self.status.set_zero_and_sign(v);
            }
            ADC => {
                let v = self.operand_value(resolved, clock)?;
                self.adc(v);
            }
            SBC => {
                let v = self.operand_value(resolved, clock)?;
                self.sbc(v);
            }
            AND => {
                let v = self.operand_value(resolved, clock)?;
                self.a.and(v);
                self.status.set_zero_and_sign(self.a.to_u8());
            }
            ORA => {
                let v = self.operand_value(resolved, clock)?;
                self.a.or(v);
                self.status.set_zero_and_sign(self.a.to_u8());
            }
            EOR => {
                let v = self.operand_value(resolved, clock)?;
                self.a.xor(v);
                self.status.set_zero_and_sign(self.a.to_u8());
            }
            CMP => {
                let v = self.operand_value(resolved, clock)?;
                self.compare(self.a, v);
            }
            CPX => {
                let v = self.operand_value(resolved, clock)?;
                self.compare(self.x, v);
            }
            CPY => {
                let v = self.operand_value(resolved, clock)?;
                self.compare(self.y, v);
            }
            BIT => {
                let v = self.operand_value(resolved, clock)?;
                self.acc8.load(&self.a);
                self.acc8.and(v);
                self.status.zero = self.acc8.is_zero();
                self.status.overflow = v & 0x40 != 0;
                self.status.sign = v & 0x80 != 0;
            }
            NOP => {
                // Undocumented NOPs with an operand still read it
                if let Resolved::Address(_) = resolved {
                    self.operand_value(resolved, clock)?;
                }
            }

            // Stores
            STA => self.store(resolved, self.a.to_u8(), clock)?,
            STX => self.store(resolved, self.x.to_u8(), clock)?,
            STY => self.store(resolved, self.y.to_u8(), clock)?,
            SAX => {
                self.acc8.load(&self.a);
                self.acc8.and(&self.x);
                self.store(resolved, self.acc8.to_u8(), clock)?;
            }

            // Register transfers and steps
            TAX => self.transfer_to_x(self.a),
            TAY => {
                self.y.load(&self.a);
                self.status.set_zero_and_sign(self.y.to_u8());
            }
            TXA => {
                self.a.load(&self.x);
                self.status.set_zero_and_sign(self.a.to_u8());
            }
            TYA => {
                self.a.load(&self.y);
                self.status.set_zero_and_sign(self.a.to_u8());
            }
            TSX => self.transfer_to_x(self.sp),
            TXS => self.sp.load(&self.x),
            INX => {
                self.x.add(1u8, false);
                self.status.set_zero_and_sign(self.x.to_u8());
            }
            INY => {
                self.y.add(1u8, false);
                self.status.set_zero_and_sign(self.y.to_u8());
            }
            DEX => {
                self.x.subtract(1u8, true);
                self.status.set_zero_and_sign(self.x.to_u8());
            }
            DEY => {
                self.y.subtract(1u8, true);
                self.status.set_zero_and_sign(self.y.to_u8());
            }

            // Flags
            CLC => self.status.carry = false,
            SEC => self.status.carry = true,
            CLI => self.status.interrupt_disable = false,
            SEI => self.status.interrupt_disable = true,
            CLD => self.status.decimal_mode = false,
            SED => self.status.decimal_mode = true,
            CLV => self.status.overflow = false,

            // Stack
            PHA => self.push(self.a.to_u8(), clock)?,
            PHP => {
                let p = self.status.to_byte() | FLAG_BREAK | FLAG_UNUSED;
                self.push(p, clock)?;
            }
            PLA => {
                self.stack_phantom_read(clock)?;
                let v = self.pull(clock)?;
                self.a.load(v);
                self.status.set_zero_and_sign(v);
            }
            PLP => {
                self.stack_phantom_read(clock)?;
                let p = self.pull(clock)?;
                self.pull_status(p);
            }

            // Control flow
            JMP => {
                if let Resolved::Address(target) = resolved {
                    self.jump(target);
                }
            }
            JSR => self.jsr(trace, resolved, clock)?,
            RTS => self.rts(trace, clock)?,
            RTI => self.rti(trace, clock)?,
            BRK => self.brk(trace, clock)?,

            // Read-modify-write and branch mnemonics are routed above
            ASL | LSR | ROL | ROR | INC | DEC | DCP | ISB | RLA | RRA | SLO | SRE
            | BCC | BCS | BEQ | BMI | BNE | BPL | BVC | BVS => {}
        }
        Ok(())
    }

    /// The value a read-effect instruction works on.
    fn operand_value<C: CycleClock>(&mut self, resolved: Resolved, clock: &mut C) -> Result<u8, CpuError> {
        match resolved {
            Resolved::Immediate(v) => Ok(v),
            Resolved::Address(addr) => self.read_cycle(addr, clock),
            _ => Ok(self.a.to_u8()),
        }
    }

    fn store<C: CycleClock>(&mut self, resolved: Resolved, v: u8, clock: &mut C) -> Result<(), CpuError> {
        if let Resolved::Address(addr) = resolved {
            self.write_cycle(addr, v, clock)?;
        }
        Ok(())
    }

    fn transfer_to_x(&mut self, from: Register) {
        self.x.load(&from);
        self.status.set_zero_and_sign(self.x.to_u8());
    }

    fn adc(&mut self, v: u8) {
        if self.status.decimal_mode {
            let flags = self.a.add_decimal(v, self.status.carry);
            self.set_decimal_flags(flags);
            return;
        }
        let (carry, overflow) = self.a.add(v, self.status.carry);
        self.status.carry = carry;
        self.status.overflow = overflow;
        self.status.set_zero_and_sign(self.a.to_u8());
    }

    fn sbc(&mut self, v: u8) {
        if self.status.decimal_mode {
            let flags = self.a.subtract_decimal(v, self.status.carry);
            self.set_decimal_flags(flags);
            return;
        }
        let (carry, overflow) = self.a.subtract(v, self.status.carry);
        self.status.carry = carry;
        self.status.overflow = overflow;
        self.status.set_zero_and_sign(self.a.to_u8());
    }

    fn set_decimal_flags(&mut self, flags: DecimalFlags) {
        self.status.carry = flags.carry;
        self.status.overflow = flags.overflow;
        self.status.zero = flags.zero;
        self.status.sign = flags.sign;
    }

    fn compare(&mut self, reg: Register, v: u8) {
        self.acc8.load(&reg);
        let (carry, _) = self.acc8.subtract(v, true);
        self.status.carry = carry;
        self.status.set_zero_and_sign(self.acc8.to_u8());
    }

    fn pull_status(&mut self, p: u8) {
        self.status = StatusRegister::from_byte(p);
        self.status.break_command = false;
    }

    fn jump(&mut self, target: u16) {
        if !self.config.no_flow_control {
            self.pc.load(target);
        }
    }

    /// Read, write back the unmodified value, then write the result. The
    /// accumulator forms skip the bus entirely.
    fn read_modify_write<C: CycleClock>(
        &mut self,
        mnemonic: Mnemonic,
        resolved: Resolved,
        clock: &mut C,
    ) -> Result<(), CpuError> {
        let primary = rmw_primary(mnemonic);
        let result = match resolved {
            Resolved::Address(addr) => {
                let v = self.read_cycle(addr, clock)?;
                self.write_cycle(addr, v, clock)?;
                self.acc8.load(v);
                apply_rmw(&mut self.status, &mut self.acc8, primary);
                let result = self.acc8.to_u8();
                self.write_cycle(addr, result, clock)?;
                result
            }
            _ => {
                apply_rmw(&mut self.status, &mut self.a, primary);
                self.a.to_u8()
            }
        };

        match mnemonic {
            SLO => {
                self.a.or(result);
                self.status.set_zero_and_sign(self.a.to_u8());
            }
            RLA => {
                self.a.and(result);
                self.status.set_zero_and_sign(self.a.to_u8());
            }
            SRE => {
                self.a.xor(result);
                self.status.set_zero_and_sign(self.a.to_u8());
            }
            RRA => self.adc(result),
            DCP => self.compare(self.a, result),
            ISB => self.sbc(result),
            _ => {}
        }
        Ok(())
    }

    fn branch<C: CycleClock>(
        &mut self,
        mnemonic: Mnemonic,
        trace: &mut ExecutionTrace,
        resolved: Resolved,
        clock: &mut C,
    ) -> Result<(), CpuError> {
        let Resolved::Offset(offset) = resolved else {
            return Ok(());
        };
        let s = &self.status;
        let taken = match mnemonic {
            BCC => !s.carry,
            BCS => s.carry,
            BEQ => s.zero,
            BNE => !s.zero,
            BMI => s.sign,
            BPL => !s.sign,
            BVC => !s.overflow,
            BVS => s.overflow,
            _ => false,
        };
        if !taken {
            return Ok(());
        }

        let pc = self.pc_value();
        self.read_cycle(pc, clock)?;

        self.acc16.load(pc);
        self.acc16.add(offset, false);
        let target = self.acc16.value();
        trace.address = Some(target);

        if target & 0xFF00 != pc & 0xFF00 {
            trace.page_fault = true;
            self.read_cycle((pc & 0xFF00) | (target & 0x00FF), clock)?;
        }
        self.jump(target);
        Ok(())
    }

    fn jsr<C: CycleClock>(
        &mut self,
        trace: &mut ExecutionTrace,
        resolved: Resolved,
        clock: &mut C,
    ) -> Result<(), CpuError> {
        let Resolved::TargetLow(lo) = resolved else {
            return Ok(());
        };
        self.stack_phantom_read(clock)?;

        // PC points at the target's high byte: the last byte of the JSR
        let [ret_lo, ret_hi] = self.pc_value().to_le_bytes();
        self.push(ret_hi, clock)?;
        self.push(ret_lo, clock)?;

        let hi = self.fetch(clock)?;
        let target = u16::from_le_bytes([lo, hi]);
        trace.operand = Some(Operand::Word(target));
        trace.address = Some(target);
        self.jump(target);
        Ok(())
    }

    fn rts<C: CycleClock>(&mut self, trace: &mut ExecutionTrace, clock: &mut C) -> Result<(), CpuError> {
        self.stack_phantom_read(clock)?;
        let lo = self.pull(clock)?;
        let hi = self.pull(clock)?;
        let ret = u16::from_le_bytes([lo, hi]);

        self.read_cycle(ret, clock)?;
        trace.address = Some(ret.wrapping_add(1));
        if !self.config.no_flow_control {
            self.pc.load(ret);
            self.advance_pc()?;
        }
        Ok(())
    }

    fn rti<C: CycleClock>(&mut self, trace: &mut ExecutionTrace, clock: &mut C) -> Result<(), CpuError> {
        self.stack_phantom_read(clock)?;
        let p = self.pull(clock)?;
        self.pull_status(p);
        let lo = self.pull(clock)?;
        let hi = self.pull(clock)?;
        let ret = u16::from_le_bytes([lo, hi]);
        trace.address = Some(ret);
        self.jump(ret);
        Ok(())
    }

    fn brk<C: CycleClock>(&mut self, trace: &mut ExecutionTrace, clock: &mut C) -> Result<(), CpuError> {
        let [ret_lo, ret_hi] = self.pc_value().to_le_bytes();
        self.push(ret_hi, clock)?;
        self.push(ret_lo, clock)?;
        let p = self.status.to_byte() | FLAG_BREAK | FLAG_UNUSED;
        self.push(p, clock)?;
        self.status.interrupt_disable = true;

        let lo = self.read_cycle(IRQ_VECTOR, clock)?;
        let hi = self.read_cycle(IRQ_VECTOR.wrapping_add(1), clock)?;
        let target = u16::from_le_bytes([lo, hi]);
        trace.address = Some(target);
        log(LogCategory::Cpu, LogLevel::Debug, || {
            format!("BRK at {:04X}, vectoring to {:04X}", trace.pc_at_fetch, target)
        });
        self.jump(target);
        Ok(())
    }
}

use Mnemonic::{
    BCC, BCS, BEQ, BMI, BNE, BPL, BVC, BVS, DCP, ISB, RLA, RRA, SLO, SRE,
};

/// The documented operation an undocumented read-modify-write starts with
fn rmw_primary(mnemonic: Mnemonic) -> Mnemonic {
    match mnemonic {
        SLO => Mnemonic::ASL,
        RLA => Mnemonic::ROL,
        SRE => Mnemonic::LSR,
        RRA => Mnemonic::ROR,
        DCP => Mnemonic::DEC,
        ISB => Mnemonic::INC,
        other => other,
    }
}

fn apply_rmw(status: &mut StatusRegister, reg: &mut Register, mnemonic: Mnemonic) {
    match mnemonic {
        Mnemonic::ASL => status.carry = reg.asl(),
        Mnemonic::LSR => status.carry = reg.lsr(),
        Mnemonic::ROL => status.carry = reg.rol(status.carry),
        Mnemonic::ROR => status.carry = reg.ror(status.carry),
        Mnemonic::INC => {
            reg.add(1u8, false);
        }
        Mnemonic::DEC => {
            reg.subtract(1u8, true);
        }
        _ => return,
    }
    status.set_zero_and_sign(reg.to_u8());
}
