//! MOS 6502/6507 CPU core with per-cycle bus timing.
//!
//! One call to [`Cpu6502::execute_instruction`] runs one instruction from
//! opcode fetch to its last bus access. Every bus access is one machine
//! cycle, and after each one the caller's [`CycleClock`] is ticked so that
//! sibling chips (TIA, RIOT) stay in lock-step with the CPU.
//!
//! The core reproduces the NMOS hardware quirks: the JMP indirect page wrap,
//! zero page index wrap, phantom reads on indexed addressing and the double
//! write of read-modify-write instructions. Quirks are recorded in the
//! returned [`ExecutionTrace`], never raised as errors.
//!
//! The RDY line is sampled at the instruction boundary. While it is held,
//! each call consumes one clock tick and returns a stall trace without
//! touching the bus, so a driver can keep a CPU parked for as long as it
//! likes. A hold raised partway through an instruction takes effect on the
//! next call.

mod addressing;
pub mod bus;
pub mod error;
mod execute;
pub mod register;
pub mod status;
pub mod table;
pub mod trace;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

pub use crate::config::CpuConfig;
pub use bus::{ArrayMemory, Bus6502, BusFault, CycleClock, NullClock, ReadyLine};
pub use error::CpuError;
pub use register::{DecimalFlags, Operand, Register, Width};
pub use status::StatusRegister;
pub use table::{AddressingMode, Effect, InstructionDefinition, Mnemonic};
pub use trace::ExecutionTrace;

use crate::logging::{log, LogCategory, LogLevel};

const STACK_PAGE: u16 = 0x0100;
const IRQ_VECTOR: u16 = 0xFFFE;

/// Register file and bus state that survives a rewind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuSnapshot {
    pub pc: u16,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub status: u8,
    pub cycles: u64,
    pub ready: bool,
}

/// MOS 6502 CPU state and execution engine
#[derive(Debug)]
pub struct Cpu6502<B: Bus6502> {
    pub pc: Register,
    pub a: Register,
    pub x: Register,
    pub y: Register,
    pub sp: Register,
    pub status: StatusRegister,
    /// Scratch registers for index and pointer arithmetic
    acc8: Register,
    acc16: Register,
    pub bus: B,
    /// Total cycles consumed since reset, stalls included
    pub cycles: u64,
    config: CpuConfig,
    ready: ReadyLine,
    in_flight: bool,
    step_cycles: u32,
    last_trace: Option<ExecutionTrace>,
}

impl<B: Bus6502> Cpu6502<B> {
    pub fn new(bus: B) -> Self {
        Self::with_config(bus, CpuConfig::default())
    }

    pub fn with_config(bus: B, config: CpuConfig) -> Self {
        let mut status = StatusRegister::new();
        status.set_zero_and_sign(0);
        let mut sp = Register::byte();
        sp.load(0xFFu8);
        Self {
            pc: Register::word(),
            a: Register::byte(),
            x: Register::byte(),
            y: Register::byte(),
            sp,
            status,
            acc8: Register::byte(),
            acc16: Register::word(),
            bus,
            cycles: 0,
            config,
            ready: ReadyLine::new(),
            in_flight: false,
            step_cycles: 0,
            last_trace: None,
        }
    }

    pub fn config(&self) -> &CpuConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: CpuConfig) {
        self.config = config;
    }

    /// A handle on the RDY line, for chips that need to stall the CPU
    pub fn ready_line(&self) -> ReadyLine {
        self.ready.clone()
    }

    /// The most recent trace, including the unfinalized trace of a failed
    /// instruction
    pub fn last_trace(&self) -> Option<&ExecutionTrace> {
        self.last_trace.as_ref()
    }

    #[inline]
    pub fn pc_value(&self) -> u16 {
        self.pc.value()
    }

    /// Reinitialise registers to their power-on values and load PC from the
    /// reset vector. No cycles are ticked.
    pub fn reset(&mut self) -> Result<(), CpuError> {
        self.a.load(0u8);
        self.x.load(0u8);
        self.y.load(0u8);
        self.sp.load(0xFFu8);
        self.status.reset();
        self.status.set_zero_and_sign(self.a.to_u8());
        self.cycles = 0;
        self.in_flight = false;
        self.last_trace = None;
        self.ready.release();

        let vector = self.config.reset_vector;
        let lo = self.bus_read(vector)?;
        let hi = self.bus_read(vector.wrapping_add(1))?;
        self.pc.load(u16::from_le_bytes([lo, hi]));
        log(LogCategory::Cpu, LogLevel::Debug, || {
            format!("reset: PC={:04X} from vector {:04X}", self.pc.value(), vector)
        });
        Ok(())
    }

    /// Run one instruction, ticking `clock` once per consumed cycle.
    pub fn execute_instruction<C: CycleClock>(
        &mut self,
        mut clock: C,
    ) -> Result<ExecutionTrace, CpuError> {
        if self.in_flight {
            return Err(CpuError::ReentrantExecution);
        }
        self.in_flight = true;
        let result = self.run_instruction(&mut clock);
        self.in_flight = false;
        result
    }

    fn run_instruction<C: CycleClock>(&mut self, clock: &mut C) -> Result<ExecutionTrace, CpuError> {
        if !self.ready.is_ready() {
            return self.stall(clock);
        }
        self.step_cycles = 0;
        self.last_trace = None;

        let pc_at_fetch = self.pc_value();
        let opcode = self.fetch(clock)?;
        let Some(definition) = table::lookup(opcode) else {
            let err = CpuError::undefined_opcode(opcode, pc_at_fetch);
            log(LogCategory::Cpu, LogLevel::Warn, || err.to_string());
            return Err(err);
        };

        let mut trace = ExecutionTrace::new(pc_at_fetch, definition);
        let outcome = self.perform(definition, &mut trace, clock);
        trace.actual_cycles = self.step_cycles;

        if let Err(err) = outcome {
            log(LogCategory::Cpu, LogLevel::Debug, || {
                format!("{} aborted: {}", trace, err)
            });
            self.last_trace = Some(trace);
            return Err(err);
        }

        trace.finalize();
        if let Some(bug) = trace.bug {
            log(LogCategory::Quirks, LogLevel::Debug, || {
                format!("{:04X}: {}", pc_at_fetch, bug)
            });
        }
        log(LogCategory::Cpu, LogLevel::Trace, || {
            format!(
                "{:<40} A:{} X:{} Y:{} SP:{} P:{}",
                trace.to_string(),
                self.a,
                self.x,
                self.y,
                self.sp,
                self.status
            )
        });
        self.last_trace = Some(trace.clone());
        Ok(trace)
    }

    fn perform<C: CycleClock>(
        &mut self,
        definition: &'static InstructionDefinition,
        trace: &mut ExecutionTrace,
        clock: &mut C,
    ) -> Result<(), CpuError> {
        let resolved = self.resolve(definition, trace, clock)?;
        self.dispatch(definition, trace, resolved, clock)
    }

    /// RDY is low: burn one cycle with no bus access. `last_trace` keeps
    /// the last instruction.
    fn stall<C: CycleClock>(&mut self, clock: &mut C) -> Result<ExecutionTrace, CpuError> {
        self.cycles += 1;
        clock.tick().map_err(CpuError::ClockFailure)?;
        log(LogCategory::Clock, LogLevel::Trace, || {
            format!("RDY held at PC={:04X}", self.pc.value())
        });
        Ok(ExecutionTrace::stall(self.pc.value()))
    }

    pub fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot {
            pc: self.pc.value(),
            a: self.a.to_u8(),
            x: self.x.to_u8(),
            y: self.y.to_u8(),
            sp: self.sp.to_u8(),
            status: self.status.to_byte(),
            cycles: self.cycles,
            ready: self.ready.is_ready(),
        }
    }

    pub fn restore(&mut self, snapshot: &CpuSnapshot) {
        self.pc.load(snapshot.pc);
        self.a.load(snapshot.a);
        self.x.load(snapshot.x);
        self.y.load(snapshot.y);
        self.sp.load(snapshot.sp);
        self.status = StatusRegister::from_byte(snapshot.status);
        self.cycles = snapshot.cycles;
        self.ready.set(snapshot.ready);
        self.in_flight = false;
        self.last_trace = None;
    }

    /// Move the CPU state onto a different bus.
    pub fn plumb<N: Bus6502>(self, bus: N) -> Cpu6502<N> {
        Cpu6502 {
            pc: self.pc,
            a: self.a,
            x: self.x,
            y: self.y,
            sp: self.sp,
            status: self.status,
            acc8: self.acc8,
            acc16: self.acc16,
            bus,
            cycles: self.cycles,
            config: self.config,
            ready: self.ready,
            in_flight: self.in_flight,
            step_cycles: 0,
            last_trace: self.last_trace,
        }
    }

    // --- bus access -------------------------------------------------------

    fn bus_read(&mut self, addr: u16) -> Result<u8, CpuError> {
        match self.bus.read(addr) {
            Ok(v) => Ok(v),
            Err(fault) if fault.is_unmapped() && !self.config.strict_addressing => {
                log(LogCategory::Bus, LogLevel::Trace, || format!("{} (read as 0)", fault));
                Ok(0)
            }
            Err(fault) => Err(fault.into()),
        }
    }

    fn bus_write(&mut self, addr: u16, val: u8) -> Result<(), CpuError> {
        match self.bus.write(addr, val) {
            Ok(()) => Ok(()),
            Err(fault) if fault.is_unmapped() && !self.config.strict_addressing => {
                log(LogCategory::Bus, LogLevel::Trace, || format!("{} (ignored)", fault));
                Ok(())
            }
            Err(fault) => Err(fault.into()),
        }
    }

    // --- cycles -----------------------------------------------------------

    #[inline]
    fn tick<C: CycleClock>(&mut self, clock: &mut C) -> Result<(), CpuError> {
        self.step_cycles += 1;
        self.cycles += 1;
        clock.tick().map_err(CpuError::ClockFailure)
    }

    fn read_cycle<C: CycleClock>(&mut self, addr: u16, clock: &mut C) -> Result<u8, CpuError> {
        let v = self.bus_read(addr)?;
        self.tick(clock)?;
        Ok(v)
    }

    fn write_cycle<C: CycleClock>(&mut self, addr: u16, val: u8, clock: &mut C) -> Result<(), CpuError> {
        self.bus_write(addr, val)?;
        self.tick(clock)
    }

    /// Read the byte at PC and step past it.
    fn fetch<C: CycleClock>(&mut self, clock: &mut C) -> Result<u8, CpuError> {
        let v = self.read_cycle(self.pc.value(), clock)?;
        self.advance_pc()?;
        Ok(v)
    }

    fn advance_pc(&mut self) -> Result<(), CpuError> {
        let pc = self.pc.value();
        let (carry, _) = self.pc.add(1u8, false);
        if carry {
            self.pc.load(pc);
            return Err(CpuError::ProgramCounterOverflow { pc });
        }
        Ok(())
    }

    // --- stack --------------------------------------------------------------

    #[inline]
    fn stack_addr(&self) -> u16 {
        STACK_PAGE | self.sp.value()
    }

    fn push<C: CycleClock>(&mut self, val: u8, clock: &mut C) -> Result<(), CpuError> {
        self.write_cycle(self.stack_addr(), val, clock)?;
        self.sp.subtract(1u8, true);
        Ok(())
    }

    fn pull<C: CycleClock>(&mut self, clock: &mut C) -> Result<u8, CpuError> {
        self.sp.add(1u8, false);
        self.read_cycle(self.stack_addr(), clock)
    }

    /// The dummy stack read the 6502 performs before a pull (or, for JSR,
    /// before the pushes).
    fn stack_phantom_read<C: CycleClock>(&mut self, clock: &mut C) -> Result<(), CpuError> {
        self.read_cycle(self.stack_addr(), clock).map(|_| ())
    }
}
