//! Tests for the MOS 6502 CPU implementation
//!
//! Tests are organized by area:
//! - `tests_arith`: ALU operations, decimal mode and flag results
//! - `tests_addressing`: effective addresses, phantom accesses and quirks
//! - `tests_flow`: branches, jumps, subroutines and BRK/RTI
//! - `tests_cycles`: cycle accounting, the cycle clock and the ready line
//! - `tests_undocumented`: commonly emulated undocumented opcodes
//! - `tests_driver`: errors, addressing policies, reentrancy and snapshots

mod tests_cycles;
mod tests_undocumented;

use crate::cpu_6502::{ArrayMemory, Bus6502, BusFault, Cpu6502, ExecutionTrace, NullClock};

/// Where test programs are loaded; the reset vector points here
const ORIGIN: u16 = 0xF000;

fn cpu_with_program(program: &[u8]) -> Cpu6502<ArrayMemory> {
    let mut mem = ArrayMemory::new();
    mem.load_program(ORIGIN, program);
    let mut cpu = Cpu6502::new(mem);
    cpu.reset().unwrap();
    cpu
}

fn step<B: Bus6502>(cpu: &mut Cpu6502<B>) -> ExecutionTrace {
    cpu.execute_instruction(NullClock).unwrap()
}

fn run<B: Bus6502>(cpu: &mut Cpu6502<B>, instructions: usize) -> ExecutionTrace {
    let mut last = step(cpu);
    for _ in 1..instructions {
        last = step(cpu);
    }
    last
}

/// Execute one instruction and count the clock ticks it produced
fn step_counted<B: Bus6502>(cpu: &mut Cpu6502<B>) -> (ExecutionTrace, u32) {
    let mut ticks = 0;
    let trace = cpu
        .execute_instruction(|| -> Result<(), BusFault> {
            ticks += 1;
            Ok(())
        })
        .unwrap();
    (trace, ticks)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Read(u16),
    Write(u16, u8),
}

/// Flat memory that records every bus access in order
struct RecordingBus {
    mem: ArrayMemory,
    accesses: Vec<Access>,
}

impl RecordingBus {
    fn with_program(program: &[u8]) -> Self {
        let mut mem = ArrayMemory::new();
        mem.load_program(ORIGIN, program);
        Self {
            mem,
            accesses: Vec::new(),
        }
    }
}

impl Bus6502 for RecordingBus {
    fn read(&mut self, addr: u16) -> Result<u8, BusFault> {
        self.accesses.push(Access::Read(addr));
        self.mem.read(addr)
    }

    fn write(&mut self, addr: u16, val: u8) -> Result<(), BusFault> {
        self.accesses.push(Access::Write(addr, val));
        self.mem.write(addr, val)
    }
}

fn recording_cpu(program: &[u8]) -> Cpu6502<RecordingBus> {
    let mut cpu = Cpu6502::new(RecordingBus::with_program(program));
    cpu.reset().unwrap();
    cpu.bus.accesses.clear();
    cpu
}
