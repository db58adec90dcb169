//! Tests for cycle accounting, the per-cycle clock and the ready line

use std::cell::RefCell;
use std::rc::Rc;

use super::{cpu_with_program, recording_cpu, run, step, step_counted};
use crate::cpu_6502::table::definitions;
use crate::cpu_6502::{
    AddressingMode, Bus6502, BusFault, Cpu6502, CpuError, Effect, InstructionDefinition,
};

fn is_indexed(def: &InstructionDefinition) -> bool {
    matches!(
        def.addressing_mode,
        AddressingMode::AbsoluteIndexedX
            | AddressingMode::AbsoluteIndexedY
            | AddressingMode::PostIndexedIndirect
    )
}

#[test]
fn test_base_cycles_without_page_cross() {
    for def in definitions() {
        if matches!(def.effect, Effect::Flow | Effect::Subroutine) {
            continue;
        }
        // Operand bytes $10 $20; zero page and indices are all zero
        let mut cpu = cpu_with_program(&[def.opcode, 0x10, 0x20]);
        let (trace, ticks) = step_counted(&mut cpu);

        assert_eq!(
            trace.actual_cycles, def.base_cycles as u32,
            "{:02X} {}",
            def.opcode, def.mnemonic
        );
        assert_eq!(ticks, trace.actual_cycles, "{:02X}", def.opcode);
        assert!(!trace.page_fault, "{:02X}", def.opcode);
        assert_eq!(trace.bug, None, "{:02X}", def.opcode);
        assert_eq!(cpu.cycles, ticks as u64);
    }
}

#[test]
fn test_page_cross_costs_one_cycle_for_reads_only() {
    for def in definitions().iter().filter(|d| is_indexed(d)) {
        // Base $2080 either directly or through the pointer at $80
        let mut cpu = cpu_with_program(&[def.opcode, 0x80, 0x20]);
        cpu.bus.data[0x80] = 0x80;
        cpu.bus.data[0x81] = 0x20;
        cpu.x.load(0xFFu8);
        cpu.y.load(0xFFu8);
        let trace = step(&mut cpu);

        if def.effect == Effect::Read {
            assert!(def.page_sensitive, "{:02X}", def.opcode);
            assert!(trace.page_fault, "{:02X}", def.opcode);
            assert_eq!(trace.actual_cycles, def.base_cycles as u32 + 1, "{:02X}", def.opcode);
        } else {
            assert!(!trace.page_fault, "{:02X}", def.opcode);
            assert_eq!(trace.actual_cycles, def.base_cycles as u32, "{:02X}", def.opcode);
        }
    }
}

#[test]
fn test_branch_cost_law() {
    // (status zero flag, offset, expected cycles, page fault)
    let cases = [
        (false, 0x10, 2, false),
        (true, 0x10, 3, false),
        (true, 0xF0, 4, true),
    ];
    for (zero, offset, cycles, page_fault) in cases {
        let mut cpu = cpu_with_program(&[0xF0, offset]);
        cpu.status.zero = zero;
        let (trace, ticks) = step_counted(&mut cpu);
        assert_eq!(trace.actual_cycles, cycles);
        assert_eq!(ticks, cycles);
        assert_eq!(trace.page_fault, page_fault);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Read(u16),
    Write(u16),
    Tick,
}

struct EventBus {
    events: Rc<RefCell<Vec<Event>>>,
    data: [u8; 0x10000],
}

impl Bus6502 for EventBus {
    fn read(&mut self, addr: u16) -> Result<u8, BusFault> {
        self.events.borrow_mut().push(Event::Read(addr));
        Ok(self.data[addr as usize])
    }

    fn write(&mut self, addr: u16, val: u8) -> Result<(), BusFault> {
        self.events.borrow_mut().push(Event::Write(addr));
        self.data[addr as usize] = val;
        Ok(())
    }
}

#[test]
fn test_clock_ticks_after_each_bus_access() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut data = [0u8; 0x10000];
    // INC $10
    data[0x0200] = 0xE6;
    data[0x0201] = 0x10;
    let mut cpu = Cpu6502::new(EventBus {
        events: events.clone(),
        data,
    });
    cpu.pc.load(0x0200u16);

    let clock_events = events.clone();
    cpu.execute_instruction(move || -> Result<(), BusFault> {
        clock_events.borrow_mut().push(Event::Tick);
        Ok(())
    })
    .unwrap();

    use Event::*;
    assert_eq!(
        *events.borrow(),
        vec![
            Read(0x0200),
            Tick,
            Read(0x0201),
            Tick,
            Read(0x0010),
            Tick,
            Write(0x0010),
            Tick,
            Write(0x0010),
            Tick,
        ]
    );
}

#[test]
fn test_ready_line_stalls_one_cycle_per_call() {
    // NOP
    let mut cpu = recording_cpu(&[0xEA]);
    let line = cpu.ready_line();
    line.hold();

    for held in 1..=3u64 {
        let (trace, ticks) = step_counted(&mut cpu);
        assert_eq!(ticks, 1);
        assert!(trace.is_stall());
        assert!(!trace.is_finalized());
        assert_eq!(trace.stalled_cycles, 1);
        assert_eq!(trace.actual_cycles, 0);
        assert_eq!(trace.to_string(), "$F000  <stalled>");
        assert_eq!(cpu.cycles, held);
        assert_eq!(cpu.pc_value(), 0xF000);
    }
    assert!(cpu.bus.accesses.is_empty());
    assert!(cpu.last_trace().is_none());

    line.release();
    let (trace, ticks) = step_counted(&mut cpu);
    assert_eq!(ticks, 2);
    assert!(!trace.is_stall());
    assert_eq!(trace.stalled_cycles, 0);
    assert_eq!(trace.to_string(), "$F000  NOP  [2]");
    assert_eq!(cpu.cycles, 5);
    assert_eq!(cpu.pc_value(), 0xF001);
}

#[test]
fn test_held_ready_line_never_runs_ahead_of_the_clock() {
    // NOP
    let mut cpu = cpu_with_program(&[0xEA]);
    cpu.ready_line().hold();

    // A clock that fails on its second tick is only ever asked for one
    let mut ticks = 0u32;
    let trace = cpu
        .execute_instruction(|| {
            ticks += 1;
            if ticks > 1 {
                return Err(BusFault::Device("clock overrun".to_string()));
            }
            Ok(())
        })
        .unwrap();

    assert!(trace.is_stall());
    assert_eq!(ticks, 1);
    assert_eq!(cpu.cycles, 1);
}

#[test]
fn test_hold_during_instruction_applies_at_next_call() {
    // LDA #$5A; STA $10
    let mut cpu = cpu_with_program(&[0xA9, 0x5A, 0x85, 0x10]);
    step(&mut cpu);

    let line = cpu.ready_line();
    let mut ticks = 0u32;
    let trace = cpu
        .execute_instruction(|| -> Result<(), BusFault> {
            ticks += 1;
            // Pulled after the operand fetch, ahead of the write cycle
            if ticks == 2 {
                line.hold();
            }
            Ok(())
        })
        .unwrap();

    // RDY is sampled between instructions, so the store completes
    assert_eq!(trace.stalled_cycles, 0);
    assert_eq!(trace.actual_cycles, 3);
    assert_eq!(cpu.bus.data[0x10], 0x5A);
    assert!(!cpu.ready_line().is_ready());

    cpu.bus.data[0x10] = 0x00;
    let (trace, ticks) = step_counted(&mut cpu);
    assert!(trace.is_stall());
    assert_eq!(ticks, 1);
    assert_eq!(cpu.pc_value(), 0xF004);
    assert_eq!(cpu.bus.data[0x10], 0x00);
    assert_eq!(cpu.last_trace().unwrap().to_string(), "$F002  STA $10  [3]");
}

#[test]
fn test_cycle_counter_accumulates_and_resets() {
    // LDA #$01; STA $0200; INX
    let mut cpu = cpu_with_program(&[0xA9, 0x01, 0x8D, 0x00, 0x02, 0xE8]);
    run(&mut cpu, 3);
    assert_eq!(cpu.cycles, 2 + 4 + 2);

    cpu.reset().unwrap();
    assert_eq!(cpu.cycles, 0);
}

#[test]
fn test_clock_failure_aborts_instruction() {
    // LDA #$01
    let mut cpu = cpu_with_program(&[0xA9, 0x01]);
    let mut ticks = 0;
    let err = cpu
        .execute_instruction(|| {
            ticks += 1;
            if ticks == 2 {
                Err(BusFault::Device("tia".to_string()))
            } else {
                Ok(())
            }
        })
        .unwrap_err();

    assert_eq!(err, CpuError::ClockFailure(BusFault::Device("tia".to_string())));
    let trace = cpu.last_trace().unwrap();
    assert!(!trace.is_finalized());
    assert_eq!(trace.actual_cycles, 2);
    assert_eq!(cpu.a.value(), 0x00);
}
