//! Tests for the undocumented opcodes games rely on

use super::{cpu_with_program, run, step, ORIGIN};
use crate::cpu_6502::table::lookup;

#[test]
fn test_lax_loads_a_and_x() {
    // LAX $10
    let mut cpu = cpu_with_program(&[0xA7, 0x10]);
    cpu.bus.data[0x10] = 0x85;
    let trace = step(&mut cpu);

    assert_eq!(cpu.a.value(), 0x85);
    assert_eq!(cpu.x.value(), 0x85);
    assert!(cpu.status.sign);
    assert!(trace.definition.unwrap().undocumented);
    assert_eq!(trace.to_string(), "$F000  LAX $10  [3]");
}

#[test]
fn test_sax_stores_a_and_x_without_flags() {
    // LDA #$F0; LDX #$3C; SAX $10
    let mut cpu = cpu_with_program(&[0xA9, 0xF0, 0xA2, 0x3C, 0x87, 0x10]);
    run(&mut cpu, 3);

    assert_eq!(cpu.bus.data[0x10], 0x30);
    assert!(!cpu.status.zero);
    assert!(!cpu.status.sign);
}

#[test]
fn test_dcp_decrements_then_compares() {
    // LDA #$40; DCP $10
    let mut cpu = cpu_with_program(&[0xA9, 0x40, 0xC7, 0x10]);
    cpu.bus.data[0x10] = 0x41;
    let trace = run(&mut cpu, 2);

    assert_eq!(cpu.bus.data[0x10], 0x40);
    assert!(cpu.status.zero);
    assert!(cpu.status.carry);
    assert_eq!(trace.actual_cycles, 5);
}

#[test]
fn test_isb_increments_then_subtracts() {
    // SEC; LDA #$20; ISB $10
    let mut cpu = cpu_with_program(&[0x38, 0xA9, 0x20, 0xE7, 0x10]);
    cpu.bus.data[0x10] = 0x0F;
    run(&mut cpu, 3);

    assert_eq!(cpu.bus.data[0x10], 0x10);
    assert_eq!(cpu.a.value(), 0x10);
    assert!(cpu.status.carry);
}

#[test]
fn test_slo_shifts_then_ors() {
    // LDA #$01; SLO $10
    let mut cpu = cpu_with_program(&[0xA9, 0x01, 0x07, 0x10]);
    cpu.bus.data[0x10] = 0x81;
    run(&mut cpu, 2);

    assert_eq!(cpu.bus.data[0x10], 0x02);
    assert_eq!(cpu.a.value(), 0x03);
    assert!(cpu.status.carry);
}

#[test]
fn test_rla_rotates_then_ands() {
    // LDA #$FF; RLA $10
    let mut cpu = cpu_with_program(&[0xA9, 0xFF, 0x27, 0x10]);
    cpu.bus.data[0x10] = 0x81;
    run(&mut cpu, 2);

    assert_eq!(cpu.bus.data[0x10], 0x02);
    assert_eq!(cpu.a.value(), 0x02);
    assert!(cpu.status.carry);
}

#[test]
fn test_sre_shifts_then_eors() {
    // LDA #$01; SRE $10
    let mut cpu = cpu_with_program(&[0xA9, 0x01, 0x47, 0x10]);
    cpu.bus.data[0x10] = 0x03;
    run(&mut cpu, 2);

    assert_eq!(cpu.bus.data[0x10], 0x01);
    assert_eq!(cpu.a.value(), 0x00);
    assert!(cpu.status.zero);
    assert!(cpu.status.carry);
}

#[test]
fn test_rra_rotates_then_adds() {
    // LDA #$01; RRA $10
    let mut cpu = cpu_with_program(&[0xA9, 0x01, 0x67, 0x10]);
    cpu.bus.data[0x10] = 0x02;
    run(&mut cpu, 2);

    assert_eq!(cpu.bus.data[0x10], 0x01);
    assert_eq!(cpu.a.value(), 0x02);
    assert!(!cpu.status.carry);
}

#[test]
fn test_sbc_alias() {
    // SEC; LDA #$05; SBC #$03 (undocumented $EB)
    let mut cpu = cpu_with_program(&[0x38, 0xA9, 0x05, 0xEB, 0x03]);
    run(&mut cpu, 3);

    assert_eq!(cpu.a.value(), 0x02);
    assert!(cpu.status.carry);
}

#[test]
fn test_nop_variants_consume_operands() {
    // NOP; NOP #$FF; NOP $10; NOP $2000; NOP $20FF,X
    let mut cpu = cpu_with_program(&[
        0x1A, 0x80, 0xFF, 0x04, 0x10, 0x0C, 0x00, 0x20, 0x1C, 0xFF, 0x20,
    ]);
    cpu.x.load(0x01u8);
    let before = cpu.snapshot();

    let cycles: Vec<u32> = (0..5).map(|_| step(&mut cpu).actual_cycles).collect();
    assert_eq!(cycles, vec![2, 2, 3, 4, 5]);
    assert_eq!(cpu.pc_value(), ORIGIN + 11);

    let after = cpu.snapshot();
    assert_eq!(after.a, before.a);
    assert_eq!(after.x, before.x);
    assert_eq!(after.status, before.status);
}

#[test]
fn test_undocumented_entries_are_marked() {
    for opcode in [0xA7, 0x87, 0xC7, 0xE7, 0x07, 0x27, 0x47, 0x67, 0xEB, 0x1A] {
        assert!(lookup(opcode).unwrap().undocumented, "{:02X}", opcode);
    }
    for opcode in [0xA9, 0xE9, 0xEA] {
        assert!(!lookup(opcode).unwrap().undocumented, "{:02X}", opcode);
    }
}
