use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vcs_core::cpu_6502::{ArrayMemory, BusFault, Cpu6502, NullClock};

/// A loop touching the common addressing modes, at $F000
fn bench_memory() -> ArrayMemory {
    let mut mem = ArrayMemory::new();
    mem.load_program(
        0xF000,
        &[
            0xA9, 0x42, // LDA #$42
            0x8D, 0x00, 0x02, // STA $0200
            0xA2, 0x10, // LDX #$10
            0xA0, 0x20, // LDY #$20
            0xE8, // INX
            0xC8, // INY
            0xCA, // DEX
            0x88, // DEY
            0x69, 0x01, // ADC #$01
            0xB5, 0x80, // LDA $80,X
            0xBD, 0xF8, 0x01, // LDA $01F8,X (page cross)
            0xE6, 0x90, // INC $90
            0x4C, 0x00, 0xF0, // JMP $F000
        ],
    );
    mem
}

fn bench_cpu_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_6502_step");

    group.bench_function("single_instruction", |b| {
        b.iter(|| {
            let mut cpu = Cpu6502::new(bench_memory());
            cpu.reset().unwrap();
            cpu.execute_instruction(NullClock).unwrap();
            black_box(cpu.a);
        });
    });

    group.finish();
}

fn bench_cpu_multiple_steps(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_6502_multiple_steps");

    for step_count in [10, 100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(step_count),
            step_count,
            |b, &count| {
                b.iter(|| {
                    let mut cpu = Cpu6502::new(bench_memory());
                    cpu.reset().unwrap();
                    for _ in 0..count {
                        cpu.execute_instruction(NullClock).unwrap();
                    }
                    black_box(cpu.cycles);
                });
            },
        );
    }

    group.finish();
}

fn bench_cycle_callback(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_6502_cycle_callback");

    // Same loop with a clock that does a little work per cycle
    group.bench_function("counting_clock", |b| {
        b.iter(|| {
            let mut cpu = Cpu6502::new(bench_memory());
            cpu.reset().unwrap();
            let mut color_clocks = 0u64;
            for _ in 0..100 {
                cpu.execute_instruction(|| -> Result<(), BusFault> {
                    color_clocks += 3;
                    Ok(())
                })
                .unwrap();
            }
            black_box(color_clocks);
        });
    });

    group.finish();
}

fn bench_cpu_reset(c: &mut Criterion) {
    c.bench_function("cpu_6502_reset", |b| {
        let mut cpu = Cpu6502::new(bench_memory());
        b.iter(|| {
            cpu.reset().unwrap();
            black_box(cpu.pc_value());
        });
    });
}

criterion_group!(
    benches,
    bench_cpu_step,
    bench_cpu_multiple_steps,
    bench_cycle_callback,
    bench_cpu_reset
);
criterion_main!(benches);
