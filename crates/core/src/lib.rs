//! Core emulator primitives: the 6502/6507 CPU core, its configuration and
//! category-gated logging.

pub mod config;
pub mod cpu_6502;
pub mod logging;

pub use config::{ConfigError, CoreConfig, CpuConfig, LoggingConfig};
pub use cpu_6502::{Bus6502, BusFault, Cpu6502, CpuError, CycleClock, ExecutionTrace, ReadyLine};
