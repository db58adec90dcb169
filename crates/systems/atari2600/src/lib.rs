//! Atari 2600 system harness: a 6507 CPU on the VCS bus, clocked by the
//! television beam.

#![allow(clippy::upper_case_acronyms)]

mod bus;
mod cartridge;
mod television;

pub use bus::Atari2600Bus;
pub use cartridge::{Cartridge, CartridgeError, RomLayout};
pub use television::{Television, CPU_CYCLES_PER_FRAME, LINES_PER_FRAME};

use thiserror::Error;
use vcs_core::cpu_6502::{Cpu6502, CpuError, ExecutionTrace};
use vcs_core::logging::{log, LogCategory, LogLevel};
use vcs_core::{CoreConfig, CpuConfig};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Atari2600Error {
    #[error("Cartridge error: {0}")]
    Cartridge(#[from] CartridgeError),
    #[error("No cartridge loaded")]
    NoCartridge,
    #[error("CPU error: {0}")]
    Cpu(#[from] CpuError),
}

/// Atari 2600 system
#[derive(Debug)]
pub struct Atari2600 {
    cpu: Cpu6502<Atari2600Bus>,
    television: Television,
}

impl Default for Atari2600 {
    fn default() -> Self {
        Self::new()
    }
}

impl Atari2600 {
    /// Create a new Atari 2600 system
    pub fn new() -> Self {
        Self::with_config(CpuConfig::default())
    }

    pub fn with_config(config: CpuConfig) -> Self {
        let mut cpu = Cpu6502::with_config(Atari2600Bus::new(), config);
        // WSYNC holds the CPU's RDY line and the beam releases it
        let ready = cpu.ready_line();
        cpu.bus.connect_ready(ready.clone());
        Self {
            cpu,
            television: Television::new(ready),
        }
    }

    /// Build from a loaded configuration file, applying its log levels.
    pub fn from_core_config(config: &CoreConfig) -> Self {
        config.logging.apply();
        Self::with_config(config.cpu)
    }

    pub fn cpu(&self) -> &Cpu6502<Atari2600Bus> {
        &self.cpu
    }

    pub fn bus(&self) -> &Atari2600Bus {
        &self.cpu.bus
    }

    pub fn television(&self) -> &Television {
        &self.television
    }

    /// Insert a cartridge image and reset the machine
    pub fn mount(&mut self, data: &[u8]) -> Result<(), Atari2600Error> {
        let cartridge = Cartridge::new(data.to_vec())?;
        log(LogCategory::Bus, LogLevel::Info, || {
            format!("cartridge mounted: {} bytes ({:?})", cartridge.size(), cartridge.layout())
        });
        self.cpu.bus.load_cartridge(cartridge);
        self.reset()
    }

    pub fn unmount(&mut self) {
        self.cpu.bus.eject_cartridge();
    }

    pub fn is_mounted(&self) -> bool {
        self.cpu.bus.cartridge().is_some()
    }

    pub fn reset(&mut self) -> Result<(), Atari2600Error> {
        if !self.is_mounted() {
            return Err(Atari2600Error::NoCartridge);
        }
        self.cpu.bus.reset();
        self.television.reset();
        self.cpu.reset()?;
        Ok(())
    }

    /// Execute one instruction, advancing the beam once per CPU cycle.
    ///
    /// Cycles the CPU spends held by WSYNC are counted in the returned
    /// trace's `stalled_cycles`. The beam releases the line at the next
    /// scanline, so at most one line of stall calls is made.
    pub fn step(&mut self) -> Result<ExecutionTrace, Atari2600Error> {
        if !self.is_mounted() {
            return Err(Atari2600Error::NoCartridge);
        }
        let television = &mut self.television;
        let mut stalled = 0;
        loop {
            let mut trace = self.cpu.execute_instruction(|| television.tick())?;
            if trace.is_stall() {
                stalled += trace.stalled_cycles;
                continue;
            }
            trace.stalled_cycles += stalled;
            return Ok(trace);
        }
    }

    /// Execute instructions until the television starts a new frame.
    ///
    /// Returns the CPU cycles consumed, stalls included. The frame boundary
    /// falls inside an instruction, so this is within a few cycles of
    /// [`CPU_CYCLES_PER_FRAME`].
    pub fn run_frame(&mut self) -> Result<u64, Atari2600Error> {
        let frame = self.television.frame();
        let start = self.cpu.cycles;
        while self.television.frame() == frame {
            self.step()?;
        }
        Ok(self.cpu.cycles - start)
    }

    /// Get debug information
    pub fn debug_info(&self) -> Option<DebugInfo> {
        self.cpu.bus.cartridge().map(|cart| DebugInfo {
            rom_size: cart.size(),
            layout: cart.layout(),
            pc: self.cpu.pc_value(),
            scanline: self.television.scanline(),
            frame: self.television.frame(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct DebugInfo {
    pub rom_size: usize,
    pub layout: RomLayout,
    pub pc: u16,
    pub scanline: u32,
    pub frame: u64,
}
