//! NTSC television beam timing
//!
//! The TIA runs at three colour clocks per CPU cycle and draws 228 colour
//! clocks per scanline (76 CPU cycles) and 262 scanlines per frame. Only the
//! beam position is tracked; nothing is rendered.

use vcs_core::cpu_6502::{BusFault, CycleClock, ReadyLine};
use vcs_core::logging::{log, LogCategory, LogLevel};

pub const COLOR_CLOCKS_PER_LINE: u32 = 228;
pub const COLOR_CLOCKS_PER_CPU_CYCLE: u32 = 3;
pub const LINES_PER_FRAME: u32 = 262;
/// CPU cycles in one full frame
pub const CPU_CYCLES_PER_FRAME: u32 =
    COLOR_CLOCKS_PER_LINE / COLOR_CLOCKS_PER_CPU_CYCLE * LINES_PER_FRAME;

#[derive(Debug)]
pub struct Television {
    color_clock: u32,
    scanline: u32,
    frame: u64,
    ready: ReadyLine,
}

impl Television {
    /// `ready` is released at the start of every scanline, ending any WSYNC
    /// stall.
    pub fn new(ready: ReadyLine) -> Self {
        Self {
            color_clock: 0,
            scanline: 0,
            frame: 0,
            ready,
        }
    }

    pub fn reset(&mut self) {
        self.color_clock = 0;
        self.scanline = 0;
        self.frame = 0;
    }

    /// Horizontal beam position in colour clocks
    pub fn color_clock(&self) -> u32 {
        self.color_clock
    }

    pub fn scanline(&self) -> u32 {
        self.scanline
    }

    /// Completed frames since reset
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Advance the beam by one CPU cycle.
    pub fn tick(&mut self) -> Result<(), BusFault> {
        self.color_clock += COLOR_CLOCKS_PER_CPU_CYCLE;
        if self.color_clock < COLOR_CLOCKS_PER_LINE {
            return Ok(());
        }

        self.color_clock -= COLOR_CLOCKS_PER_LINE;
        self.scanline += 1;
        self.ready.release();

        if self.scanline == LINES_PER_FRAME {
            self.scanline = 0;
            self.frame += 1;
            log(LogCategory::Clock, LogLevel::Debug, || {
                format!("frame {} complete", self.frame)
            });
        }
        Ok(())
    }
}

impl CycleClock for Television {
    fn tick(&mut self) -> Result<(), BusFault> {
        Television::tick(self)
    }
}
