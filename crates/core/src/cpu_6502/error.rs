use thiserror::Error;

use super::bus::BusFault;

/// Fatal outcome of an `execute_instruction` or `reset` call.
///
/// None of these are retried by the core; the in-flight instruction is
/// abandoned and its trace is left unfinalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    /// Unassigned opcode whose high nibble is odd
    #[error("invalid opcode {opcode:#04X} at {pc:#06X}")]
    InvalidOpcode { opcode: u8, pc: u16 },
    #[error("unimplemented instruction {opcode:#04X} at {pc:#06X}")]
    UnimplementedInstruction { opcode: u8, pc: u16 },
    #[error("program counter overflow at {pc:#06X}")]
    ProgramCounterOverflow { pc: u16 },
    #[error("an instruction is already being executed")]
    ReentrantExecution,
    #[error("bus failure: {0}")]
    BusFailure(#[from] BusFault),
    #[error("cycle clock failure: {0}")]
    ClockFailure(BusFault),
}

impl CpuError {
    /// Classify an opcode byte that has no table entry.
    pub fn undefined_opcode(opcode: u8, pc: u16) -> Self {
        if (opcode >> 4) & 1 == 1 {
            CpuError::InvalidOpcode { opcode, pc }
        } else {
            CpuError::UnimplementedInstruction { opcode, pc }
        }
    }
}
