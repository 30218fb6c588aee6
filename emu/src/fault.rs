use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::memory::MemoryFault;

/// Status code of an instruction whose encoding is undefined or not implemented.
pub const UNDEFINED_INSTRUCTION: i32 = 2;

/// Status code of a `SWI` trap.
pub const SOFTWARE_INTERRUPT: i32 = 3;

/// Status code of a failed instruction fetch.
pub const PREFETCH_ABORT: i32 = 4;

/// Status code of a failed data access.
pub const DATA_ABORT: i32 = 5;

/// Status code of a decode or consistency failure inside the core itself.
pub const INTERNAL_FAILURE: i32 = -1;

/// Every way a step can end other than normally.
///
/// A conditionally skipped instruction is not a fault, it is a successful step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Fault {
    /// The word cannot be decoded at all, e.g. the unconditional `0xF` space.
    #[error("cannot decode instruction 0x{op_code:08X}")]
    Decode { op_code: u32 },

    /// Recognized encoding that is architecturally undefined or not implemented.
    #[error("undefined instruction 0x{op_code:08X}")]
    UndefinedInstruction { op_code: u32 },

    /// `SWI` with a comment other than the halt sentinel.
    #[error("software interrupt #0x{comment:06X}")]
    SoftwareInterrupt { comment: u32 },

    /// The instruction word could not be fetched.
    #[error("prefetch abort at 0x{address:08X}")]
    PrefetchAbort { address: u32 },

    /// A load or store touched an address the bus rejected.
    #[error("data abort at 0x{address:08X}")]
    DataAbort { address: u32 },

    /// A block transfer walked to a different final address than the one its
    /// addressing mode computed.
    #[error("block transfer ended at 0x{actual:08X}, expected 0x{expected:08X}")]
    BlockTransferMismatch { expected: u32, actual: u32 },
}

impl Fault {
    /// Numeric status handed to the exception mechanism.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::UndefinedInstruction { .. } => UNDEFINED_INSTRUCTION,
            Self::SoftwareInterrupt { .. } => SOFTWARE_INTERRUPT,
            Self::PrefetchAbort { .. } => PREFETCH_ABORT,
            Self::DataAbort { .. } => DATA_ABORT,
            Self::Decode { .. } | Self::BlockTransferMismatch { .. } => INTERNAL_FAILURE,
        }
    }

    /// True for failures of the core itself rather than of the guest program.
    #[must_use]
    pub const fn is_internal(self) -> bool {
        matches!(self, Self::BlockTransferMismatch { .. })
    }
}

impl From<MemoryFault> for Fault {
    fn from(fault: MemoryFault) -> Self {
        Self::DataAbort {
            address: fault.address,
        }
    }
}
