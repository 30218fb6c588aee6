use serde::{Deserialize, Serialize};

/// Comment of the `SWI` that ends the simulation.
pub const HALT_COMMENT: u32 = 0x12_3456;

/// Knobs of the [`Core`](crate::cpu::interpreter::Core) an embedder may tune.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// `SWI` comment treated as the end of the simulation.
    pub halt_comment: u32,

    /// When set, hitting the halt `SWI` terminates the whole process with
    /// [`exit_code`](Self::exit_code). Otherwise the step returns
    /// [`Step::Halt`](crate::cpu::interpreter::Step::Halt) to the caller.
    pub exit_on_halt: bool,

    pub exit_code: i32,

    /// Report an `MRS` whose condition fails as an undefined instruction
    /// instead of skipping it.
    pub undefined_on_failed_mrs: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            halt_comment: HALT_COMMENT,
            exit_on_halt: true,
            exit_code: 0,
            undefined_on_failed_mrs: false,
        }
    }
}

impl CoreConfig {
    /// Same as the default but returns control to the embedder on halt.
    #[must_use]
    pub fn embedded() -> Self {
        Self {
            exit_on_halt: false,
            ..Self::default()
        }
    }
}
