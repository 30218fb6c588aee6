//! # Single-Step Interpreter
//!
//! [`Core::step`] runs exactly one instruction:
//!
//! 1. fetch the word at the program counter (a failure is a prefetch abort),
//! 2. advance the program counter by one instruction,
//! 3. decode and execute it through an [`Interpreter`],
//! 4. hand any [`Fault`] to the [`ExceptionHandler`] before returning it.
//!
//! The core holds no state between steps. Registers live in the
//! [`ProcessorState`], memory behind the [`Bus`], both owned by the caller.
//! Stepping the same state from several threads at once is up to the caller
//! to prevent, the borrows already make it impossible without a lock.
//!
//! ## Halting
//!
//! `SWI` with the halt comment (`0x123456` by default) ends the simulation.
//! With [`CoreConfig::exit_on_halt`] set, which is the default, `step` **exits
//! the whole process** with [`CoreConfig::exit_code`]. Embedders that want to
//! keep control should use [`CoreConfig::embedded`] and watch for
//! [`Step::Halt`].

use crate::config::CoreConfig;
use crate::cpu::arm::instructions::ArmModeInstruction;
use crate::cpu::condition::Condition;
use crate::cpu::state::ProcessorState;
use crate::fault::Fault;
use crate::memory::Bus;

/// Size in bytes of an ARM instruction.
pub const SIZE_OF_INSTRUCTION: u32 = 4;

/// Successful outcome of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The instruction executed, or was skipped by its condition.
    Continue,

    /// The halt `SWI` was executed.
    Halt,
}

/// Exception delivery, invoked by [`Core::step`] for every fault.
pub trait ExceptionHandler {
    fn raise_exception(&mut self, fault: &Fault);
}

/// Handler that only remembers what was raised.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExceptionLog {
    pub raised: Vec<Fault>,
}

impl ExceptionHandler for ExceptionLog {
    fn raise_exception(&mut self, fault: &Fault) {
        self.raised.push(*fault);
    }
}

/// Executes already fetched instruction words against borrowed collaborators.
pub struct Interpreter<'a, P, B> {
    pub(crate) state: &'a mut P,
    pub(crate) bus: &'a mut B,
    pub(crate) config: &'a CoreConfig,
}

impl<'a, P: ProcessorState, B: Bus> Interpreter<'a, P, B> {
    #[must_use]
    pub fn new(state: &'a mut P, bus: &'a mut B, config: &'a CoreConfig) -> Self {
        Self { state, bus, config }
    }

    /// Decodes and executes `op_code`.
    ///
    /// R15 must already read as the address of `op_code` + 8.
    ///
    /// # Errors
    ///
    /// The [`Fault`] the instruction raised. A failing condition is not a
    /// fault.
    pub fn execute(&mut self, op_code: u32) -> Result<Step, Fault> {
        let instruction = ArmModeInstruction::try_from(op_code)?;
        tracing::trace!("0x{op_code:08X}: {}", instruction.disassembler());

        match instruction {
            ArmModeInstruction::DataProcessing { condition } => {
                if self.can_execute(condition) {
                    self.state.execute_data_processing(op_code)?;
                }
            }
            ArmModeInstruction::Mrs {
                condition,
                psr_kind,
                destination_register,
            } => self.mrs(op_code, condition, psr_kind, destination_register)?,
            ArmModeInstruction::HalfwordDataTransfer {
                condition,
                indexing,
                offsetting,
                write_back,
                load_store_kind,
                offset_kind,
                base_register,
                source_destination_register,
                transfer_kind,
            } => self.half_word_data_transfer(
                condition,
                indexing,
                offsetting,
                write_back,
                load_store_kind,
                offset_kind,
                base_register,
                source_destination_register,
                transfer_kind,
            )?,
            ArmModeInstruction::SingleDataTransfer {
                condition,
                load_store_kind,
                quantity,
                write_back,
                indexing,
                rd,
                base_register,
                offset_info,
                offsetting,
            } => self.single_data_transfer(
                condition,
                load_store_kind,
                quantity,
                write_back,
                indexing,
                rd,
                base_register,
                offset_info,
                offsetting,
            )?,
            ArmModeInstruction::BlockDataTransfer {
                condition,
                indexing,
                offsetting,
                write_back,
                load_store,
                rn,
                register_list,
            } => self.block_data_transfer(
                condition,
                indexing,
                offsetting,
                write_back,
                load_store,
                rn,
                register_list,
            )?,
            ArmModeInstruction::Branch {
                condition,
                link,
                offset,
            } => self.branch(condition, link, offset),
            ArmModeInstruction::SoftwareInterrupt { comment, .. } => {
                return self.software_interrupt(comment);
            }
            ArmModeInstruction::CoprocessorDataTransfer { .. } | ArmModeInstruction::Undefined => {
                return Err(Fault::UndefinedInstruction { op_code });
            }
        }

        Ok(Step::Continue)
    }

    pub(crate) fn can_execute(&self, condition: Condition) -> bool {
        condition.evaluate(self.state.cpsr())
    }
}

/// The stepping driver.
#[derive(Debug, Default, Clone)]
pub struct Core {
    config: CoreConfig,
}

impl Core {
    #[must_use]
    pub const fn new(config: CoreConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Fetches, decodes and executes one instruction.
    ///
    /// Faults are raised on `exceptions` and then returned.
    ///
    /// # Errors
    ///
    /// The [`Fault`] that ended the step, after it has been raised.
    pub fn step<P, B, E>(
        &self,
        state: &mut P,
        bus: &mut B,
        exceptions: &mut E,
    ) -> Result<Step, Fault>
    where
        P: ProcessorState,
        B: Bus,
        E: ExceptionHandler,
    {
        let address = state.program_counter();

        let result = match bus.fetch(address) {
            Ok(op_code) => {
                state.advance_program_counter(SIZE_OF_INSTRUCTION);
                Interpreter::new(state, bus, &self.config).execute(op_code)
            }
            Err(fault) => Err(Fault::PrefetchAbort {
                address: fault.address,
            }),
        };

        match result {
            Ok(Step::Halt) if self.config.exit_on_halt => {
                tracing::info!(
                    "halt at 0x{address:08X}, exiting with code {}",
                    self.config.exit_code
                );
                std::process::exit(self.config.exit_code)
            }
            Ok(Step::Halt) => {
                tracing::info!("halt at 0x{address:08X}");
                Ok(Step::Halt)
            }
            Ok(Step::Continue) => Ok(Step::Continue),
            Err(fault) => {
                if fault.is_internal() {
                    tracing::warn!("internal failure at 0x{address:08X}: {fault}");
                } else {
                    tracing::debug!("exception at 0x{address:08X}: {fault} (code {})", fault.code());
                }
                exceptions.raise_exception(&fault);
                Err(fault)
            }
        }
    }
}
