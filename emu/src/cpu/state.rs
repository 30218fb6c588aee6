//! # Processor State
//!
//! The interpreter never owns registers. It reads and mutates them through
//! [`ProcessorState`], so an embedder can plug in its own register file,
//! banking scheme or tracing proxy.
//!
//! ## R15
//!
//! The state keeps the address of the *next fetch*. The driver fetches from
//! there and advances it by one instruction before executing, which puts a
//! plain read of R15 at fetch + 4. [`ProcessorState::register_at`] adds
//! another 4 for R15, so instructions see `address of current + 8` as the
//! architecture mandates. Writing R15 sets the next fetch address directly.

use serde::{Deserialize, Serialize};

use crate::cpu::psr::{Psr, RESET_PSR};
use crate::cpu::registers::{REG_PROGRAM_COUNTER, Registers};
use crate::fault::Fault;

/// Offset between the next-fetch address and what a read of R15 returns.
pub const PIPELINE_READ_AHEAD: u32 = 4;

/// Registers and status registers as seen by the interpreter.
pub trait ProcessorState {
    /// Address the next instruction is fetched from.
    fn program_counter(&self) -> u32;

    fn advance_program_counter(&mut self, bytes: u32);

    /// Value of `reg`, R15 reads as current instruction + 8.
    fn register_at(&self, reg: usize) -> u32;

    /// Sets `reg`, writing R15 redirects the next fetch.
    fn set_register_at(&mut self, reg: usize, value: u32);

    fn cpsr(&self) -> Psr;

    fn spsr(&self) -> Psr;

    /// Executes an ALU, multiply or swap instruction whose condition already
    /// passed.
    ///
    /// Those instructions are outside the load/store/branch core. States that
    /// do not delegate them anywhere report them as undefined.
    ///
    /// # Errors
    ///
    /// Whatever fault the instruction raises.
    fn execute_data_processing(&mut self, op_code: u32) -> Result<(), Fault> {
        Err(Fault::UndefinedInstruction { op_code })
    }
}

/// Plain register file plus CPSR and SPSR, no banking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cpu {
    pub registers: Registers,
    pub cpsr: Psr,
    pub spsr: Psr,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Cpu {
    /// A core in its reset state that will fetch its first instruction at `entry`.
    #[must_use]
    pub fn new(entry: u32) -> Self {
        let mut registers = Registers::default();
        registers.set_program_counter(entry);

        Self {
            registers,
            cpsr: Psr::from(RESET_PSR),
            spsr: Psr::default(),
        }
    }
}

impl ProcessorState for Cpu {
    fn program_counter(&self) -> u32 {
        self.registers.program_counter()
    }

    fn advance_program_counter(&mut self, bytes: u32) {
        self.registers.advance_program_counter(bytes);
    }

    fn register_at(&self, reg: usize) -> u32 {
        if reg == REG_PROGRAM_COUNTER {
            self.registers
                .program_counter()
                .wrapping_add(PIPELINE_READ_AHEAD)
        } else {
            self.registers.register_at(reg)
        }
    }

    fn set_register_at(&mut self, reg: usize, value: u32) {
        self.registers.set_register_at(reg, value);
    }

    fn cpsr(&self) -> Psr {
        self.cpsr
    }

    fn spsr(&self) -> Psr {
        self.spsr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::registers::REG_LR;
    use pretty_assertions::assert_eq;

    #[test]
    fn reset_state() {
        let cpu = Cpu::new(0x8000);
        assert_eq!(cpu.program_counter(), 0x8000);
        assert_eq!(u32::from(cpu.cpsr()), RESET_PSR);
        assert_eq!(u32::from(cpu.spsr()), 0);
    }

    #[test]
    fn r15_reads_eight_ahead_of_the_executing_instruction() {
        let mut cpu = Cpu::new(0x8000);

        // What the driver does right after fetching the word at 0x8000.
        cpu.advance_program_counter(4);
        assert_eq!(cpu.register_at(REG_PROGRAM_COUNTER), 0x8008);

        cpu.set_register_at(REG_PROGRAM_COUNTER, 0x9000);
        assert_eq!(cpu.program_counter(), 0x9000);
        assert_eq!(cpu.register_at(REG_PROGRAM_COUNTER), 0x9004);
    }

    #[test]
    fn other_registers_read_back_verbatim() {
        let mut cpu = Cpu::default();
        cpu.set_register_at(REG_LR, 0xDEAD_BEEF);
        assert_eq!(cpu.register_at(REG_LR), 0xDEAD_BEEF);
        assert_eq!(cpu.registers.register_at(REG_LR), 0xDEAD_BEEF);
    }

    #[test]
    fn data_processing_is_undefined_by_default() {
        let mut cpu = Cpu::default();
        assert_eq!(
            cpu.execute_data_processing(0xE080_0001),
            Err(Fault::UndefinedInstruction {
                op_code: 0xE080_0001
            })
        );
    }
}
