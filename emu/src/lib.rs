//! Instruction-step interpreter for the ARMv5T instruction set.
//!
//! The crate decodes and executes one ARM instruction at a time. Registers,
//! memory and exception delivery are collaborators supplied by the embedder
//! through [`ProcessorState`], [`Bus`] and [`ExceptionHandler`]; [`Cpu`] and
//! [`InternalMemory`] are minimal implementations of the first two.
//!
//! ```
//! use armstep::{Core, CoreConfig, Cpu, ExceptionLog, InternalMemory, Step};
//!
//! let mut memory = InternalMemory::new(0x8000, 0x100);
//! // MRS R0, CPSR then SWI #0x123456
//! memory.load_words(0x8000, &[0xE10F_0000, 0xEF12_3456]).unwrap();
//!
//! let core = Core::new(CoreConfig::embedded());
//! let mut cpu = Cpu::new(0x8000);
//! let mut exceptions = ExceptionLog::default();
//!
//! while core.step(&mut cpu, &mut memory, &mut exceptions) == Ok(Step::Continue) {}
//! assert!(exceptions.raised.is_empty());
//! ```

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
pub mod bitwise;

pub mod config;
pub mod cpu;
pub mod fault;
pub mod memory;

pub use config::CoreConfig;
pub use cpu::interpreter::{Core, ExceptionHandler, ExceptionLog, Interpreter, Step};
pub use cpu::state::{Cpu, ProcessorState};
pub use fault::Fault;
pub use memory::internal_memory::InternalMemory;
pub use memory::{Bus, MemoryFault};
