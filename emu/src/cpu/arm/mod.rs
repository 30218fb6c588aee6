//! # ARM Instruction Set (32-bit)
//!
//! Conditional execution on every instruction.
//!
//! ## Format
//!
//! ```text
//! 31-28   27-25   24-0
//! [Cond] [Format] [Instruction-specific]
//! ```
//!
//! - **Condition (bits 28-31)**: See [`condition`](super::condition)
//! - **Format (bits 25-27)**: Determines instruction category
//!
//! ## Instruction Categories
//!
//! | Bits 27-25 | Category              | Examples                    |
//! |------------|-----------------------|-----------------------------|
//! | 00x        | Data Processing       | AND, ADD, CMP, MOV          |
//! | 000        | Half-word Transfer    | LDRH, STRH, LDRSB, LDRSH    |
//! | 000        | Status Register Read  | MRS                         |
//! | 01x        | Single Data Transfer  | LDR, STR                    |
//! | 100        | Block Data Transfer   | LDM, STM                    |
//! | 101        | Branch                | B, BL                       |
//! | 110        | Coprocessor Transfer  | LDC, STC (undefined)        |
//! | 1111       | Software Interrupt    | SWI                         |
//!
//! ## Submodules
//!
//! - [`instructions`] - Decoding (`TryFrom<u32>`)
//! - [`mode`] - Addressing modes
//! - [`operations`] - Execution
//! - [`shifter`] - Barrel shifter for register offsets

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::similar_names)]
pub mod instructions;

#[allow(clippy::cast_possible_truncation)]
pub mod mode;

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::similar_names)]
pub mod operations;

pub mod shifter;
