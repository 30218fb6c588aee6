//! # ARM Core
//!
//! - [`condition`] - Condition codes and their evaluation
//! - [`arm`] - Decoding, addressing modes and execution of ARM instructions
//! - [`interpreter`] - Single-step driver
//! - [`state`] - Processor state seam and a plain register file
//! - [`psr`], [`registers`], [`flags`] - Building blocks

pub mod arm;
pub mod condition;

#[allow(clippy::cast_possible_truncation)]
pub mod flags;
pub mod interpreter;
pub mod psr;
pub mod registers;
pub mod state;
