//! # Memory Bus
//!
//! The core never owns memory. Every access goes through a [`Bus`] supplied
//! by the embedder, one call per access. Multi-byte values are whatever the
//! bus says they are: this crate does not check alignment nor byte order.
//!
//! [`InternalMemory`](internal_memory::InternalMemory) is a flat
//! little-endian implementation good enough to run small programs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod internal_memory;

/// The bus refused an access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("no memory mapped at 0x{address:08X}")]
pub struct MemoryFault {
    pub address: u32,
}

/// Byte-addressable 32-bit address space.
pub trait Bus {
    fn read_word(&mut self, address: u32) -> Result<u32, MemoryFault>;

    fn read_half_word(&mut self, address: u32) -> Result<u16, MemoryFault>;

    fn read_byte(&mut self, address: u32) -> Result<u8, MemoryFault>;

    fn write_word(&mut self, address: u32, value: u32) -> Result<(), MemoryFault>;

    fn write_half_word(&mut self, address: u32, value: u16) -> Result<(), MemoryFault>;

    fn write_byte(&mut self, address: u32, value: u8) -> Result<(), MemoryFault>;

    /// Reads the instruction word at `address`.
    ///
    /// Buses with separate instruction and data paths override this, the
    /// default is a plain word read.
    fn fetch(&mut self, address: u32) -> Result<u32, MemoryFault> {
        self.read_word(address)
    }
}
