use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::memory::{Bus, MemoryFault};

/// A single RAM region mapped at `base`, little-endian.
///
/// Accesses falling outside `base..base + len` fault. A multi-byte access
/// faults if any of its bytes is outside the region, reporting the first
/// unmapped byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalMemory {
    base: u32,
    data: Vec<u8>,
}

impl InternalMemory {
    #[must_use]
    pub fn new(base: u32, size: usize) -> Self {
        Self {
            base,
            data: vec![0; size],
        }
    }

    /// Maps `image` at `base`, the region is exactly as large as the image.
    #[must_use]
    pub fn with_image(base: u32, image: &[u8]) -> Self {
        Self {
            base,
            data: image.to_vec(),
        }
    }

    /// Copies a sequence of words starting at `address`, handy to place
    /// hand-assembled code.
    ///
    /// # Errors
    ///
    /// Fails on the first word that does not fit the region.
    pub fn load_words(&mut self, address: u32, words: &[u32]) -> Result<(), MemoryFault> {
        let mut address = address;
        for word in words {
            self.write_word(address, *word)?;
            address = address.wrapping_add(4);
        }
        Ok(())
    }

    /// Raw contents of the region, lowest address first, for dumping memory
    /// after a run.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn index_of(&self, address: u32) -> Result<usize, MemoryFault> {
        address
            .checked_sub(self.base)
            .and_then(|offset| usize::try_from(offset).ok())
            .filter(|offset| *offset < self.data.len())
            .ok_or(MemoryFault { address })
    }

    fn read_bytes<const N: usize>(&self, address: u32) -> Result<[u8; N], MemoryFault> {
        let mut bytes = [0; N];
        for (i, byte) in (0_u32..).zip(bytes.iter_mut()) {
            *byte = self.data[self.index_of(address.wrapping_add(i))?];
        }
        Ok(bytes)
    }

    fn write_bytes(&mut self, address: u32, bytes: &[u8]) -> Result<(), MemoryFault> {
        // Check the whole range first so a faulting access leaves memory untouched.
        let mut indexes = Vec::with_capacity(bytes.len());
        for i in (0_u32..).take(bytes.len()) {
            indexes.push(self.index_of(address.wrapping_add(i))?);
        }

        for (index, byte) in indexes.into_iter().zip(bytes) {
            self.data[index] = *byte;
        }
        Ok(())
    }
}

impl Bus for InternalMemory {
    fn read_word(&mut self, address: u32) -> Result<u32, MemoryFault> {
        self.read_bytes::<4>(address).map(u32::from_le_bytes)
    }

    fn read_half_word(&mut self, address: u32) -> Result<u16, MemoryFault> {
        self.read_bytes::<2>(address).map(u16::from_le_bytes)
    }

    fn read_byte(&mut self, address: u32) -> Result<u8, MemoryFault> {
        self.index_of(address).map(|index| self.data[index])
    }

    fn write_word(&mut self, address: u32, value: u32) -> Result<(), MemoryFault> {
        self.write_bytes(address, &value.to_le_bytes())
    }

    fn write_half_word(&mut self, address: u32, value: u16) -> Result<(), MemoryFault> {
        self.write_bytes(address, &value.to_le_bytes())
    }

    fn write_byte(&mut self, address: u32, value: u8) -> Result<(), MemoryFault> {
        let index = self.index_of(address)?;
        self.data[index] = value;
        Ok(())
    }

    fn fetch(&mut self, address: u32) -> Result<u32, MemoryFault> {
        if address.get_bits(0..=1) != 0 {
            tracing::debug!("fetching from unaligned address 0x{address:08X}");
        }
        self.read_word(address)
    }
}
