//! # Program Status Registers (CPSR and SPSR)
//!
//! ```text
//! 31 30 29 28 27 26      8 7 6 5 4   0
//! ┌──┬──┬──┬──┬──┬────────┬─┬─┬─┬─────┐
//! │N │Z │C │V │Q │Reserved│I│F│T│Mode │
//! └──┴──┴──┴──┴──┴────────┴─┴─┴─┴─────┘
//! ```
//!
//! Only the condition flags are interpreted by this crate, see
//! [`condition`](super::condition). The rest of the word is carried verbatim,
//! which is what `MRS` needs.

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;

/// Supervisor mode with IRQ and FIQ masked, the state the processor resets into.
pub const RESET_PSR: u32 = 0b1101_0011;

/// Program Status Register (CPSR or SPSR), a thin wrapper over the raw word.
///
/// # Example
///
/// ```
/// use armstep::cpu::psr::Psr;
///
/// let mut cpsr = Psr::default();
/// cpsr.set_zero_flag(true);
/// assert!(cpsr.zero_flag());
/// assert_eq!(u32::from(cpsr), 0x4000_0000);
/// ```
#[derive(Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Psr(u32);

impl Psr {
    /// N => Bit 31, (0=Not Signed, 1=Signed)
    #[must_use]
    pub const fn sign_flag(self) -> bool {
        (self.0 >> 31) & 1 == 1
    }

    /// Z => Bit 30, (0=Not Zero, 1=Zero)
    #[must_use]
    pub const fn zero_flag(self) -> bool {
        (self.0 >> 30) & 1 == 1
    }

    /// C => Bit 29, (0=Borrow/No Carry, 1=Carry/No Borrow)
    #[must_use]
    pub const fn carry_flag(self) -> bool {
        (self.0 >> 29) & 1 == 1
    }

    /// V => Bit 28, (0=No Overflow, 1=Overflow)
    #[must_use]
    pub const fn overflow_flag(self) -> bool {
        (self.0 >> 28) & 1 == 1
    }

    /// M4-M0 => Bits 4-0
    #[must_use]
    pub fn mode_bits(self) -> u32 {
        self.0.get_bits(0..=4)
    }

    pub fn set_sign_flag(&mut self, value: bool) {
        self.0.set_bit(31, value);
    }

    pub fn set_zero_flag(&mut self, value: bool) {
        self.0.set_bit(30, value);
    }

    pub fn set_carry_flag(&mut self, value: bool) {
        self.0.set_bit(29, value);
    }

    pub fn set_overflow_flag(&mut self, value: bool) {
        self.0.set_bit(28, value);
    }
}

impl From<u32> for Psr {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Psr> for u32 {
    fn from(value: Psr) -> Self {
        value.0
    }
}

impl std::fmt::Debug for Psr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let flag = |on: bool, name: char| if on { name } else { '-' };
        write!(
            f,
            "Psr({}{}{}{} mode=0b{:05b} raw=0x{:08X})",
            flag(self.sign_flag(), 'N'),
            flag(self.zero_flag(), 'Z'),
            flag(self.carry_flag(), 'C'),
            flag(self.overflow_flag(), 'V'),
            self.mode_bits(),
            self.0
        )
    }
}

/// Which status register an `MRS` reads, selected by bit 22.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PsrKind {
    Cpsr,
    Spsr,
}

impl From<bool> for PsrKind {
    fn from(value: bool) -> Self {
        if value { Self::Spsr } else { Self::Cpsr }
    }
}

impl std::fmt::Display for PsrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cpsr => f.write_str("CPSR"),
            Self::Spsr => f.write_str("SPSR"),
        }
    }
}
