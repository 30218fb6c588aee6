//! # Barrel Shifter
//!
//! Shifts the register offset of a word/byte transfer. Only the 5-bit
//! immediate amount form exists there, and an amount of 0 changes meaning:
//!
//! | Kind | Amount 0 means | Result                          |
//! |------|----------------|---------------------------------|
//! | LSL  | no shift       | `rm`                            |
//! | LSR  | LSR #32        | `0`                             |
//! | ASR  | ASR #32        | all bits equal to bit 31 of `rm`|
//! | ROR  | RRX            | `carry:rm[31:1]`                |
//!
//! Only the shifted value is produced, the carry flag is never updated by an
//! address computation.

use crate::bitwise::Bits;
use crate::cpu::flags::ShiftKind;

/// Shifts `rm` by `shift_amount` bits as selected by `kind`. `carry` is the
/// current C flag, consumed by RRX only.
#[must_use]
pub fn shift(kind: ShiftKind, shift_amount: u32, rm: u32, carry: bool) -> u32 {
    match (kind, shift_amount) {
        (ShiftKind::Lsl, amount) => rm.checked_shl(amount).unwrap_or(0),
        (ShiftKind::Lsr, 0) => 0,
        (ShiftKind::Lsr, amount) => rm.checked_shr(amount).unwrap_or(0),
        (ShiftKind::Asr, 0) => rm.arithmetic_shift_right(31),
        (ShiftKind::Asr, amount) => rm.arithmetic_shift_right(amount),
        (ShiftKind::Ror, 0) => (u32::from(carry) << 31) | (rm >> 1),
        (ShiftKind::Ror, amount) => rm.rotate_right(amount),
    }
}
