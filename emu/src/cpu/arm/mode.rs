//! # Addressing Modes
//!
//! Effective address computation for the load/store instructions, including
//! the base register write-back.
//!
//! The condition of the instruction is evaluated once by the executor and
//! passed in as `passed`. Forms that write the base back only do so when it
//! holds, and return `None` otherwise: the transfer must then be skipped. The
//! plain offset forms always return the address, the executor decides.
//!
//! Loads and stores are treated alike: when the condition fails the executor
//! performs no memory access at all, a store does not write to the address it
//! got back.
//!
//! | P | W | Form         | Address        | Base register       |
//! |---|---|--------------|----------------|---------------------|
//! | 1 | 0 | offset       | `Rn ± offset`  | untouched           |
//! | 1 | 1 | pre-indexed  | `Rn ± offset`  | `Rn ± offset`       |
//! | 0 | x | post-indexed | `Rn`           | `Rn ± offset`       |

use crate::bitwise::Bits;
use crate::cpu::arm::instructions::SingleDataTransferOffsetInfo;
use crate::cpu::arm::shifter::shift;
use crate::cpu::flags::{HalfwordDataTransferOffsetKind, Indexing, Offsetting};
use crate::cpu::interpreter::Interpreter;
use crate::cpu::state::ProcessorState;
use crate::fault::Fault;
use crate::memory::Bus;

/// First and last word address touched by a block transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    pub start: u32,
    pub end: u32,
}

impl BlockRange {
    /// Checks that a walk of the register list which stopped at
    /// `next_address` ended on the last word of the range.
    ///
    /// # Errors
    ///
    /// [`Fault::BlockTransferMismatch`] when it did not, that is a bug of the
    /// core, not of the guest program.
    pub fn check_end(self, next_address: u32) -> Result<(), Fault> {
        let actual = next_address.wrapping_sub(4);
        if actual == self.end {
            Ok(())
        } else {
            tracing::warn!(
                "block transfer walked to 0x{actual:08X} instead of 0x{:08X}",
                self.end
            );
            Err(Fault::BlockTransferMismatch {
                expected: self.end,
                actual,
            })
        }
    }
}

impl<P: ProcessorState, B: Bus> Interpreter<'_, P, B> {
    /// Address of a LDRH/STRH/LDRSB/LDRSH.
    ///
    /// Post-indexing with W set is unpredictable for these forms, it is
    /// treated as a transfer that does not happen.
    pub(crate) fn address_mode_half(
        &mut self,
        indexing: Indexing,
        offsetting: Offsetting,
        write_back: bool,
        offset_kind: HalfwordDataTransferOffsetKind,
        base_register: usize,
        passed: bool,
    ) -> Option<u32> {
        if indexing == Indexing::Post && write_back {
            tracing::debug!("unpredictable post-indexed half-word transfer with W set, skipping");
            return None;
        }

        let offset = match offset_kind {
            HalfwordDataTransferOffsetKind::Immediate { offset } => offset,
            HalfwordDataTransferOffsetKind::Register { register } => {
                self.state.register_at(register)
            }
        };

        self.indexed_address(indexing, offsetting, write_back, base_register, offset, passed)
    }

    /// Address of a LDR/STR/LDRB/STRB.
    ///
    /// A register offset goes through the barrel shifter first, RRX takes the
    /// current carry. Post-indexing with W set (the `T` forms) addresses like
    /// plain post-indexing.
    pub(crate) fn address_mode_word_byte(
        &mut self,
        indexing: Indexing,
        offsetting: Offsetting,
        write_back: bool,
        offset_info: SingleDataTransferOffsetInfo,
        base_register: usize,
        passed: bool,
    ) -> Option<u32> {
        let offset = match offset_info {
            SingleDataTransferOffsetInfo::Immediate { offset } => offset,
            SingleDataTransferOffsetInfo::RegisterImmediate {
                shift_amount,
                shift_kind,
                reg_offset,
            } => {
                let rm = self.state.register_at(reg_offset);
                shift(shift_kind, shift_amount, rm, self.state.cpsr().carry_flag())
            }
        };

        self.indexed_address(indexing, offsetting, write_back, base_register, offset, passed)
    }

    /// Lowest and highest address of a LDM/STM, writing the base back by the
    /// full transfer size when `passed` and `write_back` both hold.
    ///
    /// | Mode | start                | end               |
    /// |------|----------------------|-------------------|
    /// | IA   | `Rn`                 | `Rn + 4*n - 4`    |
    /// | IB   | `Rn + 4`             | `Rn + 4*n`        |
    /// | DA   | `Rn - 4*n + 4`       | `Rn`              |
    /// | DB   | `Rn - 4*n`           | `Rn - 4`          |
    ///
    /// An empty list gives `end = start - 4`, which a walk of zero registers
    /// satisfies.
    pub(crate) fn address_mode_multiple(
        &mut self,
        indexing: Indexing,
        offsetting: Offsetting,
        write_back: bool,
        base_register: usize,
        register_list: u16,
        passed: bool,
    ) -> BlockRange {
        let base = self.state.register_at(base_register);
        let count = register_list.count_ones() * 4;

        let (start, end) = match (offsetting, indexing) {
            (Offsetting::Up, Indexing::Post) => (base, base.wrapping_add(count).wrapping_sub(4)),
            (Offsetting::Up, Indexing::Pre) => (base.wrapping_add(4), base.wrapping_add(count)),
            (Offsetting::Down, Indexing::Post) => {
                (base.wrapping_sub(count).wrapping_add(4), base)
            }
            (Offsetting::Down, Indexing::Pre) => (base.wrapping_sub(count), base.wrapping_sub(4)),
        };

        if passed && write_back {
            self.state
                .set_register_at(base_register, offsetting.apply(base, count));
        }

        BlockRange { start, end }
    }

    fn indexed_address(
        &mut self,
        indexing: Indexing,
        offsetting: Offsetting,
        write_back: bool,
        base_register: usize,
        offset: u32,
        passed: bool,
    ) -> Option<u32> {
        let base = self.state.register_at(base_register);
        let offset_address = offsetting.apply(base, offset);

        match (indexing, write_back) {
            (Indexing::Pre, false) => Some(offset_address),
            (Indexing::Pre, true) => {
                if !passed {
                    return None;
                }
                self.state.set_register_at(base_register, offset_address);
                Some(offset_address)
            }
            (Indexing::Post, _) => {
                if !passed {
                    return None;
                }
                self.state.set_register_at(base_register, offset_address);
                Some(base)
            }
        }
    }
}

/// Register indexes of a block transfer list, lowest first.
pub fn registers_in_list(register_list: u16) -> impl Iterator<Item = usize> {
    (0..=15_u8)
        .filter(move |reg| register_list.get_bit(*reg))
        .map(usize::from)
}
