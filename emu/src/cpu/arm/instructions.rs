//! # ARM Instruction Decoding
//!
//! Classifies a 32-bit instruction word and extracts the fields its executor
//! needs.
//!
//! ## Instruction Classes
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Bits 31-28 == 1111      →  unconditional space, rejected               │
//! │                                                                         │
//! │  Bits 27-25:                                                            │
//! │  000 + bit 7 + bit 4     →  LDRH/STRH/LDRSB/LDRSH (SH != 00)            │
//! │                             multiply/swap (SH == 00, ALU collaborator)  │
//! │  000 + P=1 U=0 S=0       →  miscellaneous: MRS, anything else undefined │
//! │  000                     →  Data Processing (register operand)         │
//! │  001                     →  Data Processing (immediate operand)        │
//! │  010                     →  LDR/STR (immediate offset)                 │
//! │  011                     →  LDR/STR (register offset), bit 4 undefined │
//! │  100                     →  LDM/STM                                    │
//! │  101                     →  B/BL                                       │
//! │  110                     →  Coprocessor Data Transfer (undefined)      │
//! │  111                     →  SWI if bit 24, otherwise undefined         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Data processing, multiply and swap instructions are only recognized here,
//! their fields belong to the ALU collaborator.

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::condition::Condition;
use crate::cpu::flags::{
    HalfwordDataTransferOffsetKind, HalfwordTransferKind, Indexing, LoadStoreKind, Offsetting,
    ReadWriteKind, ShiftKind,
};
use crate::cpu::psr::PsrKind;
use crate::fault::Fault;

/// Offset of a word/byte transfer, selected by bit 25 (I).
///
/// Note that I=1 selects the *register* form here, the opposite of data
/// processing instructions.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum SingleDataTransferOffsetInfo {
    /// Unsigned 12-bit immediate.
    Immediate { offset: u32 },

    /// Register shifted by a 5-bit immediate amount.
    RegisterImmediate {
        shift_amount: u32,
        shift_kind: ShiftKind,
        reg_offset: usize,
    },
}

impl SingleDataTransferOffsetInfo {
    fn disassembler(self, sign: &str) -> String {
        match self {
            Self::Immediate { offset } => format!("#{sign}{offset}"),
            Self::RegisterImmediate {
                shift_amount: 0,
                shift_kind: ShiftKind::Lsl,
                reg_offset,
            } => format!("{sign}R{reg_offset}"),
            Self::RegisterImmediate {
                shift_amount: 0,
                shift_kind: ShiftKind::Ror,
                reg_offset,
            } => format!("{sign}R{reg_offset}, RRX"),
            Self::RegisterImmediate {
                shift_amount,
                shift_kind,
                reg_offset,
            } => {
                // LSR #0 and ASR #0 encode a shift by 32.
                let amount = if shift_amount == 0 { 32 } else { shift_amount };
                format!("{sign}R{reg_offset}, {shift_kind} #{amount}")
            }
        }
    }
}

/// All ARM instruction types after decoding.
///
/// | Variant                   | Example Instructions | Executed by                 |
/// |---------------------------|----------------------|-----------------------------|
/// | `DataProcessing`          | ADD, MOV, MUL, SWP   | the state's ALU             |
/// | `Mrs`                     | MRS                  | this crate                  |
/// | `HalfwordDataTransfer`    | LDRH, STRH, LDRSB    | this crate                  |
/// | `SingleDataTransfer`      | LDR, STR, LDRB       | this crate                  |
/// | `BlockDataTransfer`       | LDM, STM             | this crate                  |
/// | `Branch`                  | B, BL                | this crate                  |
/// | `SoftwareInterrupt`       | SWI                  | this crate                  |
/// | `CoprocessorDataTransfer` | LDC, STC             | always undefined            |
/// | `Undefined`               | -                    | always undefined            |
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum ArmModeInstruction {
    DataProcessing {
        condition: Condition,
    },
    Mrs {
        condition: Condition,
        psr_kind: PsrKind,
        destination_register: usize,
    },
    HalfwordDataTransfer {
        condition: Condition,
        indexing: Indexing,
        offsetting: Offsetting,
        write_back: bool,
        load_store_kind: LoadStoreKind,
        offset_kind: HalfwordDataTransferOffsetKind,
        base_register: usize,
        source_destination_register: usize,
        transfer_kind: HalfwordTransferKind,
    },
    SingleDataTransfer {
        condition: Condition,
        load_store_kind: LoadStoreKind,
        quantity: ReadWriteKind,
        write_back: bool,
        indexing: Indexing,
        rd: usize,
        base_register: usize,
        offset_info: SingleDataTransferOffsetInfo,
        offsetting: Offsetting,
    },
    BlockDataTransfer {
        condition: Condition,
        indexing: Indexing,
        offsetting: Offsetting,
        write_back: bool,
        load_store: LoadStoreKind,
        rn: usize,
        register_list: u16,
    },
    Branch {
        condition: Condition,
        link: bool,
        /// Byte offset, the 24-bit field shifted left by 2 (26 significant bits).
        offset: u32,
    },
    CoprocessorDataTransfer {
        condition: Condition,
        load_store: LoadStoreKind,
    },
    SoftwareInterrupt {
        condition: Condition,
        comment: u32,
    },
    Undefined,
}

impl ArmModeInstruction {
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn disassembler(&self) -> String {
        match self {
            Self::DataProcessing { condition } => format!("ALU{condition}"),
            Self::Mrs {
                condition,
                psr_kind,
                destination_register,
            } => format!("MRS{condition} R{destination_register}, {psr_kind}"),
            Self::HalfwordDataTransfer {
                condition,
                indexing,
                offsetting,
                write_back,
                load_store_kind,
                offset_kind,
                base_register,
                source_destination_register,
                transfer_kind,
            } => {
                let sign = sign_of(*offsetting);

                let offset = match offset_kind {
                    HalfwordDataTransferOffsetKind::Immediate { offset: 0 } => String::new(),
                    HalfwordDataTransferOffsetKind::Immediate { offset } => {
                        format!(", #{sign}{offset}")
                    }
                    HalfwordDataTransferOffsetKind::Register { register } => {
                        format!(", {sign}R{register}")
                    }
                };

                let address = match indexing {
                    Indexing::Pre => {
                        let w = if *write_back { "!" } else { "" };
                        format!("[R{base_register}{offset}]{w}")
                    }
                    Indexing::Post => format!("[R{base_register}]{offset}"),
                };

                format!(
                    "{load_store_kind}{condition}{transfer_kind} R{source_destination_register}, {address}"
                )
            }
            Self::SingleDataTransfer {
                condition,
                load_store_kind,
                quantity,
                write_back,
                indexing,
                rd,
                base_register,
                offset_info,
                offsetting,
            } => {
                let b = match quantity {
                    ReadWriteKind::Word => "",
                    ReadWriteKind::Byte => "B",
                };
                let offset = offset_info.disassembler(sign_of(*offsetting));

                let (t, address) = match indexing {
                    Indexing::Pre => {
                        let w = if *write_back { "!" } else { "" };
                        ("", format!("[R{base_register}, {offset}]{w}"))
                    }
                    Indexing::Post => {
                        // W on a post-indexed transfer is the user-mode (T) form.
                        let t = if *write_back { "T" } else { "" };
                        (t, format!("[R{base_register}], {offset}"))
                    }
                };

                format!("{load_store_kind}{condition}{b}{t} R{rd}, {address}")
            }
            Self::BlockDataTransfer {
                condition,
                indexing,
                offsetting,
                write_back,
                load_store,
                rn,
                register_list,
            } => {
                let op = match load_store {
                    LoadStoreKind::Store => "STM",
                    LoadStoreKind::Load => "LDM",
                };

                let offset_modifier = match offsetting {
                    Offsetting::Down => "D",
                    Offsetting::Up => "I",
                };
                let index_type = match indexing {
                    Indexing::Pre => "B",
                    Indexing::Post => "A",
                };

                let registers = (0..=15)
                    .filter(|i| register_list.get_bit(*i))
                    .map(|i| format!("R{i}"))
                    .collect::<Vec<_>>()
                    .join(", ");

                let w = if *write_back { "!" } else { "" };
                format!("{op}{condition}{offset_modifier}{index_type} R{rn}{w}, {{{registers}}}")
            }
            Self::Branch {
                condition,
                link,
                offset,
            } => {
                let link = if *link { "L" } else { "" };
                format!("B{link}{condition} 0x{offset:08X}")
            }
            Self::CoprocessorDataTransfer {
                condition,
                load_store,
            } => {
                let op = match load_store {
                    LoadStoreKind::Store => "STC",
                    LoadStoreKind::Load => "LDC",
                };
                format!("{op}{condition}")
            }
            Self::SoftwareInterrupt { condition, comment } => {
                format!("SWI{condition} #0x{comment:06X}")
            }
            Self::Undefined => "UND".to_string(),
        }
    }

    /// Extra load/store space: bits 27-25 = 000 with bits 7 and 4 set.
    fn decode_halfword_transfer(op_code: u32, condition: Condition) -> Self {
        let Some(transfer_kind) = HalfwordTransferKind::from_sh(op_code.get_bits(5..=6)) else {
            // SH = 00 is multiply/swap.
            return Self::DataProcessing { condition };
        };

        let load_store_kind: LoadStoreKind = op_code.get_bit(20).into();
        if load_store_kind == LoadStoreKind::Store
            && transfer_kind != HalfwordTransferKind::UnsignedHalfwords
        {
            tracing::debug!(
                "undefined instruction decode: opcode=0x{op_code:08X}, signed store (S=1, L=0)"
            );
            return Self::Undefined;
        }

        let offset_kind = if op_code.get_bit(22) {
            let immediate_offset_high = op_code.get_bits(8..=11);
            let immediate_offset_low = op_code.get_bits(0..=3);

            HalfwordDataTransferOffsetKind::Immediate {
                offset: (immediate_offset_high << 4) | immediate_offset_low,
            }
        } else {
            HalfwordDataTransferOffsetKind::Register {
                register: op_code.get_bits(0..=3) as usize,
            }
        };

        Self::HalfwordDataTransfer {
            condition,
            indexing: op_code.get_bit(24).into(),
            offsetting: op_code.get_bit(23).into(),
            write_back: op_code.get_bit(21),
            load_store_kind,
            offset_kind,
            base_register: op_code.get_bits(16..=19) as usize,
            source_destination_register: op_code.get_bits(12..=15) as usize,
            transfer_kind,
        }
    }

    /// Miscellaneous space: bits 27-23 = 00010 with bit 20 clear. Only MRS is
    /// implemented.
    fn decode_miscellaneous(op_code: u32, condition: Condition) -> Self {
        let is_mrs = !op_code.get_bit(21)
            && op_code.get_bits(16..=19) == 0b1111
            && op_code.get_bits(0..=11) == 0;

        if is_mrs {
            Self::Mrs {
                condition,
                psr_kind: op_code.get_bit(22).into(),
                destination_register: op_code.get_bits(12..=15) as usize,
            }
        } else {
            tracing::debug!(
                "undefined instruction decode: opcode=0x{op_code:08X}, miscellaneous instruction other than MRS"
            );
            Self::Undefined
        }
    }

    fn decode_single_data_transfer(op_code: u32, condition: Condition) -> Self {
        let offset_info = if op_code.get_bit(25) {
            SingleDataTransferOffsetInfo::RegisterImmediate {
                shift_amount: op_code.get_bits(7..=11),
                shift_kind: op_code.get_bits(5..=6).into(),
                reg_offset: op_code.get_bits(0..=3) as usize,
            }
        } else {
            SingleDataTransferOffsetInfo::Immediate {
                offset: op_code.get_bits(0..=11),
            }
        };

        Self::SingleDataTransfer {
            condition,
            load_store_kind: op_code.get_bit(20).into(),
            quantity: op_code.get_bit(22).into(),
            write_back: op_code.get_bit(21),
            indexing: op_code.get_bit(24).into(),
            rd: op_code.get_bits(12..=15) as usize,
            base_register: op_code.get_bits(16..=19) as usize,
            offset_info,
            offsetting: op_code.get_bit(23).into(),
        }
    }

    /// LDM/STM with the S bit (user bank transfer or SPSR restore) is not
    /// modelled. It decodes as [`Self::Undefined`] and traps, instead of being
    /// skipped as a successful no-op.
    fn decode_block_data_transfer(op_code: u32, condition: Condition) -> Self {
        if op_code.get_bit(22) {
            tracing::debug!(
                "undefined instruction decode: opcode=0x{op_code:08X}, LDM/STM with S bit set"
            );
            return Self::Undefined;
        }

        Self::BlockDataTransfer {
            condition,
            indexing: op_code.get_bit(24).into(),
            offsetting: op_code.get_bit(23).into(),
            write_back: op_code.get_bit(21),
            load_store: op_code.get_bit(20).into(),
            rn: op_code.get_bits(16..=19) as usize,
            register_list: op_code.get_bits(0..=15) as u16,
        }
    }
}

const fn sign_of(offsetting: Offsetting) -> &'static str {
    match offsetting {
        Offsetting::Up => "+",
        Offsetting::Down => "-",
    }
}

impl TryFrom<u32> for ArmModeInstruction {
    type Error = Fault;

    fn try_from(op_code: u32) -> Result<Self, Self::Error> {
        let condition_bits = op_code.get_bits(28..=31);
        if condition_bits == 0b1111 {
            tracing::debug!("cannot decode opcode=0x{op_code:08X}, unconditional instruction space");
            return Err(Fault::Decode { op_code });
        }
        let condition = Condition::from(condition_bits as u8);

        let instruction = match op_code.get_bits(25..=27) {
            0b000 => {
                if op_code.get_bit(7) && op_code.get_bit(4) {
                    Self::decode_halfword_transfer(op_code, condition)
                } else if op_code.get_bits(23..=24) == 0b10 && !op_code.get_bit(20) {
                    Self::decode_miscellaneous(op_code, condition)
                } else {
                    Self::DataProcessing { condition }
                }
            }
            0b001 => Self::DataProcessing { condition },
            0b011 if op_code.get_bit(4) => {
                tracing::debug!(
                    "undefined instruction decode: opcode=0x{op_code:08X}, bits[25-27]=0b011, bit[4]=1"
                );
                Self::Undefined
            }
            0b010 | 0b011 => Self::decode_single_data_transfer(op_code, condition),
            0b100 => Self::decode_block_data_transfer(op_code, condition),
            0b101 => Self::Branch {
                condition,
                link: op_code.get_bit(24),
                offset: op_code.get_bits(0..=23) << 2,
            },
            0b110 => Self::CoprocessorDataTransfer {
                condition,
                load_store: op_code.get_bit(20).into(),
            },
            _ => {
                if op_code.get_bit(24) {
                    Self::SoftwareInterrupt {
                        condition,
                        comment: op_code.get_bits(0..=23),
                    }
                } else {
                    tracing::debug!(
                        "undefined instruction decode: opcode=0x{op_code:08X}, coprocessor operation"
                    );
                    Self::Undefined
                }
            }
        };

        Ok(instruction)
    }
}

impl std::fmt::Display for ArmModeInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.disassembler())
    }
}
