use std::ops::RangeInclusive;

/// Helpers to read and write bit fields of fixed-width words.
///
/// Bit indexes go from lsb to msb (right to left). A range `hi..=lo` is always
/// written low bound first, e.g. bits 23-0 of an instruction are `0..=23`.
pub trait Bits: Copy {
    /// Width of the word in bits.
    const WIDTH: u8;

    fn get_bit(self, bit_idx: u8) -> bool;

    fn set_bit(&mut self, bit_idx: u8, value: bool);

    /// Extracts the field covered by `bits_range`, moved down to bit 0.
    fn get_bits(self, bits_range: RangeInclusive<u8>) -> Self;

    /// Deposits the low bits of `value` into the field covered by `bits_range`.
    /// Bits of `value` that do not fit the field are dropped.
    fn set_bits(&mut self, bits_range: RangeInclusive<u8>, value: Self);

    /// Returns a sign-extended copy of the value, treating it as a
    /// two's complement number `number_of_bits` long.
    fn sign_extended(self, number_of_bits: u8) -> Self;

    /// Shifts right replicating the sign bit. Amounts past the width saturate.
    fn arithmetic_shift_right(self, amount: u32) -> Self;
}

macro_rules! impl_bits {
    ($($unsigned:ty => $signed:ty),* $(,)?) => {
        $(
            impl Bits for $unsigned {
                const WIDTH: u8 = <$unsigned>::BITS as u8;

                fn get_bit(self, bit_idx: u8) -> bool {
                    debug_assert!(bit_idx < Self::WIDTH);
                    (self >> bit_idx) & 1 == 1
                }

                fn set_bit(&mut self, bit_idx: u8, value: bool) {
                    debug_assert!(bit_idx < Self::WIDTH);
                    let mask: $unsigned = 1 << bit_idx;
                    if value {
                        *self |= mask;
                    } else {
                        *self &= !mask;
                    }
                }

                fn get_bits(self, bits_range: RangeInclusive<u8>) -> Self {
                    let (start, end) = (*bits_range.start(), *bits_range.end());
                    debug_assert!(start <= end && end < Self::WIDTH);

                    // `length` ones, e.g. 4..=7 gives 0b1111.
                    let length = end - start + 1;
                    let mask = <$unsigned>::MAX >> (Self::WIDTH - length);

                    (self >> start) & mask
                }

                fn set_bits(&mut self, bits_range: RangeInclusive<u8>, value: Self) {
                    let (start, end) = (*bits_range.start(), *bits_range.end());
                    debug_assert!(start <= end && end < Self::WIDTH);

                    let length = end - start + 1;
                    let mask = (<$unsigned>::MAX >> (Self::WIDTH - length)) << start;

                    *self = (*self & !mask) | ((value << start) & mask);
                }

                fn sign_extended(self, number_of_bits: u8) -> Self {
                    debug_assert!(number_of_bits > 0 && number_of_bits <= Self::WIDTH);

                    // Move the sign bit of the field to the msb, then let the
                    // signed shift bring it back replicating it on the way.
                    let unused = Self::WIDTH - number_of_bits;
                    (((self << unused) as $signed) >> unused) as $unsigned
                }

                fn arithmetic_shift_right(self, amount: u32) -> Self {
                    let amount = amount.min(u32::from(Self::WIDTH) - 1);
                    ((self as $signed) >> amount) as $unsigned
                }
            }
        )*
    };
}

impl_bits!(u32 => i32, u16 => i16, u8 => i8);
