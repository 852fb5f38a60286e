use crate::binary::v1_1::flex_uint::{FlexUInt, MAX_FLEX_ENCODED_SIZE_IN_BYTES};
use crate::result::IonFailure;
use crate::IonResult;
use ice_code::ice as cold_path;

const BITS_PER_I64: usize = 64;
const BITS_PER_ENCODED_BYTE: usize = 7;

// Compile-time mapping from number of leading sign bits to the number of bytes needed to encode
const fn init_bytes_needed_cache() -> [u8; 65] {
    let mut cache = [0u8; 65];
    let mut leading_sign_bits = 0usize;
    while leading_sign_bits <= BITS_PER_I64 {
        let magnitude_bits_needed = BITS_PER_I64 - leading_sign_bits;
        // One more bit is needed for the sign.
        cache[leading_sign_bits] = ((magnitude_bits_needed / BITS_PER_ENCODED_BYTE) + 1) as u8;
        leading_sign_bits += 1;
    }
    cache
}

static BYTES_NEEDED_CACHE: [u8; 65] = init_bytes_needed_cache();

/// An Ion 1.1 encoding primitive that represents a variable-length signed integer.
///
/// A FlexInt uses the same length-prefix scheme as a [`FlexUInt`]; the bits that remain after
/// the continuation flags are a two's complement integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlexInt {
    value: i64,
    size_in_bytes: usize,
}

impl FlexInt {
    pub(crate) fn new(size_in_bytes: usize, value: i64) -> Self {
        Self {
            value,
            size_in_bytes,
        }
    }

    /// Reads a [`FlexInt`] from the beginning of `input`.
    ///
    /// `input` is the byte slice from which to read a `FlexInt`.
    /// `offset` is the position of the slice in some larger input stream. It is only used to populate
    ///          an appropriate error message if reading fails.
    #[inline]
    pub fn read(input: &[u8], offset: usize) -> IonResult<FlexInt> {
        let flex_uint = if input.len() >= 8 && input[0] != 0 {
            FlexUInt::read_small_flex_uint(input)
        } else {
            FlexUInt::read_flex_primitive_as_uint_no_inline(input, offset, "a FlexInt")?
        };
        let size_in_bytes = flex_uint.size_in_bytes();
        // Shift the magnitude's sign bit into the i64's sign bit and back to sign-extend it.
        let sign_extend_shift = (BITS_PER_I64 - size_in_bytes * BITS_PER_ENCODED_BYTE) as u32;
        let value = ((flex_uint.value() << sign_extend_shift) as i64) >> sign_extend_shift;
        Ok(FlexInt::new(size_in_bytes, value))
    }

    /// Reads a [`FlexInt`] that begins at `position` in `source`.
    #[inline]
    pub fn read_at(source: &[u8], position: usize) -> IonResult<FlexInt> {
        match source.get(position..) {
            Some(input) => Self::read(input, position),
            None => IonResult::incomplete("a FlexInt", position),
        }
    }

    /// Returns the number of bytes needed to encode `value` as a FlexInt.
    #[inline]
    pub fn encoded_size(value: i64) -> usize {
        // XOR with the sign turns leading ones into leading zeros for negative values.
        let leading_sign_bits = (value ^ (value >> 63)).leading_zeros() as usize;
        BYTES_NEEDED_CACHE[leading_sign_bits] as usize
    }

    /// Writes `value` to `output` as a FlexInt, returning the number of bytes written.
    ///
    /// Values outside of `-2^62..2^62` need ten bytes and are rejected.
    #[inline]
    pub fn write_i64(output: &mut Vec<u8>, value: i64) -> IonResult<usize> {
        let num_encoded_bytes = Self::encoded_size(value);
        if num_encoded_bytes < MAX_FLEX_ENCODED_SIZE_IN_BYTES {
            let flag_bits = 1i64 << (num_encoded_bytes - 1);
            // Left shift the value to accommodate the trailing flag bits and then OR them together
            let encoded_value = (value << num_encoded_bytes) | flag_bits;
            output.extend_from_slice(&encoded_value.to_le_bytes()[..num_encoded_bytes]);
            return Ok(num_encoded_bytes);
        }
        cold_path! {{
            if num_encoded_bytes > MAX_FLEX_ENCODED_SIZE_IN_BYTES {
                return IonResult::illegal_operation(format!(
                    "cannot encode {value} as a FlexInt of 9 or fewer bytes"
                ));
            }
            output.push(0x00);
            output.extend_from_slice(&((value << 1) | 1).to_le_bytes());
            Ok(MAX_FLEX_ENCODED_SIZE_IN_BYTES)
        }}
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn size_in_bytes(&self) -> usize {
        self.size_in_bytes
    }
}
