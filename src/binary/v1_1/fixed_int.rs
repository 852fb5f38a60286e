use num_bigint::BigInt;

use crate::result::IonFailure;
use crate::types::Int;
use crate::IonResult;

/// The widest FixedInt that can be read directly into an `i64`.
pub(crate) const MAX_I64_SIZE_IN_BYTES: usize = std::mem::size_of::<i64>();

/// An Ion 1.1 encoding primitive that represents a fixed-length signed integer.
///
/// Encodings of up to eight bytes always produce an `Int::I64`. Wider encodings (used by the
/// `0xF6` integer opcode and by decimal coefficients) produce an `Int::BigInt` when the value does
/// not fit in an `i64`.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedInt {
    value: Int,
    size_in_bytes: usize,
}

impl FixedInt {
    fn new(size_in_bytes: usize, value: impl Into<Int>) -> Self {
        Self {
            value: value.into(),
            size_in_bytes,
        }
    }

    /// Reads a [`FixedInt`] from the beginning of `input`.
    ///
    /// `input` is the byte slice from which to read a [`FixedInt`].
    /// `size_in_bytes` is the number of bytes to interpret as a signed integer.
    /// `offset` is the position of the slice in some larger input stream. It is only used to populate
    ///          an appropriate error message if reading fails.
    #[inline]
    pub fn read(input: &[u8], size_in_bytes: usize, offset: usize) -> IonResult<FixedInt> {
        let bytes = match input.get(..size_in_bytes) {
            Some(bytes) => bytes,
            None => return IonResult::incomplete("a FixedInt", offset),
        };
        Ok(FixedInt::new(size_in_bytes, Int::from_le_signed_bytes(bytes)))
    }

    /// Reads a FixedInt of `size_in_bytes` (at most 8) bytes as an `i64`. This is the common path
    /// for the `0x61`-`0x68` integer opcodes.
    #[inline]
    pub fn read_i64(input: &[u8], size_in_bytes: usize, offset: usize) -> IonResult<i64> {
        if size_in_bytes > MAX_I64_SIZE_IN_BYTES {
            return IonResult::decoding_error(format!(
                "found a {size_in_bytes}-byte FixedInt at offset {offset}; at most 8 bytes fit in an i64"
            ));
        }
        let bytes = match input.get(..size_in_bytes) {
            Some(bytes) => bytes,
            None => return IonResult::incomplete("a FixedInt", offset),
        };
        if size_in_bytes == 0 {
            return Ok(0);
        }
        let mut buffer = [0u8; MAX_I64_SIZE_IN_BYTES];
        // Copy the input into the buffer as the _most_ significant bytes, then shift right to
        // extend the sign.
        buffer[MAX_I64_SIZE_IN_BYTES - size_in_bytes..].copy_from_slice(bytes);
        let shift = (MAX_I64_SIZE_IN_BYTES - size_in_bytes) as u32 * 8;
        Ok(i64::from_le_bytes(buffer) >> shift)
    }

    /// Returns the number of bytes needed to encode `value` as a FixedInt.
    #[inline]
    pub fn encoded_size(value: i64) -> usize {
        let num_sign_bits = if value < 0 {
            value.leading_ones()
        } else {
            value.leading_zeros()
        };
        let num_magnitude_bits = 64 - num_sign_bits as usize;
        (num_magnitude_bits / 8 + 1).min(MAX_I64_SIZE_IN_BYTES)
    }

    /// Writes `value` to `output` using as few bytes as possible, returning the number of bytes
    /// written.
    pub fn write_i64(output: &mut Vec<u8>, value: i64) -> IonResult<usize> {
        let num_encoded_bytes = Self::encoded_size(value);
        output.extend_from_slice(&value.to_le_bytes()[..num_encoded_bytes]);
        Ok(num_encoded_bytes)
    }

    /// Writes `value` to `output`, returning the number of bytes written.
    pub fn write(output: &mut Vec<u8>, value: &Int) -> IonResult<usize> {
        match value {
            Int::I64(value) => Self::write_i64(output, *value),
            Int::BigInt(value) => {
                let bytes = BigInt::to_signed_bytes_le(value);
                output.extend_from_slice(&bytes);
                Ok(bytes.len())
            }
        }
    }

    pub fn value(&self) -> &Int {
        &self.value
    }

    pub fn size_in_bytes(&self) -> usize {
        self.size_in_bytes
    }
}

impl From<FixedInt> for Int {
    fn from(other: FixedInt) -> Self {
        other.value
    }
}
