use crate::result::IonFailure;
use crate::IonResult;
use ice_code::ice as cold_path;

const BITS_PER_U64: usize = 64;
const BITS_PER_ENCODED_BYTE: usize = 7;

/// The largest FlexUInt this crate will read or write. Nine bytes hold 63 bits of magnitude.
pub(crate) const MAX_FLEX_ENCODED_SIZE_IN_BYTES: usize = 9;

// Compile-time mapping from number of leading zeros to the number of bytes needed to encode
const fn init_bytes_needed_cache() -> [u8; 65] {
    let mut cache = [0u8; 65];
    let mut leading_zeros = 0usize;
    while leading_zeros < BITS_PER_U64 {
        let magnitude_bits_needed = BITS_PER_U64 - leading_zeros;
        cache[leading_zeros] =
            ((magnitude_bits_needed + BITS_PER_ENCODED_BYTE - 1) / BITS_PER_ENCODED_BYTE) as u8;
        leading_zeros += 1;
    }
    // Special case: 64 leading zeros means it's `0u64`, which requires one byte.
    cache[64] = 1;
    cache
}

static BYTES_NEEDED_CACHE: [u8; 65] = init_bytes_needed_cache();

/// An Ion 1.1 encoding primitive that represents a variable-length unsigned integer.
///
/// The number of trailing zero bits in the first byte, plus one, is the total number of bytes
/// in the encoding. A first byte of `0x00` indicates a 9-byte encoding whose second byte must
/// have its lowest bit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlexUInt {
    value: u64,
    size_in_bytes: usize,
}

impl FlexUInt {
    pub(crate) fn new(size_in_bytes: usize, value: u64) -> Self {
        Self {
            value,
            size_in_bytes,
        }
    }

    /// Reads a [`FlexUInt`] from the beginning of `input`.
    ///
    /// `input` is the byte slice from which to read a `FlexUInt`.
    /// `offset` is the position of the slice in some larger input stream. It is only used to populate
    ///          an appropriate error message if reading fails.
    #[inline]
    pub fn read(input: &[u8], offset: usize) -> IonResult<FlexUInt> {
        const COMMON_CASE_INPUT_BYTES_NEEDED: usize = 8;

        // A single length check covers every FlexUInt whose continuation bits fit in the first
        // byte. Short buffers and 9-byte encodings take the general path.
        if input.len() < COMMON_CASE_INPUT_BYTES_NEEDED || input[0] == 0 {
            return Self::read_flex_primitive_as_uint_no_inline(input, offset, "a FlexUInt");
        }
        Ok(Self::read_small_flex_uint(input))
    }

    /// Reads a [`FlexUInt`] that begins at `position` in `source`.
    #[inline]
    pub fn read_at(source: &[u8], position: usize) -> IonResult<FlexUInt> {
        match source.get(position..) {
            Some(input) => Self::read(input, position),
            None => IonResult::incomplete("a FlexUInt", position),
        }
    }

    /// Returns the encoded size of the [`FlexUInt`] that begins at `position` in `source` without
    /// decoding its value.
    #[inline]
    pub fn size_at(source: &[u8], position: usize) -> IonResult<usize> {
        let first_byte = match source.get(position) {
            Some(byte) => *byte,
            None => return IonResult::incomplete("a FlexUInt", position),
        };
        let size = if first_byte != 0 {
            first_byte.trailing_zeros() as usize + 1
        } else {
            match source.get(position + 1) {
                Some(second_byte) if second_byte & 1 == 1 => MAX_FLEX_ENCODED_SIZE_IN_BYTES,
                Some(_) => return Self::too_large(),
                None => return IonResult::incomplete("a FlexUInt", position),
            }
        };
        if source.len() < position + size {
            return IonResult::incomplete("a FlexUInt", position);
        }
        Ok(size)
    }

    /// Helper method that reads a [`FlexUInt`] with 7 or fewer bytes of magnitude from the buffer.
    // Caller must confirm that `bytes` has at least 8 bytes and a non-zero first byte.
    #[inline]
    pub(crate) fn read_small_flex_uint(bytes: &[u8]) -> FlexUInt {
        debug_assert!(bytes.len() >= 8);
        let num_encoded_bytes = bytes[0].trailing_zeros() as usize + 1;
        let num_encoded_bits = 8 * num_encoded_bytes;
        // Get a mask with the low 'n' bits set
        let mask = 1u64
            .checked_shl(num_encoded_bits as u32)
            .map(|v| v - 1)
            .unwrap_or(u64::MAX);
        let mut fixed_size_input = [0u8; 8];
        fixed_size_input.copy_from_slice(&bytes[..8]);
        // This step will often read unrelated bytes from beyond the FlexUInt, but they are
        // discarded by the mask.
        let encoded_value = u64::from_le_bytes(fixed_size_input);
        // `num_encoded_bytes` is also the number of continuation flags to discard.
        let value = (encoded_value & mask) >> num_encoded_bytes;
        FlexUInt::new(num_encoded_bytes, value)
    }

    #[inline(never)]
    pub(crate) fn read_flex_primitive_as_uint_no_inline(
        input: &[u8],
        offset: usize,
        label: &'static str,
    ) -> IonResult<FlexUInt> {
        Self::read_flex_primitive_as_uint(input, offset, label)
    }

    /// Reads a flex-encoded primitive from the buffer, returning its bits as a `FlexUInt`. Errors
    /// name the supplied `label`.
    pub(crate) fn read_flex_primitive_as_uint(
        input: &[u8],
        offset: usize,
        label: &'static str,
    ) -> IonResult<FlexUInt> {
        let incomplete = || IonResult::incomplete(label, offset);

        let bytes_available = input.len();
        if bytes_available == 0 {
            return incomplete();
        }

        // `from_le_bytes` needs 8 readable bytes, and a 9-byte encoding needs 9. Short inputs are
        // copied into a zero-padded buffer.
        let mut buffer = [0u8; 16];
        let bytes = if bytes_available >= 16 {
            input
        } else {
            buffer[..bytes_available].copy_from_slice(input);
            &buffer[..]
        };

        let first_byte = bytes[0];
        if first_byte != 0 {
            let num_encoded_bytes = first_byte.trailing_zeros() as usize + 1;
            // `bytes_available` counts only the meaningful bytes of the padded buffer.
            if bytes_available < num_encoded_bytes {
                return incomplete();
            }
            return Ok(Self::read_small_flex_uint(bytes));
        }

        cold_path! {{
            // The first byte is all continuation bits. The lowest bit of the second byte must be
            // the end flag of a 9-byte encoding.
            if bytes_available < 2 {
                return incomplete();
            }
            if bytes[1] & 1 == 0 {
                return Self::too_large();
            }
            if bytes_available < MAX_FLEX_ENCODED_SIZE_IN_BYTES {
                return incomplete();
            }
            let mut magnitude = [0u8; 8];
            magnitude.copy_from_slice(&bytes[1..9]);
            // Lop off the lowest bit to discard the end flag.
            let value = u64::from_le_bytes(magnitude) >> 1;
            Ok(FlexUInt::new(MAX_FLEX_ENCODED_SIZE_IN_BYTES, value))
        }}
    }

    pub(crate) fn too_large<T>() -> IonResult<T> {
        IonResult::decoding_error("found a Flex(U)Int that requires more than 9 bytes to encode")
    }

    /// Returns the number of bytes needed to encode `value` as a FlexUInt.
    #[inline]
    pub fn encoded_size(value: u64) -> usize {
        BYTES_NEEDED_CACHE[value.leading_zeros() as usize] as usize
    }

    /// Writes `value` to `output` as a FlexUInt, returning the number of bytes written.
    ///
    /// Values of `2^63` or more need ten bytes and are rejected.
    #[inline]
    pub fn write(output: &mut Vec<u8>, value: u64) -> IonResult<usize> {
        let num_encoded_bytes = Self::encoded_size(value);
        if num_encoded_bytes < MAX_FLEX_ENCODED_SIZE_IN_BYTES {
            let flag_bits = 1u64 << (num_encoded_bytes - 1);
            // Left shift the value to accommodate the trailing flag bits and then OR them together
            let encoded_value = (value << num_encoded_bytes) | flag_bits;
            output.extend_from_slice(&encoded_value.to_le_bytes()[..num_encoded_bytes]);
            return Ok(num_encoded_bytes);
        }
        cold_path! {{
            if num_encoded_bytes > MAX_FLEX_ENCODED_SIZE_IN_BYTES {
                return IonResult::illegal_operation(format!(
                    "cannot encode {value} as a FlexUInt of 9 or fewer bytes"
                ));
            }
            output.push(0x00);
            output.extend_from_slice(&((value << 1) | 1).to_le_bytes());
            Ok(MAX_FLEX_ENCODED_SIZE_IN_BYTES)
        }}
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn size_in_bytes(&self) -> usize {
        self.size_in_bytes
    }
}
