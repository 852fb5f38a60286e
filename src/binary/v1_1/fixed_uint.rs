use ice_code::ice as cold_path;

use crate::result::IonFailure;
use crate::IonResult;

const MAX_UINT_SIZE_IN_BYTES: usize = std::mem::size_of::<u64>();

/// An Ion 1.1 encoding primitive that represents a fixed-length unsigned integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedUInt {
    value: u64,
    size_in_bytes: usize,
}

impl FixedUInt {
    fn new(size_in_bytes: usize, value: u64) -> Self {
        Self {
            value,
            size_in_bytes,
        }
    }

    /// Reads a [`FixedUInt`] from the beginning of `input`.
    ///
    /// `input` is the byte slice from which to read a [`FixedUInt`].
    /// `size_in_bytes` is the number of bytes to interpret as an unsigned integer.
    /// `offset` is the position of the slice in some larger input stream. It is only used to populate
    ///          an appropriate error message if reading fails.
    #[inline]
    pub fn read(input: &[u8], size_in_bytes: usize, offset: usize) -> IonResult<FixedUInt> {
        if size_in_bytes > MAX_UINT_SIZE_IN_BYTES {
            return cold_path! {{
                IonResult::decoding_error(format!(
                    "found a {size_in_bytes}-byte FixedUInt at offset {offset}; at most 8 bytes are supported"
                ))
            }};
        }
        let bytes = match input.get(..size_in_bytes) {
            Some(bytes) => bytes,
            None => return IonResult::incomplete("a FixedUInt", offset),
        };
        let mut buffer = [0u8; MAX_UINT_SIZE_IN_BYTES];
        buffer[..size_in_bytes].copy_from_slice(bytes);
        Ok(FixedUInt::new(size_in_bytes, u64::from_le_bytes(buffer)))
    }

    /// Reads a [`FixedUInt`] that begins at `position` in `source`.
    #[inline]
    pub fn read_at(source: &[u8], position: usize, size_in_bytes: usize) -> IonResult<FixedUInt> {
        match source.get(position..) {
            Some(input) => Self::read(input, size_in_bytes, position),
            None => IonResult::incomplete("a FixedUInt", position),
        }
    }

    /// Returns the number of bytes needed to encode `value` as a FixedUInt.
    #[inline]
    pub fn encoded_size(value: u64) -> usize {
        (MAX_UINT_SIZE_IN_BYTES - (value.leading_zeros() as usize / 8)).max(1)
    }

    /// Writes `value` to `output` using as few bytes as possible, returning the number of bytes
    /// written.
    #[inline]
    pub fn write(output: &mut Vec<u8>, value: u64) -> IonResult<usize> {
        let num_encoded_bytes = Self::encoded_size(value);
        output.extend_from_slice(&value.to_le_bytes()[..num_encoded_bytes]);
        Ok(num_encoded_bytes)
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn size_in_bytes(&self) -> usize {
        self.size_in_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IonError;

    const FIXED_UINT_TEST_CASES: &[(u64, &[u8])] = &[
        (0, &[0b00000000]),
        (1, &[0b00000001]),
        (2, &[0b00000010]),
        (14, &[0b00001110]),
        (127, &[0b01111111]),
        (128, &[0b10000000]),
        (255, &[0b11111111]),
        (256, &[0b00000000, 0b00000001]),
        (65535, &[0b11111111, 0b11111111]),
        (65536, &[0b00000000, 0b00000000, 0b00000001]),
        (
            u64::MAX,
            &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
        ),
    ];

    #[test]
    fn decode_fixed_uint() -> IonResult<()> {
        for (expected_value, encoding) in FIXED_UINT_TEST_CASES {
            let fixed_uint = FixedUInt::read(encoding, encoding.len(), 0)?;
            assert_eq!(fixed_uint.value(), *expected_value, "for encoding {encoding:x?}");
            assert_eq!(fixed_uint.size_in_bytes(), encoding.len());
        }
        Ok(())
    }

    #[test]
    fn encode_fixed_uint() -> IonResult<()> {
        for (value, expected_encoding) in FIXED_UINT_TEST_CASES {
            let mut buffer = Vec::new();
            let size = FixedUInt::write(&mut buffer, *value)?;
            assert_eq!(buffer.as_slice(), *expected_encoding, "for value {value}");
            assert_eq!(size, expected_encoding.len());
        }
        Ok(())
    }

    #[test]
    fn read_at_offset() -> IonResult<()> {
        let source = [0xAA, 0x01, 0x02, 0xBB];
        assert_eq!(FixedUInt::read_at(&source, 1, 2)?.value(), 0x0201);
        Ok(())
    }

    #[test]
    fn reject_wide_fixed_uint() {
        let encoding = [0u8; 9];
        assert!(matches!(
            FixedUInt::read(&encoding, 9, 0),
            Err(IonError::Decoding(_))
        ));
    }

    #[test]
    fn detect_incomplete_fixed_uint() {
        assert!(matches!(
            FixedUInt::read(&[0x01], 2, 0),
            Err(IonError::Incomplete(_))
        ));
        assert!(matches!(
            FixedUInt::read_at(&[0x01], 5, 1),
            Err(IonError::Incomplete(_))
        ));
    }
}
