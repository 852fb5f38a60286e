//! Decoding of the short (`0x80`-`0x8C`) and long (`0xF8`) timestamp encodings.
//!
//! Both encodings pack their fields into a little-endian bit string. Fields are extracted by
//! loading the body into a zero-padded integer and masking.

use num_bigint::BigInt;

use crate::binary::v1_1::fixed_uint::FixedUInt;
use crate::binary::v1_1::flex_uint::FlexUInt;
use crate::result::IonFailure;
use crate::types::{Decimal, Int, Timestamp};
use crate::IonResult;

const SHORT_YEAR_BIAS: u16 = 1970;
const SHORT_OFFSET_UNKNOWN: u32 = 0x7F;
const SHORT_OFFSET_BIAS: i32 = 56;
const SHORT_OFFSET_MULTIPLIER: i32 = 15;

const LONG_OFFSET_UNKNOWN: u64 = 0xFFF;
const LONG_OFFSET_BIAS: i32 = 1440;

const MAX_MILLISECONDS: u128 = 999;
const MAX_MICROSECONDS: u128 = 999_999;
const MAX_NANOSECONDS: u128 = 999_999_999;

/// Extracts `width` bits starting at bit `start`.
#[inline]
fn bits(data: u128, start: u32, width: u32) -> u128 {
    (data >> start) & ((1u128 << width) - 1)
}

/// Loads up to 16 bytes as a little-endian integer.
#[inline]
fn load_le(bytes: &[u8]) -> u128 {
    let mut buffer = [0u8; 16];
    let length = bytes.len().min(buffer.len());
    buffer[..length].copy_from_slice(&bytes[..length]);
    u128::from_le_bytes(buffer)
}

/// Reads the body of a short-form timestamp. `body` must hold exactly the bytes that follow
/// `opcode`; `offset` is the position of the body in the stream.
pub(crate) fn read_short_timestamp(opcode: u8, body: &[u8], offset: usize) -> IonResult<Timestamp> {
    let data = load_le(body);
    let year = bits(data, 0, 7) as u16 + SHORT_YEAR_BIAS;
    let month = bits(data, 7, 4) as u8;
    let day = bits(data, 11, 5) as u8;
    let hour = bits(data, 16, 5) as u8;
    let minute = bits(data, 21, 6) as u8;

    let timestamp = Timestamp::with_year(year);
    let timestamp = match opcode {
        0x80 => timestamp,
        0x81 => timestamp.with_month(month),
        0x82 => timestamp.with_month(month).with_day(day),
        0x83..=0x87 => {
            // UTC flag: set means the offset is known to be UTC, clear means unknown.
            let offset_minutes = if bits(data, 27, 1) == 1 { Some(0) } else { None };
            let timestamp = timestamp
                .with_month(month)
                .with_day(day)
                .with_hour_and_minute(hour, minute)
                .with_offset(offset_minutes);
            if opcode == 0x83 {
                timestamp
            } else {
                let second = bits(data, 28, 6) as u8;
                let timestamp = timestamp.with_second(second);
                match opcode {
                    0x84 => timestamp,
                    _ => timestamp.with_fractional_seconds(short_fraction(opcode - 0x84, data, 34, offset)?),
                }
            }
        }
        0x88..=0x8C => {
            let offset_bits = bits(data, 27, 7) as u32;
            let offset_minutes = if offset_bits == SHORT_OFFSET_UNKNOWN {
                None
            } else {
                Some((offset_bits as i32 - SHORT_OFFSET_BIAS) * SHORT_OFFSET_MULTIPLIER)
            };
            let timestamp = timestamp
                .with_month(month)
                .with_day(day)
                .with_hour_and_minute(hour, minute)
                .with_offset(offset_minutes);
            if opcode == 0x88 {
                timestamp
            } else {
                let second = bits(data, 34, 6) as u8;
                let timestamp = timestamp.with_second(second);
                match opcode {
                    0x89 => timestamp,
                    _ => timestamp.with_fractional_seconds(short_fraction(opcode - 0x89, data, 40, offset)?),
                }
            }
        }
        _ => {
            return IonResult::illegal_operation(format!(
                "opcode 0x{opcode:02X} is not a short-form timestamp"
            ))
        }
    };
    Ok(timestamp)
}

/// Reads the fractional seconds of a short timestamp. `precision` is 1 for milliseconds, 2 for
/// microseconds and 3 for nanoseconds.
fn short_fraction(precision: u8, data: u128, start: u32, offset: usize) -> IonResult<Decimal> {
    let (width, max, exponent) = match precision {
        1 => (10, MAX_MILLISECONDS, -3),
        2 => (20, MAX_MICROSECONDS, -6),
        _ => (30, MAX_NANOSECONDS, -9),
    };
    let coefficient = bits(data, start, width);
    if coefficient > max {
        return IonResult::decoding_error(format!(
            "found a timestamp at offset {offset} whose fractional seconds are not less than 1"
        ));
    }
    Ok(Decimal::new(coefficient as i64, exponent))
}

/// Reads the body of a long-form (`0xF8`) timestamp. `body` holds the bytes after the FlexUInt
/// length; `offset` is the position of the body in the stream.
pub(crate) fn read_long_timestamp(body: &[u8], offset: usize) -> IonResult<Timestamp> {
    let length = body.len();
    if matches!(length, 0 | 1 | 4 | 5) {
        return IonResult::decoding_error(format!(
            "found a long-form timestamp with invalid length {length} at offset {offset}"
        ));
    }
    let data = load_le(&body[..length.min(7)]);
    let year = bits(data, 0, 14) as u16;
    let timestamp = Timestamp::with_year(year);
    if length == 2 {
        return Ok(timestamp);
    }

    let month = bits(data, 14, 4) as u8;
    let day = bits(data, 18, 5) as u8;
    let timestamp = timestamp.with_month(month);
    if length == 3 {
        return Ok(if day == 0 {
            timestamp
        } else {
            timestamp.with_day(day)
        });
    }

    let hour = bits(data, 23, 5) as u8;
    let minute = bits(data, 28, 6) as u8;
    let offset_bits = bits(data, 34, 12) as u64;
    let offset_minutes = if offset_bits == LONG_OFFSET_UNKNOWN {
        None
    } else {
        Some(offset_bits as i32 - LONG_OFFSET_BIAS)
    };
    let timestamp = timestamp
        .with_day(day)
        .with_hour_and_minute(hour, minute)
        .with_offset(offset_minutes);
    if length == 6 {
        return Ok(timestamp);
    }

    let second = bits(data, 46, 6) as u8;
    let timestamp = timestamp.with_second(second);
    if length == 7 {
        return Ok(timestamp);
    }

    let scale = FlexUInt::read(&body[7..], offset + 7)?;
    let coefficient_start = 7 + scale.size_in_bytes();
    if coefficient_start > length {
        return IonResult::decoding_error(format!(
            "found a long-form timestamp at offset {offset} whose fraction overruns its length"
        ));
    }
    let coefficient = FixedUInt::read(
        &body[coefficient_start..],
        length - coefficient_start,
        offset + coefficient_start,
    )?
    .value();
    let limit = u32::try_from(scale.value())
        .ok()
        .and_then(|scale| 10u64.checked_pow(scale));
    // A scale too large for a u64 power of ten admits every coefficient.
    if matches!(limit, Some(limit) if coefficient >= limit) {
        return IonResult::decoding_error(format!(
            "found a timestamp at offset {offset} whose fractional seconds are not less than 1"
        ));
    }
    let exponent = match i64::try_from(scale.value()) {
        Ok(scale) => -scale,
        Err(_) => {
            return IonResult::decoding_error(format!(
                "found a timestamp at offset {offset} with an out-of-range fraction scale"
            ))
        }
    };
    let coefficient = match i64::try_from(coefficient) {
        Ok(coefficient) => Int::I64(coefficient),
        Err(_) => Int::BigInt(BigInt::from(coefficient)),
    };
    Ok(timestamp.with_fractional_seconds(Decimal::new(coefficient, exponent)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Precision;
    use crate::IonError;
    use rstest::rstest;

    /// Packs `(value, width)` fields into little-endian bytes, least significant field first.
    fn pack(fields: &[(u128, u32)], length: usize) -> Vec<u8> {
        let mut data = 0u128;
        let mut shift = 0;
        for (value, width) in fields {
            data |= value << shift;
            shift += width;
        }
        data.to_le_bytes()[..length].to_vec()
    }

    #[test]
    fn short_year() -> IonResult<()> {
        let timestamp = read_short_timestamp(0x80, &[0x35], 0)?;
        assert_eq!(timestamp.precision(), Precision::Year);
        assert_eq!(timestamp.year(), 2023);
        Ok(())
    }

    #[test]
    fn short_day() -> IonResult<()> {
        let body = pack(&[(53, 7), (10, 4), (31, 5)], 2);
        let timestamp = read_short_timestamp(0x82, &body, 0)?;
        assert_eq!(timestamp.precision(), Precision::Day);
        assert_eq!((timestamp.year(), timestamp.month(), timestamp.day()), (2023, 10, 31));
        Ok(())
    }

    #[rstest]
    #[case::utc(1, Some(0))]
    #[case::unknown_offset(0, None)]
    fn short_minute_utc_flag(#[case] flag: u128, #[case] expected: Option<i32>) -> IonResult<()> {
        let body = pack(&[(53, 7), (10, 4), (31, 5), (13, 5), (45, 6), (flag, 1)], 4);
        let timestamp = read_short_timestamp(0x83, &body, 0)?;
        assert_eq!(timestamp.precision(), Precision::HourAndMinute);
        assert_eq!((timestamp.hour(), timestamp.minute()), (13, 45));
        assert_eq!(timestamp.offset(), expected);
        Ok(())
    }

    #[rstest]
    #[case::milliseconds(0x85, 6, 10, 123, -3)]
    #[case::microseconds(0x86, 7, 20, 123_456, -6)]
    #[case::nanoseconds(0x87, 8, 30, 123_456_789, -9)]
    fn short_fractions_utc(
        #[case] opcode: u8,
        #[case] length: usize,
        #[case] width: u32,
        #[case] fraction: u128,
        #[case] exponent: i64,
    ) -> IonResult<()> {
        let body = pack(
            &[(53, 7), (1, 4), (2, 5), (3, 5), (4, 6), (1, 1), (5, 6), (fraction, width)],
            length,
        );
        let timestamp = read_short_timestamp(opcode, &body, 0)?;
        assert_eq!(timestamp.second(), 5);
        assert_eq!(timestamp.offset(), Some(0));
        assert_eq!(
            timestamp.fractional_seconds(),
            Some(&Decimal::new(fraction as i64, exponent))
        );
        Ok(())
    }

    #[rstest]
    #[case::minus_five_hours(36, Some(-300))]
    #[case::plus_quarter_hour(57, Some(15))]
    #[case::unknown(127, None)]
    fn short_offsets(#[case] offset_bits: u128, #[case] expected: Option<i32>) -> IonResult<()> {
        let body = pack(
            &[(53, 7), (1, 4), (2, 5), (3, 5), (4, 6), (offset_bits, 7), (59, 6)],
            5,
        );
        let timestamp = read_short_timestamp(0x89, &body, 0)?;
        assert_eq!(timestamp.offset(), expected);
        assert_eq!(timestamp.second(), 59);
        Ok(())
    }

    #[test]
    fn short_nanoseconds_with_offset() -> IonResult<()> {
        let body = pack(
            &[(53, 7), (1, 4), (2, 5), (3, 5), (4, 6), (56, 7), (5, 6), (999_999_999, 30)],
            9,
        );
        let timestamp = read_short_timestamp(0x8C, &body, 0)?;
        assert_eq!(
            timestamp.fractional_seconds(),
            Some(&Decimal::new(999_999_999, -9))
        );
        Ok(())
    }

    #[test]
    fn short_fraction_out_of_range() {
        let body = pack(
            &[(53, 7), (1, 4), (2, 5), (3, 5), (4, 6), (1, 1), (5, 6), (1000, 10)],
            6,
        );
        assert!(matches!(
            read_short_timestamp(0x85, &body, 0),
            Err(IonError::Decoding(_))
        ));
    }

    #[test]
    fn long_year_and_month() -> IonResult<()> {
        let body = pack(&[(2024, 14)], 2);
        assert_eq!(read_long_timestamp(&body, 0)?.year(), 2024);

        let body = pack(&[(2024, 14), (7, 4), (0, 5)], 3);
        let timestamp = read_long_timestamp(&body, 0)?;
        assert_eq!(timestamp.precision(), Precision::Month);
        assert_eq!(timestamp.month(), 7);

        let body = pack(&[(2024, 14), (7, 4), (4, 5)], 3);
        assert_eq!(read_long_timestamp(&body, 0)?.precision(), Precision::Day);
        Ok(())
    }

    #[rstest]
    #[case::utc(1440, Some(0))]
    #[case::negative(1440 - 330, Some(-330))]
    #[case::unknown(4095, None)]
    fn long_minute_offsets(#[case] offset_bits: u128, #[case] expected: Option<i32>) -> IonResult<()> {
        let body = pack(
            &[(2024, 14), (7, 4), (4, 5), (23, 5), (59, 6), (offset_bits, 12)],
            6,
        );
        let timestamp = read_long_timestamp(&body, 0)?;
        assert_eq!(timestamp.precision(), Precision::HourAndMinute);
        assert_eq!((timestamp.hour(), timestamp.minute()), (23, 59));
        assert_eq!(timestamp.offset(), expected);
        Ok(())
    }

    #[test]
    fn long_fractional_seconds() -> IonResult<()> {
        let mut body = pack(
            &[(2024, 14), (7, 4), (4, 5), (23, 5), (59, 6), (1440, 12), (30, 6)],
            7,
        );
        // scale 2, coefficient 25
        body.extend_from_slice(&[0x05, 25]);
        let timestamp = read_long_timestamp(&body, 0)?;
        assert_eq!(timestamp.second(), 30);
        assert_eq!(timestamp.fractional_seconds(), Some(&Decimal::new(25, -2)));

        // scale 19, a coefficient past i64::MAX
        let mut wide = body[..7].to_vec();
        wide.push(0x27);
        wide.extend_from_slice(&9_999_999_999_999_999_999u64.to_le_bytes());
        let timestamp = read_long_timestamp(&wide, 0)?;
        let expected = Decimal::new(BigInt::from(9_999_999_999_999_999_999u64), -19);
        assert_eq!(timestamp.fractional_seconds(), Some(&expected));

        let mut too_large = body[..7].to_vec();
        too_large.extend_from_slice(&[0x05, 100]);
        assert!(matches!(
            read_long_timestamp(&too_large, 0),
            Err(IonError::Decoding(_))
        ));
        Ok(())
    }

    #[rstest]
    #[case::empty(0)]
    #[case::one_byte(1)]
    #[case::four_bytes(4)]
    #[case::five_bytes(5)]
    fn long_invalid_lengths(#[case] length: usize) {
        let body = vec![0u8; length];
        assert!(matches!(
            read_long_timestamp(&body, 0),
            Err(IonError::Decoding(_))
        ));
    }
}
