//! Conversion of IEEE 754 half-precision floats (opcode `0x6B`) to `f32`.

const SIGN_MASK: u16 = 0x8000;
const EXPONENT_MASK: u16 = 0x7C00;
const MANTISSA_MASK: u16 = 0x03FF;

/// Converts the bits of a half-precision float to the `f32` with the same value. Every half value
/// (including subnormals, infinities and NaN) is exactly representable as an `f32`.
pub(crate) fn f16_bits_to_f32(bits: u16) -> f32 {
    let sign: u32 = ((bits & SIGN_MASK) as u32) << 16;
    let exponent = (bits & EXPONENT_MASK) >> 10;
    let mantissa = (bits & MANTISSA_MASK) as u32;
    match exponent {
        0 => {
            // Zero or subnormal: mantissa * 2^-24
            let magnitude = mantissa as f32 * f32::from_bits(0x3380_0000);
            if sign != 0 {
                -magnitude
            } else {
                magnitude
            }
        }
        0x1F => f32::from_bits(sign | 0x7F80_0000 | (mantissa << 13)),
        _ => {
            // Rebias the exponent from 15 to 127 and widen the mantissa from 10 to 23 bits.
            let exponent = (exponent as u32) + (127 - 15);
            f32::from_bits(sign | (exponent << 23) | (mantissa << 13))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::zero(0x0000, 0.0)]
    #[case::one(0x3C00, 1.0)]
    #[case::negative_two(0xC000, -2.0)]
    #[case::one_half(0x3800, 0.5)]
    #[case::largest_normal(0x7BFF, 65504.0)]
    #[case::smallest_normal(0x0400, 6.103_515_6e-5)]
    #[case::smallest_subnormal(0x0001, 5.960_464_5e-8)]
    #[case::infinity(0x7C00, f32::INFINITY)]
    #[case::negative_infinity(0xFC00, f32::NEG_INFINITY)]
    fn convert_half_floats(#[case] bits: u16, #[case] expected: f32) {
        assert_eq!(f16_bits_to_f32(bits), expected);
    }

    #[test]
    fn negative_zero_keeps_its_sign() {
        let value = f16_bits_to_f32(0x8000);
        assert_eq!(value, 0.0);
        assert!(value.is_sign_negative());
    }

    #[test]
    fn nan_stays_nan() {
        assert!(f16_bits_to_f32(0x7E00).is_nan());
    }
}
