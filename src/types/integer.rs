use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::ops::Neg;

/// Container for either an integer that can fit in a 64-bit word or an arbitrarily sized
/// [`BigInt`].
///
/// Ion 1.1 integers encoded in eight or fewer bytes always decode to `Int::I64`. The
/// variable-length form (opcode `0xF6`) decodes to `Int::I64` when the magnitude fits and to
/// `Int::BigInt` otherwise.
#[derive(Debug, Clone)]
pub enum Int {
    I64(i64),
    BigInt(BigInt),
}

impl Int {
    /// Returns the value as an `i64` if it can be represented as such.
    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match &self {
            Int::I64(i) => Some(*i),
            Int::BigInt(big) => big.to_i64(),
        }
    }

    /// Returns a reference to the [`BigInt`] if the value is stored as one.
    #[inline]
    pub fn as_big_int(&self) -> Option<&BigInt> {
        match &self {
            Int::I64(_) => None,
            Int::BigInt(big) => Some(big),
        }
    }

    /// Builds an `Int` from little-endian two's complement bytes, preferring the `i64`
    /// representation when the value fits.
    pub(crate) fn from_le_signed_bytes(bytes: &[u8]) -> Int {
        if bytes.len() <= 8 {
            let mut buffer = [0u8; 8];
            buffer[..bytes.len()].copy_from_slice(bytes);
            let shift = 64 - (bytes.len() as u32 * 8);
            let value = i64::from_le_bytes(buffer)
                .checked_shl(shift)
                .map(|v| v >> shift)
                .unwrap_or(0);
            return Int::I64(value);
        }
        let big = BigInt::from_signed_bytes_le(bytes);
        match big.to_i64() {
            Some(value) => Int::I64(value),
            None => Int::BigInt(big),
        }
    }

    /// Compares a [i64] integer with a [BigInt] to see if they are equal. This method never
    /// allocates.
    fn cross_representation_eq(m1: i64, m2: &BigInt) -> bool {
        Int::cross_representation_cmp(m1, m2) == Ordering::Equal
    }

    /// Compares a [i64] integer with a [BigInt]. This method never allocates.
    fn cross_representation_cmp(m1: i64, m2: &BigInt) -> Ordering {
        if let Some(downgraded_m2) = m2.to_i64() {
            return m1.cmp(&downgraded_m2);
        }
        if m2.sign() == num_bigint::Sign::Minus {
            Ordering::Greater
        } else {
            Ordering::Less
        }
    }
}

impl PartialEq for Int {
    fn eq(&self, other: &Self) -> bool {
        use Int::*;
        match (self, other) {
            (I64(m1), I64(m2)) => m1 == m2,
            (BigInt(m1), BigInt(m2)) => m1 == m2,
            (I64(m1), BigInt(m2)) => Int::cross_representation_eq(*m1, m2),
            (BigInt(m1), I64(m2)) => Int::cross_representation_eq(*m2, m1),
        }
    }
}

impl Eq for Int {}

impl PartialOrd for Int {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Int {
    fn cmp(&self, other: &Self) -> Ordering {
        use Int::*;
        match (self, other) {
            (I64(m1), I64(m2)) => m1.cmp(m2),
            (BigInt(m1), BigInt(m2)) => m1.cmp(m2),
            (I64(m1), BigInt(m2)) => Int::cross_representation_cmp(*m1, m2),
            (BigInt(m1), I64(m2)) => Int::cross_representation_cmp(*m2, m1).reverse(),
        }
    }
}

impl Neg for Int {
    type Output = Self;

    fn neg(self) -> Self::Output {
        use Int::*;
        match self {
            I64(value) => match value.checked_neg() {
                Some(negated) => I64(negated),
                None => BigInt(-num_bigint::BigInt::from(value)),
            },
            BigInt(value) => BigInt(-value),
        }
    }
}

impl Zero for Int {
    fn zero() -> Self {
        Int::I64(0)
    }

    fn is_zero(&self) -> bool {
        match self {
            Int::I64(value) => *value == 0i64,
            Int::BigInt(value) => value.is_zero(),
        }
    }
}

impl std::ops::Add for Int {
    type Output = Int;

    fn add(self, rhs: Self) -> Self::Output {
        use Int::{BigInt as Big, I64};
        match (self, rhs) {
            (I64(this), I64(that)) => match this.checked_add(that) {
                Some(result) => I64(result),
                None => Big(BigInt::from(this) + BigInt::from(that)),
            },
            (I64(this), Big(that)) => Big(BigInt::from(this) + that),
            (Big(this), I64(that)) => Big(this + BigInt::from(that)),
            (Big(this), Big(that)) => Big(this + that),
        }
    }
}

impl Display for Int {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match &self {
            Int::I64(i) => write!(f, "{i}"),
            Int::BigInt(i) => write!(f, "{i}"),
        }
    }
}

impl From<i64> for Int {
    fn from(value: i64) -> Self {
        Int::I64(value)
    }
}

impl From<BigInt> for Int {
    fn from(value: BigInt) -> Self {
        match value.to_i64() {
            Some(small) => Int::I64(small),
            None => Int::BigInt(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::empty(&[], 0)]
    #[case::one_byte_positive(&[0x7F], 127)]
    #[case::one_byte_negative(&[0x80], -128)]
    #[case::two_bytes(&[0x00, 0x01], 256)]
    #[case::eight_bytes_min(&[0, 0, 0, 0, 0, 0, 0, 0x80], i64::MIN)]
    #[case::nine_bytes_that_fit(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF], -1)]
    fn read_signed_bytes_as_i64(#[case] bytes: &[u8], #[case] expected: i64) {
        assert_eq!(Int::from_le_signed_bytes(bytes), Int::I64(expected));
    }

    #[test]
    fn read_signed_bytes_as_big_int() {
        // 2^64, which needs nine bytes
        let bytes = [0, 0, 0, 0, 0, 0, 0, 0, 0x01];
        let int = Int::from_le_signed_bytes(&bytes);
        assert_eq!(int.as_i64(), None);
        assert_eq!(int.as_big_int(), Some(&(BigInt::from(u64::MAX) + 1)));
    }

    #[test]
    fn compare_across_representations() {
        let big = Int::BigInt(BigInt::from(i64::MAX) + 1);
        assert!(Int::I64(i64::MAX) < big);
        assert_eq!(Int::I64(i64::MIN), -big.clone());
        assert!(Int::I64(i64::MIN) > -(big + Int::I64(1)));
        assert_eq!(Int::I64(5), Int::BigInt(BigInt::from(5)));
    }
}
