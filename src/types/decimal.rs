use crate::types::Int;
use num_traits::Zero;
use std::fmt::{Display, Formatter};

/// Indicates whether the Decimal value is less than 0 (negative) or not (positive).
/// When the Decimal's magnitude is zero, the Sign can be used to distinguish between -0 and 0.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Sign {
    Negative,
    Positive,
}

/// An arbitrary-precision Decimal type with a distinct representation of negative zero (`-0`).
///
/// The value is `coefficient * 10^exponent`. Because `Int` cannot represent negative zero, a
/// zero coefficient carries its sign separately.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decimal {
    coefficient: Int,
    exponent: i64,
    negative_zero: bool,
}

impl Decimal {
    /// Constructs a new Decimal with the provided components.
    pub fn new(coefficient: impl Into<Int>, exponent: i64) -> Decimal {
        Decimal {
            coefficient: coefficient.into(),
            exponent,
            negative_zero: false,
        }
    }

    /// Constructs a Decimal with a zero coefficient and a negative sign (`-0dN`).
    pub fn negative_zero_with_exponent(exponent: i64) -> Decimal {
        Decimal {
            coefficient: Int::I64(0),
            exponent,
            negative_zero: true,
        }
    }

    pub fn coefficient(&self) -> &Int {
        &self.coefficient
    }

    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    pub fn sign(&self) -> Sign {
        if self.negative_zero || self.coefficient < Int::I64(0) {
            Sign::Negative
        } else {
            Sign::Positive
        }
    }

    pub fn is_zero(&self) -> bool {
        self.coefficient.is_zero()
    }

    pub fn is_negative_zero(&self) -> bool {
        self.negative_zero
    }
}

impl Display for Decimal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.negative_zero {
            write!(f, "-")?;
        }
        write!(f, "{}d{}", self.coefficient, self.exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_zero_is_preserved() {
        let d = Decimal::negative_zero_with_exponent(-2);
        assert!(d.is_zero());
        assert!(d.is_negative_zero());
        assert_eq!(d.sign(), Sign::Negative);
        assert_eq!(d.to_string(), "-0d-2");
        assert_ne!(d, Decimal::new(0, -2));
    }

    #[test]
    fn sign_follows_coefficient() {
        assert_eq!(Decimal::new(-15, 1).sign(), Sign::Negative);
        assert_eq!(Decimal::new(15, 1).sign(), Sign::Positive);
        assert_eq!(Decimal::new(0, 0).sign(), Sign::Positive);
    }
}
