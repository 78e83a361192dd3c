//! Exact rational arithmetic on arbitrary-precision integers
//!
//! Conversion factors span roughly 10^-24 to 10^24, so the numerator and
//! denominator are `BigInt`s and every operation is exact. Comparison is
//! done by cross-multiplication; nothing here ever rounds through a float.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::parser::ExprError;

/// An exact fraction of two big integers.
///
/// Invariants, maintained by every constructor:
/// - stored reduced: gcd(|numerator|, denominator) is 0 or 1
/// - denominator is never negative; the sign lives on the numerator
/// - numerator zero implies denominator 0 or 1
/// - denominator zero encodes the sentinels: `1/0` and `-1/0` are the
///   infinities, `0/0` is NaN
///
/// Immutable value type; operations return new instances. Equality is
/// structural, so `NaN == NaN` (the sentinel is a value, not IEEE NaN).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rational {
    numerator: BigInt,
    denominator: BigInt,
}

impl Rational {
    fn new(mut numerator: BigInt, mut denominator: BigInt) -> Self {
        if denominator.is_negative() {
            numerator = -numerator;
            denominator = -denominator;
        }
        let gcd = numerator.gcd(&denominator);
        if gcd > BigInt::one() {
            numerator /= &gcd;
            denominator /= &gcd;
        }
        Rational { numerator, denominator }
    }

    // ========== Construction ==========

    /// Create from an integer pair. `of(6, 10)` reduces to `3/5`.
    pub fn of(numerator: i64, denominator: i64) -> Self {
        Self::new(BigInt::from(numerator), BigInt::from(denominator))
    }

    pub fn from_bigints(numerator: BigInt, denominator: BigInt) -> Self {
        Self::new(numerator, denominator)
    }

    pub fn zero() -> Self {
        Self::of(0, 1)
    }

    pub fn one() -> Self {
        Self::of(1, 1)
    }

    pub fn negative_one() -> Self {
        Self::of(-1, 1)
    }

    pub fn infinity() -> Self {
        Self::of(1, 0)
    }

    pub fn negative_infinity() -> Self {
        Self::of(-1, 0)
    }

    pub fn nan() -> Self {
        Self::of(0, 0)
    }

    /// Parse a decimal or integer literal, with optional scientific
    /// exponent: `"12"`, `"12.37"`, `"-0.5"`, `"6.02214076E+23"`.
    pub(crate) fn parse_decimal(s: &str) -> Result<Self, ExprError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ExprError::InvalidNumber(s.to_string()));
        }
        let (mantissa, exponent) = match s.find(['e', 'E']) {
            Some(pos) => {
                let exp: i64 = s[pos + 1..]
                    .parse()
                    .map_err(|_| ExprError::InvalidNumber(s.to_string()))?;
                (&s[..pos], exp)
            }
            None => (s, 0i64),
        };
        let (numerator, denominator) = match mantissa.find('.') {
            Some(dot) => {
                let frac = &mantissa[dot + 1..];
                if frac.contains('.') {
                    return Err(ExprError::InvalidNumber(s.to_string()));
                }
                let digits = format!("{}{}", &mantissa[..dot], frac);
                let n: BigInt = digits
                    .parse()
                    .map_err(|_| ExprError::InvalidNumber(s.to_string()))?;
                (n, pow10(frac.len()))
            }
            None => {
                let n: BigInt = mantissa
                    .parse()
                    .map_err(|_| ExprError::InvalidNumber(s.to_string()))?;
                (n, BigInt::one())
            }
        };
        Ok(if exponent >= 0 {
            Self::new(numerator * pow10(exponent as usize), denominator)
        } else {
            Self::new(numerator, denominator * pow10(exponent.unsigned_abs() as usize))
        })
    }

    // ========== Predicates ==========

    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero() && !self.denominator.is_zero()
    }

    pub fn is_nan(&self) -> bool {
        self.numerator.is_zero() && self.denominator.is_zero()
    }

    pub fn is_infinite(&self) -> bool {
        self.denominator.is_zero() && !self.numerator.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.numerator.is_negative()
    }

    // ========== Arithmetic ==========

    pub fn add(&self, other: &Self) -> Self {
        Self::new(
            &self.numerator * &other.denominator + &other.numerator * &self.denominator,
            &self.denominator * &other.denominator,
        )
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.negate())
    }

    pub fn multiply(&self, other: &Self) -> Self {
        Self::new(
            &self.numerator * &other.numerator,
            &self.denominator * &other.denominator,
        )
    }

    /// Division by zero yields the sentinels: `x/0` is ±infinity for
    /// nonzero `x`, and `0/0` is NaN. Never an error.
    pub fn divide(&self, other: &Self) -> Self {
        self.multiply(&other.reciprocal())
    }

    /// `reciprocal(0)` is infinity; `reciprocal(±infinity)` is zero.
    pub fn reciprocal(&self) -> Self {
        Self::new(self.denominator.clone(), self.numerator.clone())
    }

    pub fn negate(&self) -> Self {
        Self::new(-&self.numerator, self.denominator.clone())
    }

    /// Exact integer power by repeated multiplication.
    pub fn pow(&self, exp: i32) -> Self {
        if exp == 0 {
            return Self::one();
        }
        let mut result = Self::one();
        for _ in 0..exp.unsigned_abs() {
            result = result.multiply(self);
        }
        if exp < 0 {
            result.reciprocal()
        } else {
            result
        }
    }

    // ========== Access & display ==========

    pub fn numerator(&self) -> &BigInt {
        &self.numerator
    }

    pub fn denominator(&self) -> &BigInt {
        &self.denominator
    }

    /// Lossy decimal rendering, truncated to at most `max_places`
    /// fractional digits. Display only; never used for equality.
    pub fn to_decimal(&self, max_places: usize) -> String {
        if self.denominator.is_zero() {
            return match self.numerator.sign() {
                num_bigint::Sign::Plus => "INF".to_string(),
                num_bigint::Sign::Minus => "-INF".to_string(),
                num_bigint::Sign::NoSign => "NaN".to_string(),
            };
        }
        let negative = self.numerator.is_negative();
        let n = self.numerator.abs();
        let (int_part, mut rem) = n.div_rem(&self.denominator);
        let mut out = String::new();
        if negative && (!int_part.is_zero() || !rem.is_zero()) {
            out.push('-');
        }
        out.push_str(&int_part.to_string());
        if !rem.is_zero() && max_places > 0 {
            out.push('.');
            for _ in 0..max_places {
                rem = rem * 10;
                let (digit, next) = rem.div_rem(&self.denominator);
                out.push_str(&digit.to_string());
                rem = next;
                if rem.is_zero() {
                    break;
                }
            }
        }
        out
    }
}

fn pow10(exp: usize) -> BigInt {
    num_traits::pow(BigInt::from(10), exp)
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator.is_zero() {
            return match self.numerator.sign() {
                num_bigint::Sign::Plus => write!(f, "INF"),
                num_bigint::Sign::Minus => write!(f, "-INF"),
                num_bigint::Sign::NoSign => write!(f, "NaN"),
            };
        }
        if self.denominator.is_one() {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

impl FromStr for Rational {
    type Err = ExprError;

    /// Accepts integer, decimal, scientific, and `n/d` forms; either side
    /// of the slash may itself be a decimal (`"0.06/0.10"` is `3/5`).
    fn from_str(s: &str) -> Result<Self, ExprError> {
        let s = s.trim();
        if let Some((num, den)) = s.split_once('/') {
            let n = Self::parse_decimal(num)?;
            let d = Self::parse_decimal(den)?;
            return Ok(n.divide(&d));
        }
        Self::parse_decimal(s)
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    /// Exact comparison by cross-multiplication. Denominators are never
    /// negative, so no sign flip is needed.
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.numerator * &other.denominator).cmp(&(&other.numerator * &self.denominator))
    }
}

impl Serialize for Rational {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Rational {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "NaN" => Ok(Self::nan()),
            "INF" => Ok(Self::infinity()),
            "-INF" => Ok(Self::negative_infinity()),
            _ => Self::from_str(&s).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduction() {
        assert_eq!(Rational::of(3, 5), Rational::of(6, 10));
        assert_eq!(Rational::of(-3, 5), Rational::of(3, -5));
        assert_eq!(Rational::of(0, 7), Rational::zero());
    }

    #[test]
    fn test_inverse_identities() {
        let a = Rational::of(3, 5);
        assert_eq!(Rational::of(3, 5), Rational::of(5, 3).reciprocal());
        assert_eq!(Rational::one(), a.multiply(&a.reciprocal()));
        assert_eq!(Rational::zero(), a.add(&a.negate()));
        assert_eq!(Rational::zero(), a.sub(&a));
        assert_eq!(Rational::of(1, 5), a.sub(&Rational::of(2, 5)));
    }

    #[test]
    fn test_sentinels() {
        assert_eq!(Rational::infinity(), Rational::zero().reciprocal());
        assert_eq!(Rational::negative_infinity(), Rational::infinity().negate());
        assert_eq!(Rational::negative_one(), Rational::one().negate());
        assert_eq!(Rational::nan(), Rational::zero().divide(&Rational::zero()));
        assert_eq!(Rational::zero(), Rational::infinity().reciprocal());
        assert!(Rational::of(5, 0).is_infinite());
        assert!(Rational::nan().is_nan());
        assert!(!Rational::nan().is_zero());
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(Rational::of(1237, 100), "12.37".parse().unwrap());
        assert_eq!(Rational::of(-3, 2), "-1.5".parse().unwrap());
        assert_eq!(Rational::of(1237, 10000), "0.1237".parse().unwrap());
        assert_eq!(Rational::of(3, 5), "6/10".parse().unwrap());
        assert_eq!(Rational::of(3, 5), "0.06/0.10".parse().unwrap());
    }

    #[test]
    fn test_parse_scientific() {
        let avogadro: Rational = "6.02214076E+23".parse().unwrap();
        assert_eq!(
            Rational::from_bigints(
                "602214076000000000000000".parse().unwrap(),
                1.into()
            ),
            avogadro
        );
        assert_eq!(Rational::of(15, 100), "1.5e-1".parse().unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Rational>().is_err());
        assert!("12.3.4".parse::<Rational>().is_err());
        assert!("1..2".parse::<Rational>().is_err());
        assert!(".".parse::<Rational>().is_err());
        assert!("meter".parse::<Rational>().is_err());
    }

    #[test]
    fn test_compare() {
        assert!(Rational::of(1, 3) < Rational::of(1, 2));
        assert!(Rational::of(-1, 2) < Rational::of(-1, 3));
        assert!(Rational::of(2, 1) > Rational::one());
    }

    #[test]
    fn test_pow() {
        assert_eq!(Rational::of(8, 27), Rational::of(2, 3).pow(3));
        assert_eq!(Rational::of(27, 8), Rational::of(2, 3).pow(-3));
        assert_eq!(Rational::one(), Rational::of(2, 3).pow(0));
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!("0.5", Rational::of(1, 2).to_decimal(10));
        assert_eq!("0.01", Rational::of(1, 100).to_decimal(10));
        assert_eq!("-2.4", Rational::of(-12, 5).to_decimal(10));
        assert_eq!("0.3333", Rational::of(1, 3).to_decimal(4));
        assert_eq!("100", Rational::of(100, 1).to_decimal(10));
        assert_eq!("NaN", Rational::nan().to_decimal(4));
        assert_eq!("-INF", Rational::negative_infinity().to_decimal(4));
    }

    #[test]
    fn test_display() {
        assert_eq!("3/5", Rational::of(6, 10).to_string());
        assert_eq!("7", Rational::of(7, 1).to_string());
        assert_eq!("NaN", Rational::nan().to_string());
    }
}
