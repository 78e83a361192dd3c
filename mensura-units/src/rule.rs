//! Affine conversion rules between unit pairs

use std::fmt;

use mensura_core::Rational;
use serde::{Deserialize, Serialize};

/// A single conversion edge: `target = (reciprocal ? 1/source : source) *
/// factor + offset`. The offset is used by temperature scales; the
/// reciprocal flag by inverse quantities such as fuel consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRule {
    pub factor: Rational,
    pub offset: Rational,
    pub reciprocal: bool,
}

impl ConversionRule {
    pub fn new(factor: Rational, offset: Rational, reciprocal: bool) -> Self {
        ConversionRule { factor, offset, reciprocal }
    }

    /// Proportional rule: offset zero, no reciprocal.
    pub fn of_factor(factor: Rational) -> Self {
        Self::new(factor, Rational::zero(), false)
    }

    pub fn apply(&self, value: &Rational) -> Rational {
        let v = if self.reciprocal {
            value.reciprocal()
        } else {
            value.clone()
        };
        v.multiply(&self.factor).add(&self.offset)
    }

    /// The rule mapping target back to source: `factor' = 1/factor`,
    /// `offset' = -offset/factor` (zero stays zero).
    ///
    /// The reciprocal flag is carried through unchanged, which is only
    /// exact when reciprocal and a nonzero offset do not combine; no known
    /// data pairs them.
    pub fn invert(&self) -> Self {
        let factor = self.factor.reciprocal();
        let offset = if self.offset.is_zero() {
            Rational::zero()
        } else {
            self.offset.divide(&self.factor).negate()
        };
        ConversionRule { factor, offset, reciprocal: self.reciprocal }
    }
}

impl fmt::Display for ConversionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = if self.reciprocal { "1/x" } else { "x" };
        write!(f, "{} * {}", x, self.factor)?;
        if !self.offset.is_zero() {
            write!(f, " + {}", self.offset)?;
        }
        Ok(())
    }
}
