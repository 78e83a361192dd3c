//! Small arithmetic-expression parser for conversion factors
//!
//! The grammar is a sequence of terms joined by `*` and `/`, evaluated
//! strictly left to right with no precedence. A term is a numeric literal
//! (integer, decimal, or scientific) or a named constant resolved against
//! the parser's symbol table. This is how rule factors such as
//! `"ft2m*5280"` or `"231*ft2m*ft2m*ft2m/12/12/12"` are written.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::rational::Rational;

/// Load-time expression errors. These are data-integrity faults: a rule
/// table containing an unresolvable constant or a malformed literal must
/// abort ingestion rather than load partially.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("invalid numeric literal: {0:?}")]
    InvalidNumber(String),

    #[error("unknown constant: {0:?}")]
    UnknownConstant(String),

    #[error("empty expression")]
    Empty,
}

/// Parser over a fixed constant table. Pure and reentrant: `parse` has no
/// hidden state, so one parser can bootstrap the constants of another.
#[derive(Debug, Clone, Default)]
pub struct RationalParser {
    constants: BTreeMap<String, Rational>,
}

impl RationalParser {
    /// A parser with no named constants; literals only.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_constants(constants: BTreeMap<String, Rational>) -> Self {
        RationalParser { constants }
    }

    pub fn constant(&self, name: &str) -> Option<&Rational> {
        self.constants.get(name)
    }

    /// Evaluate `term (('*'|'/') term)*` left to right.
    pub fn parse(&self, expr: &str) -> Result<Rational, ExprError> {
        let mut result = Rational::one();
        let mut op = '*';
        let mut start = 0;
        for (i, c) in expr.char_indices() {
            if c == '*' || c == '/' {
                result = self.apply(result, op, &expr[start..i])?;
                op = c;
                start = i + 1;
            }
        }
        self.apply(result, op, &expr[start..])
    }

    fn apply(&self, acc: Rational, op: char, term: &str) -> Result<Rational, ExprError> {
        let value = self.term(term)?;
        Ok(match op {
            '/' => acc.divide(&value),
            _ => acc.multiply(&value),
        })
    }

    fn term(&self, term: &str) -> Result<Rational, ExprError> {
        let term = term.trim();
        let Some(first) = term.chars().next() else {
            return Err(ExprError::Empty);
        };
        if first.is_ascii_digit() || first == '-' || first == '+' || first == '.' {
            return Rational::parse_decimal(term);
        }
        self.constants
            .get(term)
            .cloned()
            .ok_or_else(|| ExprError::UnknownConstant(term.to_string()))
    }
}
