//! Mensura Core - exact numeric foundation
//!
//! This crate provides the two leaf pieces of the conversion engine:
//! - `Rational`: arbitrary-precision fraction with ±infinity/NaN sentinels
//! - `RationalParser`: left-to-right `*`/`/` expression evaluator over a
//!   fixed named-constant table

mod parser;
mod rational;

pub use parser::{ExprError, RationalParser};
pub use rational::Rational;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{ExprError, Rational, RationalParser};
}
