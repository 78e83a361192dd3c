//! Mensura Units - conversion graph and compound unit identifiers
//!
//! Built on the exact arithmetic of `mensura-core`:
//! - `UnitConverterBuilder` / `UnitConverter`: build-then-freeze conversion
//!   graph with direct and single-pivot conversion
//! - `ConversionRule`: factor/offset/reciprocal edges
//! - `UnitId`: canonical base-unit power-map form of a compound identifier
//! - `data`: the built-in constant, prefix, and rule tables
//!
//! ```
//! use mensura_core::Rational;
//! use mensura_units::converter;
//!
//! let c = converter();
//! assert_eq!(Rational::of(12, 1), c.convert(&Rational::one(), "foot", "inch"));
//!
//! let (base, rule) = c.parse_unit_id("kilometer-per-hour").unwrap();
//! assert_eq!("meter-per-second", base);
//! assert_eq!(Rational::of(5, 18), rule.factor);
//! ```

pub mod data;
mod error;
mod graph;
mod rule;
mod tokenize;
mod unit_id;

pub use data::{build_converter, converter, rational_parser};
pub use error::RegistryError;
pub use graph::{UnitConverter, UnitConverterBuilder};
pub use rule::ConversionRule;
pub use unit_id::UnitId;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{converter, ConversionRule, UnitConverter, UnitConverterBuilder, UnitId};
    pub use mensura_core::Rational;
}
