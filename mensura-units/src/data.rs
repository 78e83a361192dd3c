//! Built-in conversion data: constants, prefixes, denormalizations, and
//! the rule table
//!
//! Every rule points directly at the base unit of its quantity class, so a
//! single pivot through the base always suffices and the one-hop closure
//! partitions the registered units into clean equivalence classes.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use mensura_core::{Rational, RationalParser};

use crate::error::RegistryError;
use crate::graph::{UnitConverter, UnitConverterBuilder};

/// Fixed physical base units. Compound rule targets (e.g. `cubic-meter`)
/// join the base-unit set during registration.
pub const BASE_UNITS: &[&str] = &[
    "second", "meter", "kilogram", "ampere", "celsius", "mole", "candela",
    "one", "bit", "degree", "year", "pixel", "em",
];

/// Metric prefixes as exact powers of ten.
const PREFIXES: &[(&str, i32)] = &[
    ("yotta", 24),
    ("zetta", 21),
    ("exa", 18),
    ("peta", 15),
    ("tera", 12),
    ("giga", 9),
    ("mega", 6),
    ("kilo", 3),
    ("hecto", 2),
    ("deka", 1),
    ("deci", -1),
    ("centi", -2),
    ("milli", -3),
    ("micro", -6),
    ("nano", -9),
    ("pico", -12),
    ("femto", -15),
    ("atto", -18),
    ("zepto", -21),
    ("yocto", -24),
];

/// Historically irregular spellings rewritten before tokenization.
const DENORMALIZATIONS: &[(&str, &str)] = &[
    ("meter-per-second-squared", "meter-per-square-second"),
    ("liter-per-100kilometers", "liter-per-100-kilometer"),
];

/// The conversion rule table: (source, target, factor, offset, reciprocal).
/// Factors are expressions over the named constants below.
const RULES: &[(&str, &str, Option<&str>, Option<&str>, Option<&str>)] = &[
    // length -> meter
    ("foot", "meter", Some("ft2m"), None, None),
    ("inch", "meter", Some("ft2m/12"), None, None),
    ("yard", "meter", Some("ft2m*3"), None, None),
    ("mile", "meter", Some("ft2m*5280"), None, None),
    ("fathom", "meter", Some("ft2m*6"), None, None),
    ("furlong", "meter", Some("ft2m*660"), None, None),
    ("point", "meter", Some("ft2m/864"), None, None),
    ("nautical-mile", "meter", Some("1852"), None, None),
    ("mile-scandinavian", "meter", Some("10000"), None, None),
    ("astronomical-unit", "meter", Some("149597870700"), None, None),
    ("light-year", "meter", Some("9460730472580800"), None, None),
    ("parsec", "meter", Some("149597870700*648000/PI"), None, None),
    // mass -> kilogram
    ("gram", "kilogram", Some("0.001"), None, None),
    ("metric-ton", "kilogram", Some("1000"), None, None),
    ("pound", "kilogram", Some("lb2kg"), None, None),
    ("ounce", "kilogram", Some("lb2kg/16"), None, None),
    ("ounce-troy", "kilogram", Some("0.0311034768"), None, None),
    ("stone", "kilogram", Some("lb2kg*14"), None, None),
    ("ton", "kilogram", Some("lb2kg*2000"), None, None),
    ("carat", "kilogram", Some("0.0002"), None, None),
    // time -> second
    ("minute", "second", Some("60"), None, None),
    ("hour", "second", Some("3600"), None, None),
    ("day", "second", Some("86400"), None, None),
    ("week", "second", Some("604800"), None, None),
    // calendar durations -> year (kept apart from the second class)
    ("month", "year", Some("1/12"), None, None),
    ("decade", "year", Some("10"), None, None),
    ("century", "year", Some("100"), None, None),
    // temperature -> celsius
    ("kelvin", "celsius", None, Some("-273.15"), None),
    ("fahrenheit", "celsius", Some("5/9"), Some("-160/9"), None),
    // angle -> degree
    ("radian", "degree", Some("180/PI"), None, None),
    ("revolution", "degree", Some("360"), None, None),
    ("arc-minute", "degree", Some("1/60"), None, None),
    ("arc-second", "degree", Some("1/3600"), None, None),
    // area -> square-meter
    ("hectare", "square-meter", Some("10000"), None, None),
    ("acre", "square-meter", Some("ft2m*ft2m*43560"), None, None),
    // volume -> cubic-meter
    ("liter", "cubic-meter", Some("0.001"), None, None),
    ("gallon", "cubic-meter", Some("231*ft2m*ft2m*ft2m/12/12/12"), None, None),
    ("gallon-imperial", "cubic-meter", Some("0.00454609"), None, None),
    ("quart", "cubic-meter", Some("231*ft2m*ft2m*ft2m/12/12/12/4"), None, None),
    ("pint", "cubic-meter", Some("231*ft2m*ft2m*ft2m/12/12/12/8"), None, None),
    ("cup", "cubic-meter", Some("cup2m3"), None, None),
    ("fluid-ounce", "cubic-meter", Some("cup2m3/8"), None, None),
    ("tablespoon", "cubic-meter", Some("cup2m3/16"), None, None),
    ("teaspoon", "cubic-meter", Some("cup2m3/48"), None, None),
    ("cup-metric", "cubic-meter", Some("0.00025"), None, None),
    ("pint-metric", "cubic-meter", Some("0.0005"), None, None),
    ("bushel", "cubic-meter", Some("0.03523907016688"), None, None),
    ("acre-foot", "cubic-meter", Some("43560*ft2m*ft2m*ft2m"), None, None),
    // speed -> meter-per-second
    ("knot", "meter-per-second", Some("1852/3600"), None, None),
    // acceleration -> meter-per-square-second
    ("g-force", "meter-per-square-second", Some("gravity"), None, None),
    // force -> kilogram-meter-per-square-second
    ("newton", "kilogram-meter-per-square-second", Some("1"), None, None),
    (
        "pound-force",
        "kilogram-meter-per-square-second",
        Some("lb2kg*gravity"),
        None,
        None,
    ),
    // pressure -> kilogram-per-meter-square-second
    ("pascal", "kilogram-per-meter-square-second", Some("1"), None, None),
    ("bar", "kilogram-per-meter-square-second", Some("100000"), None, None),
    (
        "atmosphere",
        "kilogram-per-meter-square-second",
        Some("101325"),
        None,
        None,
    ),
    (
        "millimeter-ofhg",
        "kilogram-per-meter-square-second",
        Some("133.322387415"),
        None,
        None,
    ),
    (
        "inch-ofhg",
        "kilogram-per-meter-square-second",
        Some("3386.389"),
        None,
        None,
    ),
    // energy -> kilogram-square-meter-per-square-second
    ("joule", "kilogram-square-meter-per-square-second", Some("1"), None, None),
    (
        "calorie",
        "kilogram-square-meter-per-square-second",
        Some("4.184"),
        None,
        None,
    ),
    (
        "foodcalorie",
        "kilogram-square-meter-per-square-second",
        Some("4184"),
        None,
        None,
    ),
    (
        "electronvolt",
        "kilogram-square-meter-per-square-second",
        Some("1.602177E-19"),
        None,
        None,
    ),
    (
        "british-thermal-unit",
        "kilogram-square-meter-per-square-second",
        Some("1055.05585262"),
        None,
        None,
    ),
    // power -> kilogram-square-meter-per-cubic-second
    ("watt", "kilogram-square-meter-per-cubic-second", Some("1"), None, None),
    (
        "horsepower",
        "kilogram-square-meter-per-cubic-second",
        Some("550*ft2m*lb2kg*gravity"),
        None,
        None,
    ),
    // electric -> ampere compounds
    (
        "volt",
        "kilogram-square-meter-per-cubic-second-ampere",
        Some("1"),
        None,
        None,
    ),
    (
        "ohm",
        "kilogram-square-meter-per-cubic-second-square-ampere",
        Some("1"),
        None,
        None,
    ),
    // luminance -> candela-per-square-meter
    ("lux", "candela-per-square-meter", Some("1"), None, None),
    // portion -> one
    ("percent", "one", Some("0.01"), None, None),
    ("permille", "one", Some("0.001"), None, None),
    ("karat", "one", Some("1/24"), None, None),
    // digital -> bit
    ("byte", "bit", Some("8"), None, None),
    // graphics -> pixel
    ("dot", "pixel", Some("1"), None, None),
];

/// The shared constant table: `ft2m`, `lb2kg`, `gravity`, `PI`, and the
/// bootstrapped `cup2m3`. The cup expression is all-division because the
/// grammar is strictly left to right.
pub fn rational_parser() -> RationalParser {
    let mut bootstrap = BTreeMap::new();
    bootstrap.insert("ft2m".to_string(), constant("0.3048"));
    let bootstrap = RationalParser::with_constants(bootstrap);

    let mut constants = BTreeMap::new();
    constants.insert("ft2m".to_string(), constant("0.3048"));
    constants.insert("lb2kg".to_string(), constant("0.45359237"));
    constants.insert("gravity".to_string(), constant("9.80665"));
    constants.insert(
        "PI".to_string(),
        constant("3.1415926535897932384626433832795"),
    );
    constants.insert(
        "cup2m3".to_string(),
        bootstrap
            .parse("231*ft2m*ft2m*ft2m/16/12/12/12")
            .expect("cup2m3 bootstrap expression is well-formed"),
    );
    RationalParser::with_constants(constants)
}

fn constant(literal: &str) -> Rational {
    literal.parse().expect("built-in constant is well-formed")
}

/// A fresh builder loaded with the full built-in rule table.
pub fn build_converter() -> Result<UnitConverterBuilder, RegistryError> {
    let mut builder = UnitConverterBuilder::new(rational_parser()).with_base_units(BASE_UNITS.iter().copied());
    for &(prefix, power) in PREFIXES {
        builder = builder.with_prefix(prefix, power);
    }
    for &(from, to) in DENORMALIZATIONS {
        builder = builder.with_denormalization(from, to);
    }
    for &(source, target, factor, offset, reciprocal) in RULES {
        builder.add_raw(source, target, factor, offset, reciprocal)?;
    }
    Ok(builder)
}

static CONVERTER: LazyLock<UnitConverter> = LazyLock::new(|| {
    build_converter()
        .expect("built-in conversion data is consistent")
        .freeze()
});

/// The process-wide frozen converter over the built-in data set.
pub fn converter() -> &'static UnitConverter {
    &CONVERTER
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_constant_table() {
        let parser = rational_parser();
        assert_eq!(Rational::of(381, 1250), parser.parse("ft2m").unwrap());
        let cup = parser.parse("cup2m3").unwrap();
        // 231 * ft2m^3 / (16 * 12^3) = 2.365882365e-4 exactly
        assert_eq!("0.0002365882365", cup.to_decimal(16));
    }

    #[test]
    fn test_customary_conversions() {
        let c = converter();
        let checks = [("foot", 12, "inch"), ("gallon", 4, "quart"), ("gallon", 16, "cup")];
        for (source, expected, target) in checks {
            assert_eq!(
                Rational::of(expected, 1),
                c.convert(&Rational::one(), source, target),
                "{source} to {target}"
            );
        }
    }

    #[test]
    fn test_temperature_conversions() {
        let c = converter();
        assert_eq!(
            Rational::of(5463, 20),
            c.convert(&Rational::zero(), "celsius", "kelvin")
        );
        assert_eq!(
            Rational::zero(),
            c.convert(&Rational::of(32, 1), "fahrenheit", "celsius")
        );
        // fahrenheit -> kelvin pivots through celsius
        assert_eq!(
            Rational::of(5463, 20),
            c.convert(&Rational::of(32, 1), "fahrenheit", "kelvin")
        );
    }

    #[test]
    fn test_parse_unit_id_literals() {
        let c = converter();
        let cases = [
            ("kilometer-per-hour", "meter-per-second", Rational::of(5, 18)),
            (
                "kilometer-pound-per-hour",
                "meter-kilogram-per-second",
                Rational::of(45359237, 360000000),
            ),
        ];
        for (source, expected_base, expected_factor) in cases {
            let (base, rule) = c.parse_unit_id(source).unwrap();
            assert_eq!(expected_base, base, "{source}");
            assert_eq!(expected_factor, rule.factor, "{source}");
        }
    }

    #[test]
    fn test_parse_unit_id_continuations() {
        let c = converter();
        let (base, _) = c.parse_unit_id("mile-scandinavian-per-hour").unwrap();
        assert_eq!("meter-per-second", base);
        let (base, _) = c.parse_unit_id("pound-force-per-square-inch").unwrap();
        assert_eq!("kilogram-per-meter-square-second", base);
    }

    #[test]
    fn test_parse_unit_id_denormalization() {
        let c = converter();
        let (base, rule) = c.parse_unit_id("liter-per-100kilometers").unwrap();
        // cubic-meter over 100 * kilometer cancels to square-meter
        assert_eq!("square-meter", base);
        assert_eq!(Rational::of(1, 100_000_000), rule.factor);
    }

    #[test]
    fn test_parse_unit_id_prefixed_compound() {
        let c = converter();
        let (base, rule) = c.parse_unit_id("milligram-per-deciliter").unwrap();
        assert_eq!("kilogram-per-cubic-meter", base);
        assert_eq!(Rational::of(1, 100), rule.factor);
    }

    #[test]
    fn test_equivalence_classes_are_disjoint() {
        let c = converter();
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut classes: Vec<BTreeSet<&str>> = Vec::new();
        for unit in c.can_convert() {
            if seen.contains(unit) {
                continue;
            }
            let class = c.can_convert_between(unit);
            seen.extend(class.iter());
            classes.push(class);
        }
        for (i, a) in classes.iter().enumerate() {
            for b in &classes[i + 1..] {
                assert!(
                    a.is_disjoint(b),
                    "overlapping equivalence classes: {a:?} ~ {b:?}"
                );
            }
        }
        // every member of a class sees the same class
        for class in &classes {
            for unit in class {
                assert_eq!(*class, c.can_convert_between(unit), "{unit}");
            }
        }
    }

    #[test]
    fn test_base_unit_names_use_allowed_atoms() {
        let allowed: BTreeSet<&str> = BASE_UNITS
            .iter()
            .copied()
            .chain(["per", "square", "cubic"])
            .collect();
        for unit in converter().base_units() {
            for piece in unit.split('-') {
                assert!(allowed.contains(piece), "{unit}: unexpected atom {piece}");
            }
        }
    }

    #[test]
    fn test_every_registered_unit_reduces_to_base() {
        let c = converter();
        for unit in c.can_convert() {
            if c.is_base_unit(unit) {
                continue;
            }
            let (_, base) = c.get_unit_info(unit).unwrap_or_else(|| {
                panic!("{unit} has no reduction to a base unit")
            });
            assert!(c.is_base_unit(base), "{unit} reduces to non-base {base}");
        }
    }
}
