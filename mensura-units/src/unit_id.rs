//! Canonical numerator/denominator power-map form of a resolved unit
//!
//! A fully reduced compound unit is two maps from base atom to positive
//! power, rendered as `atom` / `square-atom` / `cubic-atom` / `powN-atom`
//! sequences with a single `per-` separating numerator from denominator.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

/// Fixed rendering order of the known base atoms. Atoms not listed sort
/// after all known ones, lexicographically.
const BASE_ATOM_ORDER: &[&str] = &[
    "meter", "kilogram", "second", "ampere", "celsius", "mole", "candela",
    "year", "bit", "degree", "pixel", "em", "one",
];

fn rank(name: &str) -> usize {
    BASE_ATOM_ORDER
        .iter()
        .position(|&a| a == name)
        .unwrap_or(BASE_ATOM_ORDER.len())
}

/// A base atom keyed by the fixed ordering above.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Atom(String);

impl Ord for Atom {
    fn cmp(&self, other: &Self) -> Ordering {
        rank(&self.0).cmp(&rank(&other.0)).then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Atom {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Accumulating builder and canonical value in one: powers are added via
/// `add_compound`, then `resolve` cancels atoms shared by both sides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitId {
    numerator: BTreeMap<Atom, i32>,
    denominator: BTreeMap<Atom, i32>,
}

impl UnitId {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a (possibly compound) base identifier into the maps.
    ///
    /// `tokens` is the hyphen-split identifier of an already-base unit,
    /// e.g. `["cubic", "meter"]` or `["meter", "per", "square", "second"]`.
    /// `outer_power` multiplies through every power inside (so `square`
    /// applied to a compound doubles all its exponents), and
    /// `in_numerator` selects the side the compound lands on; an inner
    /// `per` flips it once, permanently.
    pub fn add_compound(&mut self, tokens: &[String], outer_power: i32, in_numerator: bool) {
        let mut side = in_numerator;
        let mut toggled = false;
        let mut power = 1i32;
        for token in tokens {
            match token.as_str() {
                "per" => {
                    if !toggled {
                        side = !in_numerator;
                        toggled = true;
                    }
                }
                "square" => power = 2,
                "cubic" => power = 3,
                _ => {
                    if let Some(p) = parse_pow_prefix(token) {
                        power = p;
                        continue;
                    }
                    self.bump(token, outer_power * power, side);
                    power = 1;
                }
            }
        }
    }

    fn bump(&mut self, atom: &str, power: i32, numerator_side: bool) {
        let map = if numerator_side {
            &mut self.numerator
        } else {
            &mut self.denominator
        };
        *map.entry(Atom(atom.to_string())).or_insert(0) += power;
    }

    /// Cancel atoms appearing on both sides, dropping entries whose net
    /// power is zero. Idempotent: resolving a resolved id is a no-op.
    pub fn resolve(&self) -> UnitId {
        let mut numerator = self.numerator.clone();
        let mut denominator = self.denominator.clone();
        for (atom, den_power) in &self.denominator {
            let Some(&num_power) = numerator.get(atom) else {
                continue;
            };
            let net = num_power - den_power;
            numerator.remove(atom);
            denominator.remove(atom);
            match net.cmp(&0) {
                Ordering::Greater => {
                    numerator.insert(atom.clone(), net);
                }
                Ordering::Less => {
                    denominator.insert(atom.clone(), -net);
                }
                Ordering::Equal => {}
            }
        }
        numerator.retain(|_, p| *p != 0);
        denominator.retain(|_, p| *p != 0);
        UnitId { numerator, denominator }
    }

    pub fn is_empty(&self) -> bool {
        self.numerator.is_empty() && self.denominator.is_empty()
    }

    fn render_side(map: &BTreeMap<Atom, i32>, out: &mut Vec<String>) {
        for (atom, &power) in map {
            match power {
                1 => out.push(atom.0.clone()),
                2 => out.push(format!("square-{}", atom.0)),
                3 => out.push(format!("cubic-{}", atom.0)),
                p => out.push(format!("pow{}-{}", p, atom.0)),
            }
        }
    }
}

/// Recognize a `powN` modifier token (N >= 2).
pub(crate) fn parse_pow_prefix(token: &str) -> Option<i32> {
    let digits = token.strip_prefix("pow")?;
    let p: i32 = digits.parse().ok()?;
    (p >= 2).then_some(p)
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "one");
        }
        let mut parts = Vec::new();
        Self::render_side(&self.numerator, &mut parts);
        if !self.denominator.is_empty() {
            parts.push("per".to_string());
            Self::render_side(&self.denominator, &mut parts);
        }
        write!(f, "{}", parts.join("-"))
    }
}

impl Serialize for UnitId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split('-').map(str::to_string).collect()
    }

    #[test]
    fn test_simple_ratio() {
        let mut id = UnitId::new();
        id.add_compound(&toks("meter"), 1, true);
        id.add_compound(&toks("second"), 1, false);
        assert_eq!("meter-per-second", id.resolve().to_string());
    }

    #[test]
    fn test_fixed_atom_order() {
        let mut id = UnitId::new();
        id.add_compound(&toks("kilogram"), 1, true);
        id.add_compound(&toks("meter"), 1, true);
        id.add_compound(&toks("second"), 1, false);
        // meter renders before kilogram regardless of insertion order
        assert_eq!("meter-kilogram-per-second", id.resolve().to_string());
    }

    #[test]
    fn test_nested_compound_power() {
        let mut id = UnitId::new();
        // square applied to meter-per-second doubles both exponents
        id.add_compound(&toks("meter-per-second"), 2, true);
        assert_eq!("square-meter-per-square-second", id.resolve().to_string());
    }

    #[test]
    fn test_inner_per_flips_side() {
        let mut id = UnitId::new();
        // meter-per-second placed in the denominator
        id.add_compound(&toks("meter-per-second"), 1, false);
        assert_eq!("second-per-meter", id.resolve().to_string());
    }

    #[test]
    fn test_cancellation() {
        let mut id = UnitId::new();
        id.add_compound(&toks("cubic-meter"), 1, true);
        id.add_compound(&toks("meter"), 1, false);
        assert_eq!("square-meter", id.resolve().to_string());
    }

    #[test]
    fn test_full_cancellation_is_one() {
        let mut id = UnitId::new();
        id.add_compound(&toks("meter"), 1, true);
        id.add_compound(&toks("meter"), 1, false);
        assert_eq!("one", id.resolve().to_string());
    }

    #[test]
    fn test_resolve_idempotent() {
        let mut id = UnitId::new();
        id.add_compound(&toks("cubic-meter"), 1, true);
        id.add_compound(&toks("square-meter"), 1, false);
        id.add_compound(&toks("second"), 1, false);
        let once = id.resolve();
        assert_eq!(once, once.resolve());
    }

    #[test]
    fn test_pow_rendering() {
        let mut id = UnitId::new();
        id.add_compound(&toks("square-meter"), 2, true);
        assert_eq!("pow4-meter", id.resolve().to_string());
    }
}
