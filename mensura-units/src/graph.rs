//! The conversion graph: mutable builder, then a frozen query-only value
//!
//! Rules are ingested as string tuples during a single build phase; the
//! builder is then consumed by `freeze`, which returns a `UnitConverter`
//! with no mutating API at all. The frozen value is safe to share across
//! threads without locks.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use mensura_core::{Rational, RationalParser};

use crate::error::RegistryError;
use crate::rule::ConversionRule;
use crate::tokenize::Continuations;
use crate::unit_id::UnitId;

/// Mutable registration phase of the conversion graph.
///
/// All maps are `BTreeMap`/`BTreeSet` so every iteration-order-dependent
/// behavior (pivot choice in particular) is deterministic.
#[derive(Debug, Default)]
pub struct UnitConverterBuilder {
    parser: RationalParser,
    edges: BTreeMap<String, BTreeMap<String, ConversionRule>>,
    to_base: BTreeMap<String, String>,
    base_units: BTreeSet<String>,
    continuations: Continuations,
    prefixes: BTreeMap<String, Rational>,
    denormalize: BTreeMap<String, String>,
}

impl UnitConverterBuilder {
    /// A builder whose factor/offset expressions are parsed against the
    /// given constant table.
    pub fn new(parser: RationalParser) -> Self {
        UnitConverterBuilder { parser, ..Default::default() }
    }

    /// Declare the fixed physical base units (meter, kilogram, ...).
    /// Units that appear as rule targets are added to the set as well.
    pub fn with_base_units<'a, I: IntoIterator<Item = &'a str>>(mut self, units: I) -> Self {
        self.base_units.extend(units.into_iter().map(str::to_string));
        self
    }

    /// Register a metric prefix as an exact power of ten.
    pub fn with_prefix(mut self, name: &str, power_of_ten: i32) -> Self {
        self.prefixes
            .insert(name.to_string(), Rational::of(10, 1).pow(power_of_ten));
        self
    }

    /// Rewrite a historically irregular spelling before tokenization.
    pub fn with_denormalization(mut self, from: &str, to: &str) -> Self {
        self.denormalize.insert(from.to_string(), to.to_string());
        self
    }

    /// Ingest one conversion rule as it appears in the data source.
    /// Missing factor defaults to 1, missing offset to 0, missing
    /// reciprocal to false. Registers both the forward edge and the
    /// inverted reverse edge, and errors on a duplicate (source, target)
    /// pair: conflicting input data is fatal, not recoverable.
    pub fn add_raw(
        &mut self,
        source: &str,
        target: &str,
        factor: Option<&str>,
        offset: Option<&str>,
        reciprocal: Option<&str>,
    ) -> Result<(), RegistryError> {
        let rule = ConversionRule::new(
            match factor {
                Some(expr) => self.parser.parse(expr)?,
                None => Rational::one(),
            },
            match offset {
                Some(expr) => self.parser.parse(expr)?,
                None => Rational::zero(),
            },
            matches!(reciprocal, Some(flag) if flag.eq_ignore_ascii_case("true")),
        );
        self.insert_edge(source, target, rule.clone())?;
        self.insert_edge(target, source, rule.invert())?;
        self.to_base.insert(source.to_string(), target.to_string());
        self.base_units.insert(target.to_string());
        if source.contains('-') {
            self.continuations.add(source);
        }
        tracing::debug!(source, target, "registered conversion rule");
        Ok(())
    }

    fn insert_edge(
        &mut self,
        source: &str,
        target: &str,
        rule: ConversionRule,
    ) -> Result<(), RegistryError> {
        let targets = self.edges.entry(source.to_string()).or_default();
        if targets.contains_key(target) {
            return Err(RegistryError::DuplicateRule {
                from: source.to_string(),
                to: target.to_string(),
            });
        }
        targets.insert(target.to_string(), rule);
        Ok(())
    }

    /// Consume the builder and produce the immutable query surface.
    pub fn freeze(self) -> UnitConverter {
        tracing::debug!(
            units = self.edges.len(),
            base_units = self.base_units.len(),
            "freezing conversion graph"
        );
        UnitConverter {
            edges: self.edges,
            to_base: self.to_base,
            base_units: self.base_units,
            continuations: self.continuations,
            prefixes: self.prefixes,
            denormalize: self.denormalize,
        }
    }
}

/// The frozen conversion graph. Query-only by construction: there is no
/// `&mut self` method on this type, so post-freeze mutation is a compile
/// error rather than a runtime fault.
#[derive(Debug)]
pub struct UnitConverter {
    edges: BTreeMap<String, BTreeMap<String, ConversionRule>>,
    to_base: BTreeMap<String, String>,
    base_units: BTreeSet<String>,
    continuations: Continuations,
    prefixes: BTreeMap<String, Rational>,
    denormalize: BTreeMap<String, String>,
}

impl UnitConverter {
    /// All units with at least one outgoing edge.
    pub fn can_convert(&self) -> BTreeSet<&str> {
        self.edges.keys().map(String::as_str).collect()
    }

    /// Units reachable from `unit` within one pivot hop: direct targets,
    /// plus everything reachable from those targets. Deliberately not a
    /// full closure; chains needing two or more pivots stay invisible.
    pub fn can_convert_between(&self, unit: &str) -> BTreeSet<&str> {
        let mut result = BTreeSet::new();
        let Some(targets) = self.edges.get(unit) else {
            return result;
        };
        for pivot in targets.keys() {
            result.insert(pivot.as_str());
            if let Some(beyond) = self.edges.get(pivot) {
                result.extend(beyond.keys().map(String::as_str));
            }
        }
        result
    }

    pub fn is_base_unit(&self, unit: &str) -> bool {
        self.base_units.contains(unit)
    }

    pub fn base_units(&self) -> &BTreeSet<String> {
        &self.base_units
    }

    /// Convert `value` from `source` to `target`: direct edge first, then
    /// a single common pivot. The pivot tie-break is the lexicographically
    /// smallest candidate (the edge maps are ordered). Returns the NaN
    /// sentinel when no direct edge or single pivot exists, so bulk
    /// validation can collect failures without aborting.
    pub fn convert(&self, value: &Rational, source: &str, target: &str) -> Rational {
        let Some(targets) = self.edges.get(source) else {
            return Rational::nan();
        };
        if let Some(rule) = targets.get(target) {
            return rule.apply(value);
        }
        let Some(into_target) = self.edges.get(target) else {
            return Rational::nan();
        };
        let Some(pivot) = targets.keys().find(|k| into_target.contains_key(*k)) else {
            return Rational::nan();
        };
        tracing::trace!(source, target, pivot = pivot.as_str(), "pivoted conversion");
        let through = targets[pivot].apply(value);
        self.edges[pivot][target].apply(&through)
    }

    /// The registered rule reducing `unit` one step toward its base, and
    /// that base's name. `None` for base units and unknown units.
    pub fn get_unit_info(&self, unit: &str) -> Option<(&ConversionRule, &str)> {
        if self.base_units.contains(unit) {
            return None;
        }
        let target = self.to_base.get(unit)?;
        let rule = self.edges.get(unit)?.get(target)?;
        Some((rule, target.as_str()))
    }

    /// Parse a compound identifier such as `kilometer-per-hour` into its
    /// canonical base-unit identifier and the aggregate factor rule.
    ///
    /// Compound rules are factor-only: offsets do not compose across
    /// multiplied factors, so the result always has offset 0 and no
    /// reciprocal. Returns `None` ("not convertible") if any atom fails to
    /// resolve to a base unit.
    pub fn parse_unit_id(&self, identifier: &str) -> Option<(String, ConversionRule)> {
        let identifier = self
            .denormalize
            .get(identifier)
            .map(String::as_str)
            .unwrap_or(identifier);
        let tokens = self.continuations.tokenize(identifier);

        let mut in_numerator = true;
        let mut toggled = false;
        let mut power = 1i32;
        let mut numerator = Rational::one();
        let mut denominator = Rational::one();
        let mut id = UnitId::new();

        for token in &tokens {
            match token.as_str() {
                "per" => {
                    // only the first per toggles; later ones are ignored
                    if !toggled {
                        in_numerator = false;
                        toggled = true;
                    }
                    continue;
                }
                "square" => {
                    power = 2;
                    continue;
                }
                "cubic" => {
                    power = 3;
                    continue;
                }
                _ => {}
            }
            if let Some(p) = crate::unit_id::parse_pow_prefix(token) {
                power = p;
                continue;
            }
            if token.starts_with(|c: char| c.is_ascii_digit()) {
                // bare numeric literal, e.g. the 100 in liter-per-100-kilometer
                let literal = Rational::from_str(token).ok()?;
                if in_numerator {
                    numerator = numerator.multiply(&literal);
                } else {
                    denominator = denominator.multiply(&literal);
                }
                continue;
            }
            let (multiplier, base) = self.resolve_atom(token)?;
            let factor = multiplier.pow(power);
            if in_numerator {
                numerator = numerator.multiply(&factor);
            } else {
                denominator = denominator.multiply(&factor);
            }
            let base_tokens: Vec<String> = base.split('-').map(str::to_string).collect();
            id.add_compound(&base_tokens, power, in_numerator);
            power = 1;
        }

        if id.is_empty() {
            return None;
        }
        let rule = ConversionRule::of_factor(numerator.divide(&denominator));
        Some((id.resolve().to_string(), rule))
    }

    /// Resolve one unit atom to `(multiplier, base identifier)`: the atom
    /// itself if registered or base, else the longest metric prefix whose
    /// remainder resolves. A prefix is never stripped blindly, so atoms
    /// like `millimeter-ofhg` that merely start with a prefix stay whole.
    fn resolve_atom(&self, atom: &str) -> Option<(Rational, String)> {
        if let Some(resolved) = self.reduce_to_base(atom) {
            return Some(resolved);
        }
        let mut candidates: Vec<&String> = self.prefixes.keys().collect();
        candidates.sort_by_key(|p| std::cmp::Reverse(p.len()));
        for prefix in candidates {
            let Some(rest) = atom.strip_prefix(prefix.as_str()) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            if let Some((multiplier, base)) = self.reduce_to_base(rest) {
                return Some((self.prefixes[prefix].multiply(&multiplier), base));
            }
        }
        None
    }

    /// Follow `to_base` parents until a base unit is reached, multiplying
    /// the conversion factors along the way.
    fn reduce_to_base(&self, atom: &str) -> Option<(Rational, String)> {
        if self.base_units.contains(atom) {
            return Some((Rational::one(), atom.to_string()));
        }
        let mut current = atom;
        let mut multiplier = Rational::one();
        loop {
            let parent = self.to_base.get(current)?;
            let rule = self.edges.get(current)?.get(parent)?;
            multiplier = multiplier.multiply(&rule.factor);
            if self.base_units.contains(parent) {
                return Some((multiplier, parent.clone()));
            }
            current = parent;
        }
    }
}
