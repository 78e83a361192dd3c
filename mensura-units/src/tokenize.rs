//! Continuation-aware tokenization of hyphen-joined identifiers
//!
//! Multi-token atomic unit names (`fluid-ounce`, `mile-scandinavian`,
//! `british-thermal-unit`) must not be split into unrelated tokens. Each
//! registered multi-token atom becomes a continuation keyed by its first
//! token; candidates are kept ordered longest-remainder-first so greedy
//! matching never picks a shorter atom that is a prefix of a longer one.

use std::collections::BTreeMap;

/// One registered multi-token atom, minus its first token.
#[derive(Debug, Clone)]
struct Continuation {
    remainder: Vec<String>,
    atom: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Continuations {
    by_first: BTreeMap<String, Vec<Continuation>>,
}

impl Continuations {
    /// Register a hyphenated atom such as `"fluid-ounce"`.
    pub fn add(&mut self, atom: &str) {
        let mut tokens = atom.split('-');
        let first = match tokens.next() {
            Some(t) => t.to_string(),
            None => return,
        };
        let remainder: Vec<String> = tokens.map(str::to_string).collect();
        if remainder.is_empty() {
            return;
        }
        let entry = self.by_first.entry(first).or_default();
        entry.push(Continuation { remainder, atom: atom.to_string() });
        // longest remainder first, then lexicographic, for greedy matching
        entry.sort_by(|a, b| {
            b.remainder
                .len()
                .cmp(&a.remainder.len())
                .then_with(|| a.remainder.cmp(&b.remainder))
        });
    }

    /// Split `identifier` on hyphens, then merge any token run that matches
    /// a registered continuation back into its atom.
    pub fn tokenize(&self, identifier: &str) -> Vec<String> {
        let raw: Vec<&str> = identifier.split('-').collect();
        let mut out = Vec::with_capacity(raw.len());
        let mut i = 0;
        while i < raw.len() {
            if let Some(candidates) = self.by_first.get(raw[i]) {
                if let Some(hit) = candidates.iter().find(|c| {
                    raw.len() - i - 1 >= c.remainder.len()
                        && c.remainder
                            .iter()
                            .zip(&raw[i + 1..])
                            .all(|(want, got)| want == got)
                }) {
                    tracing::trace!(atom = %hit.atom, "continuation match");
                    out.push(hit.atom.clone());
                    i += 1 + hit.remainder.len();
                    continue;
                }
            }
            out.push(raw[i].to_string());
            i += 1;
        }
        out
    }
}
