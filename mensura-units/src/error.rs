//! Load-time registry errors

use mensura_core::ExprError;
use thiserror::Error;

/// Fatal ingestion faults. The registry is assumed internally consistent
/// once built, so a conflicting or unparseable rule aborts the load rather
/// than being dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("duplicate conversion rule: {from} -> {to}")]
    DuplicateRule { from: String, to: String },

    #[error("bad conversion expression: {0}")]
    Expr(#[from] ExprError),
}
