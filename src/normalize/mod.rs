//! Normalization module
//!
//! Rewrites record keys into lowercase snake case, resolves the `"null"`
//! sentinel, and reports drift between observed fields and the static schema.

mod names;
mod normalizer;

pub use names::{snake_case, NameNormalizer, SnakeCase};
pub use normalizer::{resolve_null_sentinels, Normalizer, SchemaDrift, NULL_SENTINEL};
