//! Record normalization
//!
//! Folds keys with a [`NameNormalizer`] and turns the literal string `"null"`
//! into a JSON null.

use super::names::{NameNormalizer, SnakeCase};
use crate::error::{Error, Result};
use crate::types::{JsonValue, Record};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

/// Literal Marketo uses for an empty value
pub const NULL_SENTINEL: &str = "null";

/// Applies key folding and null-sentinel resolution to records
#[derive(Clone)]
pub struct Normalizer {
    names: Arc<dyn NameNormalizer>,
}

impl Normalizer {
    /// Create a normalizer with a custom name folding rule
    pub fn new(names: Arc<dyn NameNormalizer>) -> Self {
        Self { names }
    }

    /// Fold one key
    pub fn normalize_key(&self, key: &str) -> Result<String> {
        let folded = self.names.normalize_name(key);
        if folded.is_empty() {
            return Err(Error::normalization(format!(
                "field name '{key}' folds to an empty name"
            )));
        }
        Ok(folded)
    }

    /// Fold a list of header names, keeping their order.
    ///
    /// Two headers folding to the same name is an error.
    pub fn normalize_headers<S: AsRef<str>>(&self, headers: &[S]) -> Result<Vec<String>> {
        let mut folded: Vec<String> = Vec::with_capacity(headers.len());
        for header in headers {
            let header = header.as_ref();
            let name = self.normalize_key(header)?;
            if folded.contains(&name) {
                return Err(Error::normalization(format!(
                    "field '{header}' collides with another field after folding to '{name}'"
                )));
            }
            folded.push(name);
        }
        Ok(folded)
    }

    /// Fold every key of a record
    pub fn normalize_keys(&self, record: Record) -> Result<Record> {
        let mut out = Record::new();
        for (key, value) in record {
            let folded = self.normalize_key(&key)?;
            if out.contains_key(&folded) {
                return Err(Error::normalization(format!(
                    "field '{key}' collides with another field after folding to '{folded}'"
                )));
            }
            out.insert(folded, value);
        }
        Ok(out)
    }

    /// Fold keys and resolve null sentinels for one record
    pub fn normalize_record(&self, record: Record) -> Result<Record> {
        let mut record = self.normalize_keys(record)?;
        resolve_null_sentinels(&mut record);
        Ok(record)
    }

    /// Normalize a record set, preserving order
    pub fn normalize(&self, records: Vec<Record>) -> Result<Vec<Record>> {
        records
            .into_iter()
            .map(|r| self.normalize_record(r))
            .collect()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(Arc::new(SnakeCase))
    }
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer").finish_non_exhaustive()
    }
}

/// Replace every top-level `"null"` string with a JSON null
pub fn resolve_null_sentinels(record: &mut Record) {
    for value in record.values_mut() {
        if value.as_str() == Some(NULL_SENTINEL) {
            *value = JsonValue::Null;
        }
    }
}

/// Difference between observed fields and the static schema
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDrift {
    /// Observed but not in the schema
    pub unexpected: BTreeSet<String>,
    /// In the schema but never observed
    pub missing: BTreeSet<String>,
}

impl SchemaDrift {
    /// Compute the symmetric difference between observed and expected names
    pub fn detect<'a, 'b, O, E>(observed: O, expected: E) -> Self
    where
        O: IntoIterator<Item = &'a str>,
        E: IntoIterator<Item = &'b str>,
    {
        let observed: BTreeSet<&'a str> = observed.into_iter().collect();
        let expected: BTreeSet<&'b str> = expected.into_iter().collect();

        Self {
            unexpected: observed
                .difference(&expected)
                .map(|s| (*s).to_string())
                .collect(),
            missing: expected
                .difference(&observed)
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    /// True when observed and expected agree
    pub fn is_empty(&self) -> bool {
        self.unexpected.is_empty() && self.missing.is_empty()
    }

    /// Log the drift; never fails
    pub fn log(&self, endpoint: &str) {
        if self.is_empty() {
            info!(endpoint, "No schema drift");
        } else {
            info!(
                endpoint,
                unexpected = ?self.unexpected,
                missing = ?self.missing,
                "Schema drift detected"
            );
        }
    }
}
