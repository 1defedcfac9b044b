//! Field name folding
//!
//! Marketo mixes camelCase REST names with title-cased CSV headers. Every key
//! is folded into lowercase snake case before it reaches the output.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());
static UPPER_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(.)([A-Z][a-z]+)").unwrap());
static LOWER_UPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());
static UNDERSCORES: Lazy<Regex> = Lazy::new(|| Regex::new(r"_+").unwrap());

/// Rewrites a field name into the canonical form
pub trait NameNormalizer: Send + Sync {
    /// Fold a single name. Must be idempotent.
    fn normalize_name(&self, name: &str) -> String;
}

impl<F> NameNormalizer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn normalize_name(&self, name: &str) -> String {
        self(name)
    }
}

/// Default folding: `leadScore` / `Lead Score` / `Lead_Score` -> `lead_score`
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeCase;

impl NameNormalizer for SnakeCase {
    fn normalize_name(&self, name: &str) -> String {
        snake_case(name)
    }
}

/// Fold a name into lowercase snake case
pub fn snake_case(name: &str) -> String {
    let folded = NON_ALNUM.replace_all(name.trim(), "_");
    let folded = UPPER_WORD.replace_all(&folded, "${1}_${2}");
    let folded = LOWER_UPPER.replace_all(&folded, "${1}_${2}");
    let folded = folded.to_lowercase();
    UNDERSCORES
        .replace_all(&folded, "_")
        .trim_matches('_')
        .to_string()
}

#[cfg(test)]
mod name_tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Email", "email")]
    #[test_case("First_Name", "first_name")]
    #[test_case("firstName", "first_name")]
    #[test_case("marketoGUID", "marketo_guid")]
    #[test_case("primaryAttributeValueId", "primary_attribute_value_id")]
    #[test_case("HTTPResponse", "http_response")]
    #[test_case("Lead Score", "lead_score")]
    #[test_case("createdAt", "created_at")]
    #[test_case("address2Line", "address2_line")]
    #[test_case("already_snake", "already_snake")]
    #[test_case("  padded-name ", "padded_name")]
    #[test_case("a", "a")]
    fn test_snake_case(input: &str, expected: &str) {
        assert_eq!(snake_case(input), expected);
    }

    #[test_case("marketoGUID")]
    #[test_case("First_Name")]
    #[test_case("Lead Score (Person)")]
    #[test_case("__weird__Key__")]
    fn test_snake_case_is_idempotent(input: &str) {
        let once = snake_case(input);
        assert_eq!(snake_case(&once), once);
    }

    #[test]
    fn test_closure_as_normalizer() {
        let upper = |name: &str| name.to_uppercase();
        assert_eq!(upper.normalize_name("id"), "ID");
        assert_eq!(SnakeCase.normalize_name("leadId"), "lead_id");
    }
}
