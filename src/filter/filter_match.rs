use serde_json::{Map, Value};

use super::types::Predicate;

impl Predicate {
    /// Evaluate the predicate against a document body in process.
    ///
    /// Only string fields can satisfy a field condition; a missing field or a
    /// non-string value never matches.
    pub fn matches(&self, document: &Map<String, Value>) -> bool {
        match self {
            Predicate::All => true,
            Predicate::And(parts) => parts.iter().all(|p| p.matches(document)),
            Predicate::Or(parts) => parts.iter().any(|p| p.matches(document)),
            Predicate::Eq { field, value } => {
                string_field(document, field).map_or(false, |s| s == value)
            }
            Predicate::Contains { field, needle } => string_field(document, field)
                .map_or(false, |s| s.to_lowercase().contains(&needle.to_lowercase())),
            Predicate::StartsWith { field, prefix } => string_field(document, field)
                .map_or(false, |s| s.to_lowercase().starts_with(&prefix.to_lowercase())),
        }
    }
}

fn string_field<'a>(document: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    document.get(field).and_then(Value::as_str)
}
