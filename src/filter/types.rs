use serde::{Deserialize, Serialize};

/// A boolean test over a document's top-level fields.
///
/// Predicates are built only from server code (see [`super::BookFilter`]); client
/// input never reaches this type as anything but a scalar string value, so
/// there is no way for a request to smuggle operators into a store query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// Matches every document.
    All,
    /// Every child must match. An empty list matches everything.
    And(Vec<Predicate>),
    /// At least one child must match. An empty list matches nothing.
    Or(Vec<Predicate>),
    /// Exact, case-sensitive string equality.
    Eq { field: String, value: String },
    /// Case-insensitive, unanchored substring match.
    Contains { field: String, needle: String },
    /// Case-insensitive prefix match.
    StartsWith { field: String, prefix: String },
}

impl Predicate {
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::Eq { field: field.into(), value: value.into() }
    }

    pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Predicate::Contains { field: field.into(), needle: needle.into() }
    }

    pub fn starts_with(field: impl Into<String>, prefix: impl Into<String>) -> Self {
        Predicate::StartsWith { field: field.into(), prefix: prefix.into() }
    }

    /// Collapse a conjunction: no conditions is `All`, one condition is itself.
    pub fn all_of(mut conditions: Vec<Predicate>) -> Self {
        match conditions.len() {
            0 => Predicate::All,
            1 => conditions.remove(0),
            _ => Predicate::And(conditions),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Predicate::All)
    }
}

impl Default for Predicate {
    fn default() -> Self {
        Predicate::All
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOrderInfo {
    pub field: String,
    pub sort: SortDirection,
}

/// Ordering and size limits applied after a predicate.
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub order: Vec<FilterOrderInfo>,
    pub limit: Option<usize>,
}

impl FindOptions {
    pub fn order_by(mut self, field: impl Into<String>, sort: SortDirection) -> Self {
        self.order.push(FilterOrderInfo { field: field.into(), sort });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
