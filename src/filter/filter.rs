use serde::Deserialize;

use super::types::Predicate;

pub const FIELD_TITLE: &str = "title";
pub const FIELD_AUTHOR: &str = "author";
pub const FIELD_GENRE: &str = "genre";
pub const FIELD_PUBLICATION_DATE: &str = "publicationDate";

/// Query parameters accepted by `GET /books`.
///
/// Every field is a plain string; anything structured in the query string is
/// rejected by the extractor before it gets here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookFilter {
    pub search: Option<String>,
    pub genre: Option<String>,
    pub publication_year: Option<String>,
}

impl BookFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn publication_year(mut self, year: impl Into<String>) -> Self {
        self.publication_year = Some(year.into());
        self
    }

    /// Build the store predicate.
    ///
    /// `search` matches title, author or genre as a case-insensitive substring;
    /// `genre` adds exact equality; `publicationYear` adds a `"<year>-"` prefix
    /// test on the publication date. Present conditions are ANDed together and
    /// an empty filter matches every book.
    pub fn to_predicate(&self) -> Predicate {
        let mut conditions = vec![];

        if let Some(term) = present(&self.search) {
            conditions.push(Predicate::Or(vec![
                Predicate::contains(FIELD_TITLE, term),
                Predicate::contains(FIELD_AUTHOR, term),
                Predicate::contains(FIELD_GENRE, term),
            ]));
        }

        if let Some(genre) = present(&self.genre) {
            conditions.push(Predicate::eq(FIELD_GENRE, genre));
        }

        if let Some(year) = present(&self.publication_year) {
            conditions.push(Predicate::starts_with(FIELD_PUBLICATION_DATE, format!("{}-", year)));
        }

        let predicate = Predicate::all_of(conditions);
        tracing::debug!(filter = ?self, ?predicate, "built book predicate");
        predicate
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
