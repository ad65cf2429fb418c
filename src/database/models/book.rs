use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::database::repository::{strip_identifier_fields, Document};

pub const FIELD_CUSTOMER_REVIEWS: &str = "customerReviews";

/// Payload accepted by `POST /book`.
///
/// The four catalog fields are required; anything else the client sends is
/// kept as part of the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub publication_date: String,
    #[serde(default)]
    pub customer_reviews: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewBook {
    /// Document body to insert, with any client identifier removed.
    pub fn into_body(self) -> Result<Map<String, Value>, serde_json::Error> {
        let mut body = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        strip_identifier_fields(&mut body);
        Ok(body)
    }
}

/// Drop every field a book update may not touch: the identifier and the
/// review list, which only grows through review appends.
pub fn strip_protected_fields(fields: &mut Map<String, Value>) {
    strip_identifier_fields(fields);
    fields.remove(FIELD_CUSTOMER_REVIEWS);
}

/// The ordered review list stored on a book; empty when none were added.
pub fn reviews_of(book: &Document) -> Vec<Value> {
    match book.body.get(FIELD_CUSTOMER_REVIEWS) {
        Some(Value::Array(items)) => items.clone(),
        _ => vec![],
    }
}
