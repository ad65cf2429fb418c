use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repository::{strip_identifier_fields, Collection, Document, DocumentStore, RepositoryError};
use crate::filter::{FilterOrderInfo, FindOptions, Predicate, SortDirection};

/// Process-local document store.
///
/// Each collection keeps documents in insertion order. Writes hold the lock
/// for the whole check-and-write, so the unique-field check and the insert
/// are one atomic step.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self, collection: Collection) -> usize {
        self.collections.read().await.get(&collection).map_or(0, Vec::len)
    }

    fn check_unique(
        collection: Collection,
        existing: &[Document],
        body: &Map<String, Value>,
        skip: Option<Uuid>,
    ) -> Result<(), RepositoryError> {
        for field in collection.unique_fields() {
            let Some(candidate) = body.get(*field) else { continue };
            let clash = existing
                .iter()
                .filter(|doc| Some(doc.id) != skip)
                .any(|doc| doc.body.get(*field) == Some(candidate));
            if clash {
                return Err(RepositoryError::Conflict { collection: collection.table_name(), field: *field });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: Collection,
        predicate: &Predicate,
        options: &FindOptions,
    ) -> Result<Vec<Document>, RepositoryError> {
        let collections = self.collections.read().await;
        let mut found: Vec<Document> = collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|doc| predicate.matches(&doc.body)).cloned().collect())
            .unwrap_or_default();

        if !options.order.is_empty() {
            found.sort_by(|a, b| compare_documents(a, b, &options.order));
        }
        if let Some(limit) = options.limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn find_by_id(&self, collection: Collection, id: Uuid) -> Result<Option<Document>, RepositoryError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|doc| doc.id == id))
            .cloned())
    }

    async fn insert(&self, collection: Collection, body: Map<String, Value>) -> Result<Document, RepositoryError> {
        let document = Document::new(Uuid::new_v4(), body);
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();
        Self::check_unique(collection, docs.as_slice(), &document.body, None)?;
        docs.push(document.clone());
        Ok(document)
    }

    async fn update_by_id(
        &self,
        collection: Collection,
        id: Uuid,
        mut fields: Map<String, Value>,
    ) -> Result<Option<Document>, RepositoryError> {
        strip_identifier_fields(&mut fields);
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();
        let Some(index) = docs.iter().position(|doc| doc.id == id) else {
            return Ok(None);
        };

        let mut merged = docs[index].body.clone();
        merged.extend(fields);
        Self::check_unique(collection, docs.as_slice(), &merged, Some(id))?;

        docs[index].body = merged;
        Ok(Some(docs[index].clone()))
    }

    async fn delete_by_id(&self, collection: Collection, id: Uuid) -> Result<bool, RepositoryError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|doc| doc.id != id);
        Ok(docs.len() < before)
    }

    async fn append_to_field(
        &self,
        collection: Collection,
        id: Uuid,
        field: &str,
        value: Value,
    ) -> Result<bool, RepositoryError> {
        let mut collections = self.collections.write().await;
        let Some(doc) = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|doc| doc.id == id))
        else {
            return Ok(false);
        };

        match doc.body.entry(field.to_string()).or_insert_with(|| Value::Array(vec![])) {
            Value::Array(items) => {
                items.push(value);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// Order by string field values; documents missing the field sort last in
/// either direction, like `NULLS LAST`.
fn compare_documents(a: &Document, b: &Document, order: &[FilterOrderInfo]) -> Ordering {
    for info in order {
        let ordering = match (a.get_str(&info.field), b.get_str(&info.field)) {
            (Some(x), Some(y)) => match info.sort {
                SortDirection::Asc => x.cmp(y),
                SortDirection::Desc => y.cmp(x),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_fresh_identifier() {
        let store = MemoryStore::new();
        let doc = store
            .insert(Collection::Books, body(json!({ "id": "client-chosen", "title": "Dune" })))
            .await
            .unwrap();
        assert!(!doc.body.contains_key("id"));
        let fetched = store.find_by_id(Collection::Books, doc.id).await.unwrap();
        assert_eq!(fetched, Some(doc));
    }

    #[tokio::test]
    async fn unique_field_conflicts_on_second_insert() {
        let store = MemoryStore::new();
        store.insert(Collection::Users, body(json!({ "email": "a@x.com" }))).await.unwrap();
        let err = store
            .insert(Collection::Users, body(json!({ "email": "a@x.com" })))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict { field: "email", .. }));
        assert_eq!(store.len(Collection::Users).await, 1);
    }

    #[tokio::test]
    async fn emails_differing_in_case_are_distinct() {
        let store = MemoryStore::new();
        store.insert(Collection::Users, body(json!({ "email": "a@x.com" }))).await.unwrap();
        store.insert(Collection::Users, body(json!({ "email": "A@x.com" }))).await.unwrap();
        assert_eq!(store.len(Collection::Users).await, 2);
    }

    #[tokio::test]
    async fn update_merges_and_keeps_identifier() {
        let store = MemoryStore::new();
        let doc = store
            .insert(Collection::Books, body(json!({ "title": "Dune", "genre": "SF" })))
            .await
            .unwrap();
        let updated = store
            .update_by_id(Collection::Books, doc.id, body(json!({ "id": Uuid::new_v4(), "genre": "Sci-Fi" })))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, doc.id);
        assert_eq!(updated.get_str("title"), Some("Dune"));
        assert_eq!(updated.get_str("genre"), Some("Sci-Fi"));
        assert!(!updated.body.contains_key("id"));
    }

    #[tokio::test]
    async fn update_unknown_returns_none() {
        let store = MemoryStore::new();
        let result = store
            .update_by_id(Collection::Books, Uuid::new_v4(), body(json!({ "title": "x" })))
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(store.len(Collection::Books).await, 0);
    }

    #[tokio::test]
    async fn append_creates_then_extends_array() {
        let store = MemoryStore::new();
        let doc = store.insert(Collection::Books, body(json!({ "title": "Dune" }))).await.unwrap();
        assert!(store.append_to_field(Collection::Books, doc.id, "customerReviews", json!("first")).await.unwrap());
        assert!(store.append_to_field(Collection::Books, doc.id, "customerReviews", json!({"r": 2})).await.unwrap());
        let stored = store.find_by_id(Collection::Books, doc.id).await.unwrap().unwrap();
        assert_eq!(stored.body["customerReviews"], json!(["first", {"r": 2}]));
    }

    #[tokio::test]
    async fn append_to_missing_document_creates_nothing() {
        let store = MemoryStore::new();
        let appended = store
            .append_to_field(Collection::Books, Uuid::new_v4(), "customerReviews", json!("x"))
            .await
            .unwrap();
        assert!(!appended);
        assert_eq!(store.len(Collection::Books).await, 0);
    }

    #[tokio::test]
    async fn find_orders_desc_with_missing_last_and_limits() {
        let store = MemoryStore::new();
        for date in ["2001-01-01", "2020-05-05", "1999-12-31"] {
            store.insert(Collection::Books, body(json!({ "publicationDate": date }))).await.unwrap();
        }
        store.insert(Collection::Books, body(json!({ "title": "undated" }))).await.unwrap();

        let options = FindOptions::default().order_by("publicationDate", SortDirection::Desc).limit(3);
        let found = store.find(Collection::Books, &Predicate::All, &options).await.unwrap();
        let dates: Vec<_> = found.iter().map(|d| d.get_str("publicationDate").unwrap()).collect();
        assert_eq!(dates, vec!["2020-05-05", "2001-01-01", "1999-12-31"]);
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed() {
        let store = MemoryStore::new();
        let doc = store.insert(Collection::Books, body(json!({ "title": "Dune" }))).await.unwrap();
        assert!(store.delete_by_id(Collection::Books, doc.id).await.unwrap());
        assert!(!store.delete_by_id(Collection::Books, doc.id).await.unwrap());
    }
}
