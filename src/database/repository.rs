use async_trait::async_trait;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::filter::{FindOptions, Predicate};

/// Fields a client may never set on a document; the store owns the identifier.
pub const IDENTIFIER_FIELDS: [&str; 2] = ["id", "_id"];

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Unique constraint violated on {collection}.{field}")]
    Conflict {
        collection: &'static str,
        field: &'static str,
    },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// The document collections the catalog persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Books,
    Users,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Books, Collection::Users];

    pub fn table_name(&self) -> &'static str {
        match self {
            Collection::Books => "books",
            Collection::Users => "users",
        }
    }

    /// Fields whose values must be unique across the collection. Enforced by the
    /// store itself so concurrent inserts cannot both succeed.
    pub fn unique_fields(&self) -> &'static [&'static str] {
        match self {
            Collection::Books => &[],
            Collection::Users => &["email"],
        }
    }
}

/// A stored document: a store-assigned identifier plus a free-form JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub body: Map<String, Value>,
}

impl Document {
    pub fn new(id: Uuid, mut body: Map<String, Value>) -> Self {
        strip_identifier_fields(&mut body);
        Self { id, body }
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.body.get(field).and_then(Value::as_str)
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::with_capacity(self.body.len() + 1);
        map.insert("id".to_string(), Value::String(self.id.to_string()));
        map.extend(self.body.iter().map(|(k, v)| (k.clone(), v.clone())));
        Value::Object(map)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.body.len() + 1))?;
        map.serialize_entry("id", &self.id)?;
        for (key, value) in &self.body {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Remove any client-supplied identifier from a document body.
pub fn strip_identifier_fields(body: &mut Map<String, Value>) {
    for field in IDENTIFIER_FIELDS {
        body.remove(field);
    }
}

/// Durable document storage.
///
/// Every operation touches at most one document except `find`. Implementations
/// must make each call individually atomic and must enforce
/// [`Collection::unique_fields`], reporting violations as
/// [`RepositoryError::Conflict`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(
        &self,
        collection: Collection,
        predicate: &Predicate,
        options: &FindOptions,
    ) -> Result<Vec<Document>, RepositoryError>;

    async fn find_one(
        &self,
        collection: Collection,
        predicate: &Predicate,
    ) -> Result<Option<Document>, RepositoryError> {
        let options = FindOptions::default().limit(1);
        Ok(self.find(collection, predicate, &options).await?.into_iter().next())
    }

    async fn find_by_id(&self, collection: Collection, id: Uuid) -> Result<Option<Document>, RepositoryError>;

    /// Insert a new document and return it with its assigned identifier.
    async fn insert(&self, collection: Collection, body: Map<String, Value>) -> Result<Document, RepositoryError>;

    /// Merge `fields` into the top level of the document. Returns the updated
    /// document, or `None` when no document has that identifier.
    async fn update_by_id(
        &self,
        collection: Collection,
        id: Uuid,
        fields: Map<String, Value>,
    ) -> Result<Option<Document>, RepositoryError>;

    /// Returns whether a document was deleted.
    async fn delete_by_id(&self, collection: Collection, id: Uuid) -> Result<bool, RepositoryError>;

    /// Atomically append `value` to the array stored at `field`, creating the
    /// array when the field is absent. Returns `false` when no document matched
    /// or the field holds something other than an array.
    async fn append_to_field(
        &self,
        collection: Collection,
        id: Uuid,
        field: &str,
        value: Value,
    ) -> Result<bool, RepositoryError>;

    async fn health_check(&self) -> Result<(), RepositoryError>;
}
