use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::book::{reviews_of, strip_protected_fields, FIELD_CUSTOMER_REVIEWS};
use crate::database::models::NewBook;
use crate::database::repository::{Collection, Document, DocumentStore, RepositoryError};
use crate::filter::filter::FIELD_PUBLICATION_DATE;
use crate::filter::{BookFilter, FindOptions, SortDirection};

/// How many books the "recently published" listing returns at most.
pub const RECENT_LIMIT: usize = 10;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Book not found: {0}")]
    NotFound(String),

    #[error("Invalid book payload: {0}")]
    InvalidPayload(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Book retrieval and single-document mutations over the store.
///
/// Authorization is not checked here; mutating routes are wrapped by the
/// auth guard before they can call in.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn DocumentStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, filter: &BookFilter) -> Result<Vec<Document>, CatalogError> {
        let predicate = filter.to_predicate();
        Ok(self.store.find(Collection::Books, &predicate, &FindOptions::default()).await?)
    }

    /// Up to [`RECENT_LIMIT`] books, newest publication date first.
    pub async fn recent(&self) -> Result<Vec<Document>, CatalogError> {
        let options = FindOptions::default()
            .order_by(FIELD_PUBLICATION_DATE, SortDirection::Desc)
            .limit(RECENT_LIMIT);
        Ok(self.store.find(Collection::Books, &BookFilter::new().to_predicate(), &options).await?)
    }

    pub async fn get(&self, id: &str) -> Result<Document, CatalogError> {
        let id = parse_id(id)?;
        self.store
            .find_by_id(Collection::Books, id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    pub async fn create(&self, book: NewBook) -> Result<Document, CatalogError> {
        let body = book.into_body().map_err(|e| CatalogError::InvalidPayload(e.to_string()))?;
        let doc = self.store.insert(Collection::Books, body).await?;
        tracing::info!("Created book {}", doc.id);
        Ok(doc)
    }

    /// Merge `fields` into the stored book. The identifier and the review list
    /// are discarded from the payload; reviews only change through
    /// [`Self::append_review`].
    pub async fn update(&self, id: &str, mut fields: Map<String, Value>) -> Result<Document, CatalogError> {
        let id = parse_id(id)?;
        strip_protected_fields(&mut fields);
        let doc = self
            .store
            .update_by_id(Collection::Books, id, fields)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        tracing::info!("Updated book {}", doc.id);
        Ok(doc)
    }

    pub async fn delete(&self, id: &str) -> Result<(), CatalogError> {
        let id = parse_id(id)?;
        if !self.store.delete_by_id(Collection::Books, id).await? {
            return Err(CatalogError::NotFound(id.to_string()));
        }
        tracing::info!("Deleted book {}", id);
        Ok(())
    }

    /// Append a review to the end of the book's review list. Never creates a
    /// book.
    pub async fn append_review(&self, id: &str, review: Value) -> Result<(), CatalogError> {
        let id = parse_id(id)?;
        let appended = self
            .store
            .append_to_field(Collection::Books, id, FIELD_CUSTOMER_REVIEWS, review)
            .await?;
        if !appended {
            return Err(CatalogError::NotFound(id.to_string()));
        }
        tracing::info!("Appended review to book {}", id);
        Ok(())
    }

    pub async fn reviews(&self, id: &str) -> Result<Vec<Value>, CatalogError> {
        let book = self.get(id).await?;
        Ok(reviews_of(&book))
    }
}

/// Identifiers are store-native UUIDs; anything else cannot name a book.
fn parse_id(id: &str) -> Result<Uuid, CatalogError> {
    Uuid::parse_str(id).map_err(|_| CatalogError::NotFound(id.to_string()))
}
