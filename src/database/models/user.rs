use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::repository::{Document, RepositoryError};

pub const FIELD_EMAIL: &str = "email";

/// A registered account as stored. `password` is always a bcrypt hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(skip)]
    pub id: Uuid,
    pub email: String,
    pub password: String,
}

impl TryFrom<Document> for User {
    type Error = RepositoryError;

    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        let mut user: User = serde_json::from_value(serde_json::Value::Object(doc.body))
            .map_err(|e| RepositoryError::InvalidDocument(format!("user {}: {}", doc.id, e)))?;
        user.id = doc.id;
        Ok(user)
    }
}

/// What the API is willing to say about a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self { email: user.email }
    }
}
