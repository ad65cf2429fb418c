use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;

use super::Identity;
use crate::database::models::user::FIELD_EMAIL;
use crate::database::models::{User, UserProfile};
use crate::database::repository::{Collection, DocumentStore, RepositoryError};
use crate::filter::Predicate;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Incorrect password")]
    WrongPassword,

    #[error("Password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("Password hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Owns user accounts: registration with salted bcrypt hashes and password
/// verification. Plaintext passwords never reach the store.
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn DocumentStore>,
    bcrypt_cost: u32,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn DocumentStore>, bcrypt_cost: u32) -> Self {
        Self { store, bcrypt_cost }
    }

    /// Create an account for `email`.
    ///
    /// The lookup beforehand only gives a friendly early answer. Two racing
    /// registrations can both pass it; the store's unique constraint on email
    /// rejects the loser, and that conflict is reported as `DuplicateEmail`.
    pub async fn register(&self, email: &str, password: &str) -> Result<UserProfile, CredentialError> {
        require_email(email)?;
        require_password(password)?;

        if self.find_user(email).await?.is_some() {
            tracing::warn!("Signup rejected, email already registered: {}", email);
            return Err(CredentialError::DuplicateEmail(email.to_string()));
        }

        let hashed = self.hash_password(password).await?;

        let mut body = Map::new();
        body.insert(FIELD_EMAIL.to_string(), Value::String(email.to_string()));
        body.insert("password".to_string(), Value::String(hashed));

        match self.store.insert(Collection::Users, body).await {
            Ok(doc) => {
                tracing::info!("Registered user {} ({})", email, doc.id);
                Ok(UserProfile { email: email.to_string() })
            }
            Err(RepositoryError::Conflict { .. }) => {
                tracing::warn!("Signup lost uniqueness race for {}", email);
                Err(CredentialError::DuplicateEmail(email.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Verify a password and return the identity a token should be minted for.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, CredentialError> {
        require_email(email)?;
        require_password(password)?;

        let user = self
            .find_user(email)
            .await?
            .ok_or_else(|| CredentialError::UnknownUser(email.to_string()))?;

        let candidate = password.to_string();
        let hash = user.password.clone();
        let matched = tokio::task::spawn_blocking(move || bcrypt::verify(candidate, &hash)).await??;

        if !matched {
            tracing::warn!("Login failed for {}: wrong password", email);
            return Err(CredentialError::WrongPassword);
        }

        Ok(Identity { email: user.email })
    }

    pub async fn profile(&self, email: &str) -> Result<Option<UserProfile>, CredentialError> {
        Ok(self.find_user(email).await?.map(UserProfile::from))
    }

    async fn find_user(&self, email: &str) -> Result<Option<User>, CredentialError> {
        let predicate = Predicate::eq(FIELD_EMAIL, email);
        match self.store.find_one(Collection::Users, &predicate).await? {
            Some(doc) => Ok(Some(User::try_from(doc)?)),
            None => Ok(None),
        }
    }

    async fn hash_password(&self, password: &str) -> Result<String, CredentialError> {
        let password = password.to_string();
        let cost = self.bcrypt_cost;
        Ok(tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??)
    }
}

/// Emails are stored exactly as supplied but must contain something besides
/// whitespace.
fn require_email(email: &str) -> Result<(), CredentialError> {
    if email.trim().is_empty() {
        return Err(CredentialError::MissingField("email"));
    }
    Ok(())
}

/// Any non-empty password is accepted, whitespace included.
fn require_password(password: &str) -> Result<(), CredentialError> {
    if password.is_empty() {
        return Err(CredentialError::MissingField("password"));
    }
    Ok(())
}
