use std::sync::Arc;

use crate::auth::{CredentialStore, TokenConfig, TokenError, TokenService};
use crate::database::DocumentStore;
use crate::services::CatalogService;

/// Everything a handler needs, shared by every request. Holds no mutable
/// state of its own; durable state lives behind `store`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub tokens: Arc<TokenService>,
    pub credentials: CredentialStore,
    pub catalog: CatalogService,
    pub enable_cors: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, token_config: TokenConfig, bcrypt_cost: u32) -> Result<Self, TokenError> {
        let tokens = Arc::new(TokenService::new(token_config)?);
        Ok(Self {
            credentials: CredentialStore::new(store.clone(), bcrypt_cost),
            catalog: CatalogService::new(store.clone()),
            tokens,
            store,
            enable_cors: true,
        })
    }

    pub fn with_cors(mut self, enable_cors: bool) -> Self {
        self.enable_cors = enable_cors;
        self
    }
}
