pub mod credentials;
pub mod token;

use serde::{Deserialize, Serialize};

pub use credentials::{CredentialError, CredentialStore};
pub use token::{Claims, TokenConfig, TokenError, TokenService, TOKEN_TTL_DAYS};

/// Who a verified token or a successful login speaks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
}
