use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::Identity;
use crate::error::{ApiError, MSG_NOT_AUTHORIZED};
use crate::state::AppState;

/// Verified caller, injected into request extensions by [`require_auth`].
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub email: String,
}

impl From<Identity> for AuthUser {
    fn from(identity: Identity) -> Self {
        Self { email: identity.email }
    }
}

/// Guard for every mutating catalog route.
///
/// A missing credential is a validation failure and an unverifiable one is
/// unauthorized; both are answered here, so the wrapped handler (and the
/// store) is never reached. Any valid token authorizes any mutation.
pub async fn require_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_headers(&headers)?;

    let identity = state.tokens.verify(&token)?;
    tracing::debug!("Authorized request from {}", identity.email);

    request.extensions_mut().insert(AuthUser::from(identity));
    Ok(next.run(request).await)
}

/// Pull the credential out of the `Authorization` header. Accepts
/// `Bearer <token>` as well as a bare token.
pub fn extract_token_from_headers(headers: &HeaderMap) -> Result<String, ApiError> {
    let Some(auth_header) = headers.get(AUTHORIZATION) else {
        return Err(ApiError::missing_authorization());
    };

    let auth_str = auth_header.to_str().map_err(|_| {
        tracing::warn!("Authorization header is not valid UTF-8");
        ApiError::unauthorized(MSG_NOT_AUTHORIZED)
    })?;

    let trimmed = auth_str.trim();
    let token = match trimmed.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ => trimmed,
    };

    if token.is_empty() {
        return Err(ApiError::missing_authorization());
    }
    Ok(token.to_string())
}
