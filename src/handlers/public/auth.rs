use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::UserProfile;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// Body shared by signup and login. Missing fields deserialize as empty and
/// are reported by the credential store as validation errors.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

fn credentials(payload: Result<Json<CredentialsRequest>, JsonRejection>) -> Result<CredentialsRequest, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::invalid_json(rejection.body_text()))
}

/// POST /auth/signup
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<UserProfile> {
    let request = credentials(payload)?;
    let profile = state.credentials.register(&request.email, &request.password).await?;
    Ok(ApiResponse::data("User sign up successfully!", profile).created())
}

/// POST /auth/login - returns a bearer token under `token`
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<String> {
    let request = credentials(payload)?;
    let identity = state.credentials.authenticate(&request.email, &request.password).await?;
    let token = state.tokens.issue(&identity)?;
    tracing::info!("Issued token for {}", identity.email);
    Ok(ApiResponse::new("Login successfully!", "token", token))
}

/// GET /user/:email - `{status, data}` lookup; an unknown email is not an error
pub async fn user_profile(State(state): State<AppState>, Path(email): Path<String>) -> Result<Json<Value>, ApiError> {
    let body = match state.credentials.profile(&email).await? {
        Some(profile) => json!({ "status": true, "data": profile }),
        None => json!({ "status": false }),
    };
    Ok(Json(body))
}
