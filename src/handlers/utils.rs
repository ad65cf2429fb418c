use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Unwrap a JSON body, reporting a malformed one in the API's error shape.
pub fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::invalid_json(rejection.body_text()))
}

/// Like [`json_body`] but the body must be a JSON object.
pub fn json_object(payload: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, ApiError> {
    match json_body(payload)? {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::validation_error("Request body must be a JSON object", None)),
    }
}

pub fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}
