use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Success envelope: always a `message`, plus the payload under a key chosen
/// by the endpoint (`data`, `book`, `token`, ...).
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub message: String,
    pub payload: Option<(&'static str, T)>,
    pub status_code: Option<StatusCode>,
}

impl ApiResponse<()> {
    /// A response carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            payload: None,
            status_code: None,
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(message: impl Into<String>, key: &'static str, data: T) -> Self {
        Self {
            message: message.into(),
            payload: Some((key, data)),
            status_code: None,
        }
    }

    pub fn data(message: impl Into<String>, data: T) -> Self {
        Self::new(message, "data", data)
    }

    pub fn book(message: impl Into<String>, book: T) -> Self {
        Self::new(message, "book", book)
    }

    pub fn with_status(mut self, status_code: StatusCode) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// Create a 201 Created response
    pub fn created(self) -> Self {
        self.with_status(StatusCode::CREATED)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let mut envelope = Map::new();
        envelope.insert("message".to_string(), Value::String(self.message));

        if let Some((key, data)) = self.payload {
            let data_value = match serde_json::to_value(&data) {
                Ok(value) => value,
                Err(e) => {
                    tracing::error!("Failed to serialize response data: {}", e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({
                            "error": true,
                            "message": "Failed to serialize response data",
                            "code": "INTERNAL_SERVER_ERROR"
                        })),
                    )
                        .into_response();
                }
            };
            envelope.insert(key.to_string(), data_value);
        }

        (status, Json(Value::Object(envelope))).into_response()
    }
}

// Convenience type alias
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
