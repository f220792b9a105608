use spin_sdk::http::Response;
use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// Form-level validation failures, surfaced as a list so the client can
    /// show every problem at once.
    Validation(Vec<String>),
    Unauthorized,
    Forbidden,
    NotFound(String),
    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::Validation(errors) => write!(f, "Validation Failed: {}", errors.join("; ")),
            ApiError::Unauthorized => write!(f, "Unauthorized"),
            ApiError::Forbidden => write!(f, "Forbidden"),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal Error: {}", msg),
        }
    }
}

impl From<ApiError> for Response {
    fn from(err: ApiError) -> Self {
        let (status, body) = match err {
            ApiError::BadRequest(msg) => (400, serde_json::json!({ "error": msg })),
            ApiError::Validation(errors) => (400, serde_json::json!({ "errors": errors })),
            ApiError::Unauthorized => (401, serde_json::json!({ "error": "Unauthorized" })),
            ApiError::Forbidden => (403, serde_json::json!({ "error": "Forbidden" })),
            ApiError::NotFound(msg) => (404, serde_json::json!({ "error": msg })),
            ApiError::InternalError(msg) => (500, serde_json::json!({ "error": msg })),
        };

        Response::builder()
            .status(status)
            .header("Content-Type", "application/json")
            .body(serde_json::to_vec(&body).unwrap_or_default())
            .build()
    }
}

impl std::error::Error for ApiError {}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}
