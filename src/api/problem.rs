use crate::error::ImportError;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// RFC 7807 problem details, served as `application/problem+json`.
#[derive(Debug, Clone, Serialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_url: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
}

impl Problem {
    pub fn new(status: StatusCode, type_url: &str, title: &str, detail: impl Into<String>) -> Self {
        Self {
            type_url: type_url.to_string(),
            title: title.to_string(),
            status: status.as_u16(),
            detail: detail.into(),
        }
    }

    pub fn invalid_param(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "/prob/api/invalid-param",
            "Invalid request body.",
            detail,
        )
    }
}

impl From<&ImportError> for Problem {
    fn from(err: &ImportError) -> Self {
        let (status, type_url, title) = match err {
            ImportError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                "/prob/provider/record-not-found",
                "Record not found.",
            ),
            ImportError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "/prob/provider/invalid-input",
                "Invalid input.",
            ),
            ImportError::Read(_) => (
                StatusCode::BAD_GATEWAY,
                "/prob/provider/unexpected-api-read-error",
                "Unexpected API read error.",
            ),
            ImportError::Write(_) => (
                StatusCode::BAD_GATEWAY,
                "/prob/provider/unexpected-api-write-error",
                "Unexpected API write error.",
            ),
            ImportError::EmptyResult(_) => (
                StatusCode::BAD_GATEWAY,
                "/prob/provider/unexpected-response-format",
                "Unexpected response format.",
            ),
            ImportError::Connection(_) => (
                StatusCode::BAD_REQUEST,
                "/prob/provider/invalid-provider-url",
                "Unable to connect to provider.",
            ),
        };
        Self::new(status, type_url, title, err.to_string())
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(self)).into_response();
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}
