//! Errors surfaced to HTTP clients as plain-text bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// A failed API request.
///
/// Database error text is passed through to the client unchanged.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing table parameter")]
    MissingTable,

    #[error("Failed to fetch tables: {0}")]
    ListTables(String),

    #[error("Failed to query table: {0}")]
    QueryTable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingTable => StatusCode::BAD_REQUEST,
            ApiError::ListTables(_) | ApiError::QueryTable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::CONTENT_TYPE;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::MissingTable.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::ListTables("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::QueryTable("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_body_is_plain_text() {
        let response = ApiError::QueryTable("boom".into()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let content_type = response.headers().get(CONTENT_TYPE).unwrap();
        assert!(content_type.to_str().unwrap().starts_with("text/plain"));
    }
}
