//! Client-visible error taxonomy for the feed pipeline.
//!
//! Only two conditions ever surface: an unknown user (404) and a content
//! source failure (500). Everything else (malformed dates, unknown lookup
//! keys) is defaulted locally inside the scorer and never reaches here.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The profile source has no profile for this user. Surfaced to the
    /// caller, not retried.
    #[error("user {0} not found")]
    UserNotFound(u64),

    /// The content source failed to produce records.
    #[error("content source failed: {0}")]
    Content(#[from] anyhow::Error),
}

impl IntoResponse for FeedError {
    fn into_response(self) -> Response {
        let status = match &self {
            FeedError::UserNotFound(_) => StatusCode::NOT_FOUND,
            FeedError::Content(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let resp = FeedError::UserNotFound(7).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn content_failure_maps_to_500() {
        let resp = FeedError::Content(anyhow::anyhow!("boom")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
