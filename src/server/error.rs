// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use axum::{
    Json,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::error::PublishError;

/// Errors of the Drive routes, rendered as `{ "message": ... }`
#[derive(Debug)]
pub enum ApiError {
    NotAuthorized,
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotAuthorized => (StatusCode::FORBIDDEN, "Not authorized".to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(serde_json::json!({ "message": message }))).into_response()
    }
}

/// Errors of the WordPress route, rendered as `{ "error": ... }`
#[derive(Debug)]
pub enum PublishApiError {
    NotConfigured,
    Publish(PublishError),
}

impl From<PublishError> for PublishApiError {
    fn from(err: PublishError) -> Self {
        Self::Publish(err)
    }
}

impl IntoResponse for PublishApiError {
    fn into_response(self) -> Response {
        let err = match self {
            PublishApiError::NotConfigured => {
                error!("WordPress credentials are not configured");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": "Internal server error" })),
                )
                    .into_response();
            }
            PublishApiError::Publish(err) => err,
        };

        let (status, message) = match &err {
            PublishError::MissingParameter(name) => {
                warn!(parameter = name, "Missing required parameter");
                (StatusCode::BAD_REQUEST, "Missing required parameters")
            }
            PublishError::AlreadyApplied { post_id } => {
                warn!(post_id, "Episode code already exists in post");
                (StatusCode::BAD_REQUEST, "Episode code already exists in the post")
            }
            PublishError::NoPostsFound(term) => {
                warn!(term = %term, "No posts found");
                (StatusCode::NOT_FOUND, "No posts found matching the search term")
            }
            PublishError::NoMatchingPost(file_name) => {
                warn!(file_name = %file_name, "No matching post");
                (StatusCode::NOT_FOUND, "No matching post found for this episode")
            }
            PublishError::Search(e) => {
                error!(error = %e, "Failed to search posts");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            PublishError::Update(e) => {
                error!(error = %e, "Failed to update post");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to update post")
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Google access token from an `Authorization: Bearer` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::NotAuthorized)
}
