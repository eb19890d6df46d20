// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Errors that can occur when talking to the Google Drive API
#[derive(Error, Debug)]
pub enum DriveError {
    #[error("No Google Drive access token available")]
    NotAuthenticated,

    #[error("Request to {url} failed: {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Google Drive returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Giving up on {url} after {attempts} attempts")]
    RetriesExhausted { url: String, attempts: u32 },

    #[error("Failed to decode Google Drive response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid Google Drive URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Errors that can occur when exchanging a refresh token for an access token
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("OAuth client id and secret are not configured")]
    MissingCredentials,

    #[error("Token request failed: {0}")]
    RequestFailed(#[source] reqwest::Error),

    #[error("Token refresh rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to decode token response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Token response has an out-of-range expires_in: {0}")]
    InvalidExpiry(i64),
}

/// Errors that can occur when talking to the WordPress REST API
#[derive(Error, Debug)]
pub enum WordPressError {
    #[error("Request to {url} failed: {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("WordPress returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Invalid WordPress API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to decode WordPress response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors of the publish-episode flow
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("No posts found matching '{0}'")]
    NoPostsFound(String),

    #[error("No matching post found for '{0}'")]
    NoMatchingPost(String),

    #[error("Episode code already exists in post {post_id}")]
    AlreadyApplied { post_id: u64 },

    #[error("WordPress search failed: {0}")]
    Search(#[source] WordPressError),

    #[error("WordPress update failed: {0}")]
    Update(#[source] WordPressError),
}

/// Errors raised while reading configuration from the environment
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable {0} must be set")]
    Missing(&'static str),

    #[error("Environment variable {name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}
