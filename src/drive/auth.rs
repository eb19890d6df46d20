// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, Duration, Utc};
use reqwest::Method;
use serde::Deserialize;
use tracing::{error, info};

use crate::error::AuthError;
use crate::http::{HttpClient, HttpRequest};

/// Google OAuth token endpoint
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// OAuth client credentials used for the refresh-token grant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthClient {
    pub client_id: String,
    pub client_secret: String,
}

/// A short-lived Google access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Exchange a refresh token for a fresh access token
pub async fn refresh_access_token<C: HttpClient>(
    client: &C,
    oauth: &OAuthClient,
    refresh_token: &str,
) -> Result<AccessToken, AuthError> {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("client_id", &oauth.client_id)
        .append_pair("client_secret", &oauth.client_secret)
        .append_pair("refresh_token", refresh_token)
        .append_pair("grant_type", "refresh_token")
        .finish();

    let request = HttpRequest::new(Method::POST, GOOGLE_TOKEN_URL).form(body);
    let response = client.send(request).await.map_err(AuthError::RequestFailed)?;

    if !response.is_success() {
        let body = response.text();
        error!(status = response.status, body = %body, "Failed to refresh access token");
        return Err(AuthError::Rejected {
            status: response.status,
            body,
        });
    }

    let tokens: TokenResponse = serde_json::from_slice(&response.body)?;
    let expires_at = Duration::try_seconds(tokens.expires_in)
        .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
        .ok_or(AuthError::InvalidExpiry(tokens.expires_in))?;
    info!(%expires_at, "Refreshed Google access token");

    Ok(AccessToken {
        token: tokens.access_token,
        expires_at,
    })
}
