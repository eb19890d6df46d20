// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::net::SocketAddr;
use std::time::Duration;

use crate::drive::OAuthClient;
use crate::error::ConfigError;
use crate::rename::DEFAULT_THROTTLE;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Credentials for the WordPress REST API (application password)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordPressConfig {
    /// Posts collection endpoint, e.g. `https://example.com/wp-json/wp/v2/posts`
    pub api_url: String,
    pub username: String,
    pub password: String,
}

impl WordPressConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: require(&lookup, "WORDPRESS_API_URL")?,
            username: require(&lookup, "WORDPRESS_USERNAME")?,
            password: require(&lookup, "WORDPRESS_PASSWORD")?,
        })
    }
}

/// Runtime configuration read from the environment
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub google_access_token: Option<String>,
    pub google_refresh_token: Option<String>,
    pub oauth: Option<OAuthClient>,
    pub wordpress: Option<WordPressConfig>,
    pub rename_throttle: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let rename_throttle = match lookup("RENAME_THROTTLE_MS") {
            Some(ms) => Duration::from_millis(ms.trim().parse().map_err(
                |e: std::num::ParseIntError| ConfigError::Invalid {
                    name: "RENAME_THROTTLE_MS",
                    reason: e.to_string(),
                },
            )?),
            None => DEFAULT_THROTTLE,
        };

        let oauth = match (
            optional(&lookup, "AUTH_GOOGLE_CLIENT_ID"),
            optional(&lookup, "AUTH_GOOGLE_CLIENT_SECRET"),
        ) {
            (Some(client_id), Some(client_secret)) => Some(OAuthClient {
                client_id,
                client_secret,
            }),
            _ => None,
        };

        // WordPress is optional as a whole, but a half-configured one is an error
        let wordpress = if optional(&lookup, "WORDPRESS_API_URL").is_some() {
            Some(WordPressConfig::from_lookup(&lookup)?)
        } else {
            None
        };

        Ok(Self {
            bind_addr,
            google_access_token: optional(&lookup, "GOOGLE_ACCESS_TOKEN"),
            google_refresh_token: optional(&lookup, "GOOGLE_REFRESH_TOKEN"),
            oauth,
            wordpress,
            rename_throttle,
        })
    }
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).filter(|v| !v.trim().is_empty())
}

fn require(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    optional(lookup, name).ok_or(ConfigError::Missing(name))
}
