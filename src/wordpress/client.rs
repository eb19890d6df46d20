// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::LazyLock;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::config::WordPressConfig;
use crate::error::WordPressError;
use crate::http::{HttpClient, HttpRequest, HttpResponse};

/// Upper bound WordPress accepts for `per_page`
const SEARCH_PAGE_SIZE: &str = "100";

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid non-word pattern"));

/// A post as seen by this crate: rendered title and body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPressPost {
    pub id: u64,
    pub title: String,
    pub content: String,
}

#[derive(Deserialize)]
struct Rendered {
    rendered: String,
}

#[derive(Deserialize)]
struct RawPost {
    id: u64,
    title: Rendered,
    content: Rendered,
}

impl From<RawPost> for WordPressPost {
    fn from(raw: RawPost) -> Self {
        Self {
            id: raw.id,
            title: raw.title.rendered,
            content: raw.content.rendered,
        }
    }
}

/// The operations this crate needs from WordPress
#[async_trait]
pub trait WordPressGateway: Send + Sync {
    /// Keyword search over posts, capped at 100 results
    async fn search_posts(&self, term: &str) -> Result<Vec<WordPressPost>, WordPressError>;

    /// Replace a post's body and title and publish it
    async fn update_post(
        &self,
        post_id: u64,
        content: &str,
        title: &str,
    ) -> Result<(), WordPressError>;
}

/// Turn an (optionally URL-encoded) search term into plain keywords
pub fn clean_search_term(term: &str) -> String {
    let decoded = urlencoding::decode(term)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| term.to_string());
    let stripped = NON_WORD.replace_all(&decoded, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// WordPress REST API client using application-password basic auth
#[derive(Clone)]
pub struct WordPressClient<C> {
    client: C,
    api_url: String,
    authorization: String,
}

impl<C: HttpClient> WordPressClient<C> {
    pub fn new(client: C, config: &WordPressConfig) -> Self {
        let credentials = STANDARD.encode(format!("{}:{}", config.username, config.password));
        Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            authorization: format!("Basic {credentials}"),
        }
    }

    fn authorize(&self, request: HttpRequest) -> HttpRequest {
        request
            .header("Authorization", self.authorization.clone())
            .header("Accept", "application/json")
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, WordPressError> {
        let url = request.url.clone();
        let response = self
            .client
            .send(self.authorize(request))
            .await
            .map_err(|source| WordPressError::RequestFailed { url, source })?;

        if !response.is_success() {
            return Err(WordPressError::Upstream {
                status: response.status,
                body: response.text(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl<C: HttpClient> WordPressGateway for WordPressClient<C> {
    async fn search_posts(&self, term: &str) -> Result<Vec<WordPressPost>, WordPressError> {
        let keywords = clean_search_term(term);
        let url = Url::parse_with_params(
            &self.api_url,
            [("search", keywords.as_str()), ("per_page", SEARCH_PAGE_SIZE)],
        )?;

        debug!(%url, keywords = %keywords, "Searching WordPress posts");
        let response = self.send(HttpRequest::get(url)).await?;
        let posts: Vec<RawPost> = serde_json::from_slice(&response.body)?;
        let posts: Vec<WordPressPost> = posts.into_iter().map(WordPressPost::from).collect();

        debug!(
            count = posts.len(),
            titles = ?posts.iter().map(|p| p.title.as_str()).collect::<Vec<_>>(),
            "Found posts"
        );
        Ok(posts)
    }

    async fn update_post(
        &self,
        post_id: u64,
        content: &str,
        title: &str,
    ) -> Result<(), WordPressError> {
        let url = format!("{}/{}", self.api_url, post_id);
        let body = serde_json::json!({
            "content": content,
            "title": title,
            "status": "publish",
        });

        self.send(HttpRequest::new(Method::POST, url).json(&body))
            .await?;
        info!(post_id, title, "Updated WordPress post");
        Ok(())
    }
}
