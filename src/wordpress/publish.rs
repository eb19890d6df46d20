// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::PublishError;
use crate::name::search_term;

use super::client::WordPressGateway;
use super::content::{build_episode_marker, has_episode_link, insert_episode_marker, update_title};
use super::matcher::find_matching_post;

/// Input of the publish flow, shaped like the JSON body the endpoint accepts
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub web_content_link: Option<String>,
    /// Overrides the search term derived from the file name
    #[serde(default)]
    pub search_title: Option<String>,
}

/// The post that received the new episode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedEpisode {
    pub post_id: u64,
    pub post_title: String,
    pub episode_marker: String,
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, PublishError> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(PublishError::MissingParameter(name))
}

/// Add an episode download button to the post that matches the file's series
///
/// The post's title gets an `[SxxEyy Added]` tag. Publishing the same link
/// twice fails with [`PublishError::AlreadyApplied`] and leaves the post alone.
pub async fn publish_episode<W>(
    wordpress: &W,
    request: &PublishRequest,
) -> Result<PublishedEpisode, PublishError>
where
    W: WordPressGateway + ?Sized,
{
    let file_name = required(&request.file_name, "fileName")?;
    let link = required(&request.web_content_link, "webContentLink")?;

    let term = match request.search_title.as_deref() {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => search_term(file_name),
    };

    let posts = wordpress
        .search_posts(&term)
        .await
        .map_err(PublishError::Search)?;
    if posts.is_empty() {
        return Err(PublishError::NoPostsFound(term));
    }

    let post = find_matching_post(&posts, file_name)
        .ok_or_else(|| PublishError::NoMatchingPost(file_name.to_string()))?;

    let marker = build_episode_marker(file_name, link);
    if has_episode_link(&post.content, link) {
        return Err(PublishError::AlreadyApplied { post_id: post.id });
    }

    let content = insert_episode_marker(&post.content, &marker);
    if content == post.content {
        warn!(post_id = post.id, "Post has no episode buttons, content left unchanged");
    }
    let title = update_title(&post.title, file_name);

    wordpress
        .update_post(post.id, &content, &title)
        .await
        .map_err(PublishError::Update)?;
    info!(post_id = post.id, title = %title, file_name, "Published episode");

    Ok(PublishedEpisode {
        post_id: post.id,
        post_title: title,
        episode_marker: marker,
    })
}
