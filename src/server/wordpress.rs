// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::info;

use crate::error::PublishError;
use crate::http::HttpClient;
use crate::wordpress::{PublishRequest, publish_episode};

use super::AppState;
use super::error::PublishApiError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    success: bool,
    post_id: u64,
    post_title: String,
}

/// `POST /api/wordpress/update`
pub async fn update<C>(
    State(state): State<AppState<C>>,
    body: Option<Json<PublishRequest>>,
) -> Result<Json<UpdateResponse>, PublishApiError>
where
    C: HttpClient + Clone + 'static,
{
    let Some(Json(request)) = body else {
        return Err(PublishError::MissingParameter("body").into());
    };
    info!(
        file_name = ?request.file_name,
        search_title = ?request.search_title,
        "Received publish request"
    );

    // The endpoint never derives a search term on its own
    if request.search_title.as_deref().is_none_or(str::is_empty) {
        return Err(PublishError::MissingParameter("searchTitle").into());
    }

    let wordpress = state.wordpress.as_ref().ok_or(PublishApiError::NotConfigured)?;
    let published = publish_episode(wordpress.as_ref(), &request).await?;

    Ok(Json(UpdateResponse {
        success: true,
        post_id: published.post_id,
        post_title: published.post_title,
    }))
}
