// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::drive::{DriveGateway, DriveItem, FileEntry};
use crate::http::HttpClient;

use super::AppState;
use super::error::{ApiError, bearer_token};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemQuery {
    mime_id: Option<String>,
}

impl ItemQuery {
    fn id(&self) -> Result<&str, ApiError> {
        self.mime_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::NotFound("File or Folder ID is required".to_string()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameBody {
    #[serde(default)]
    new_name: Option<String>,
}

/// `GET /api/drive/list?mimeId=<id>`
pub async fn list<C>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    Query(query): Query<ItemQuery>,
) -> Result<Json<DriveItem>, ApiError>
where
    C: HttpClient + Clone + 'static,
{
    let drive = state.drive(bearer_token(&headers)?);
    let id = query.id()?;

    let entry = drive.get_info(id).await.map_err(|e| {
        warn!(id, error = %e, "Unable to fetch info");
        ApiError::NotFound("Unable to fetch info!".to_string())
    })?;

    if !entry.is_folder() {
        return Ok(Json(DriveItem::file(entry)));
    }

    let listing = drive.list_folder(&entry.id).await.map_err(|e| {
        error!(id, error = %e, "Failed to list folder");
        ApiError::Internal("Failed to list folder".to_string())
    })?;

    Ok(Json(DriveItem::folder(entry, listing)))
}

/// `PATCH /api/drive/rename?mimeId=<id>` with `{ "newName": ... }`
pub async fn rename<C>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    Query(query): Query<ItemQuery>,
    body: Option<Json<RenameBody>>,
) -> Result<Json<FileEntry>, ApiError>
where
    C: HttpClient + Clone + 'static,
{
    let drive = state.drive(bearer_token(&headers)?);
    let id = query.id()?;

    let new_name = body
        .and_then(|Json(body)| body.new_name)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::BadRequest("New file name is required".to_string()))?;

    match drive.rename(id, &new_name).await {
        Ok(entry) => {
            info!(id, new_name = %entry.name, "Renamed file");
            Ok(Json(entry))
        }
        Err(e) => {
            error!(id, error = %e, "Failed to rename file");
            Err(ApiError::Internal("Failed to rename file".to_string()))
        }
    }
}
