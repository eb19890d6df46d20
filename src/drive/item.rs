// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::Serialize;

use crate::error::DriveError;

use super::client::DriveGateway;
use super::types::{FileEntry, FolderListing};

/// A resolved Drive reference: either a single file or a folder with its children
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DriveItem {
    File(FileView),
    Folder(FolderView),
}

/// A single file, presented as a listing of itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileView {
    #[serde(flatten)]
    pub entry: FileEntry,
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderView {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    /// Always null for folders
    pub web_content_link: Option<String>,
    /// Always null for folders
    pub size: Option<u64>,
    pub files: Vec<FileEntry>,
    pub sub_folders: Vec<SubFolder>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubFolder {
    pub id: String,
    pub name: String,
    pub web_content_link: String,
    pub mime_type: String,
}

impl From<FileEntry> for SubFolder {
    fn from(entry: FileEntry) -> Self {
        let web_content_link = entry
            .web_content_link
            .unwrap_or_else(|| format!("https://drive.google.com/drive/folders/{}", entry.id));

        Self {
            id: entry.id,
            name: entry.name,
            web_content_link,
            mime_type: "folder".to_string(),
        }
    }
}

impl DriveItem {
    pub fn file(entry: FileEntry) -> Self {
        DriveItem::File(FileView {
            files: vec![entry.clone()],
            entry,
        })
    }

    pub fn folder(folder: FileEntry, listing: FolderListing) -> Self {
        DriveItem::Folder(FolderView {
            id: folder.id,
            name: folder.name,
            mime_type: folder.mime_type,
            web_content_link: None,
            size: None,
            files: listing.files,
            sub_folders: listing.subfolders.into_iter().map(SubFolder::from).collect(),
        })
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, DriveItem::Folder(_))
    }

    pub fn name(&self) -> &str {
        match self {
            DriveItem::File(view) => &view.entry.name,
            DriveItem::Folder(view) => &view.name,
        }
    }

    /// The files this item exposes for renaming and embedding
    pub fn files(&self) -> &[FileEntry] {
        match self {
            DriveItem::File(view) => &view.files,
            DriveItem::Folder(view) => &view.files,
        }
    }

    pub fn into_files(self) -> Vec<FileEntry> {
        match self {
            DriveItem::File(view) => view.files,
            DriveItem::Folder(view) => view.files,
        }
    }
}

/// Resolve a Drive ID into a file or a fully listed folder
pub async fn load_item<G: DriveGateway + ?Sized>(
    gateway: &G,
    id: &str,
) -> Result<DriveItem, DriveError> {
    let entry = gateway.get_info(id).await?;

    if entry.is_folder() {
        let listing = gateway.list_folder(&entry.id).await?;
        Ok(DriveItem::folder(entry, listing))
    } else {
        Ok(DriveItem::file(entry))
    }
}
