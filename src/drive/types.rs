use serde::{Deserialize, Deserializer, Serialize};

/// Mime type Google Drive uses for folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Snapshot of a Drive file or folder as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub id: String,
    pub name: String,
    /// Size in bytes (Drive omits it for folders and native documents)
    #[serde(default, deserialize_with = "size_from_string_or_number")]
    pub size: u64,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub web_content_link: Option<String>,
}

impl FileEntry {
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }
}

/// Children of a folder, split into plain files and subfolders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderListing {
    pub files: Vec<FileEntry>,
    pub subfolders: Vec<FileEntry>,
}

impl FolderListing {
    /// Append a page of children, keeping their order within each group
    pub fn extend(&mut self, entries: impl IntoIterator<Item = FileEntry>) {
        for entry in entries {
            if entry.is_folder() {
                self.subfolders.push(entry);
            } else {
                self.files.push(entry);
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSize {
    Number(u64),
    Text(String),
}

// Drive encodes int64 fields as decimal strings
fn size_from_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawSize>::deserialize(deserializer)? {
        None => Ok(0),
        Some(RawSize::Number(n)) => Ok(n),
        Some(RawSize::Text(s)) => s.parse().map_err(serde::de::Error::custom),
    }
}
