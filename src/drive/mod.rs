mod auth;
mod client;
mod item;
mod types;

pub use auth::{AccessToken, GOOGLE_TOKEN_URL, OAuthClient, refresh_access_token};
pub use client::{DRIVE_API_URL, DriveClient, DriveGateway, RetryPolicy};
pub use item::{DriveItem, FileView, FolderView, SubFolder, load_item};
pub use types::{FOLDER_MIME_TYPE, FileEntry, FolderListing};
