pub mod batch;
pub mod config;
pub mod drive;
pub mod embed;
pub mod error;
pub mod fuzzy;
pub mod http;
pub mod name;
pub mod progress;
pub mod rename;
pub mod server;
pub mod wordpress;

// Re-export main types for convenience
pub use batch::{BatchOptions, BatchResult, rename_item};
pub use config::{Config, WordPressConfig};
pub use drive::{DriveClient, DriveGateway, DriveItem, FileEntry, OAuthClient, load_item};
pub use embed::{EmbedKind, EmbedOptions, embed_code};
pub use error::{AuthError, ConfigError, DriveError, PublishError, WordPressError};
pub use http::{HttpClient, HttpRequest, HttpResponse, ReqwestClient};
pub use name::{extract_resource_id, human_readable_size};
pub use progress::{NoopReporter, ProgressEvent, ProgressReporter, SharedProgressReporter};
pub use rename::{RenameQueue, RenameRules, plan_renames};
pub use wordpress::{PublishRequest, WordPressClient, publish_episode};
