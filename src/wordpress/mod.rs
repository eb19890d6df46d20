mod client;
mod content;
mod matcher;
mod publish;

pub use client::{WordPressClient, WordPressGateway, WordPressPost, clean_search_term};
pub use content::{build_episode_marker, has_episode_link, insert_episode_marker, update_title};
pub use matcher::{MATCH_OPTIONS, find_matching_post, series_name};
pub use publish::{PublishRequest, PublishedEpisode, publish_episode};
