mod media;
mod resource;
mod size;

pub use media::{episode_number, search_term, season_episode};
pub use resource::{extract_resource_id, is_resource_id};
pub use size::human_readable_size;
