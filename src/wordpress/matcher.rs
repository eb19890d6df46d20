// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use tracing::debug;

use crate::fuzzy::{FuzzyMatcher, MatchOptions};

use super::client::WordPressPost;

/// Matching settings for post titles: strict, anchored near the start of the title
pub const MATCH_OPTIONS: MatchOptions = MatchOptions {
    threshold: 0.3,
    distance: 100,
    location: 0,
    min_match_char_length: 3,
};

/// Series name of a release file: everything before the first `.S` marker
pub fn series_name(file_name: &str) -> String {
    let head = file_name.split(".S").next().unwrap_or(file_name);
    head.replace('.', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pick the post whose title best matches the file's series name
pub fn find_matching_post<'a>(
    posts: &'a [WordPressPost],
    file_name: &str,
) -> Option<&'a WordPressPost> {
    let series = series_name(file_name);
    let matcher = FuzzyMatcher::new(&series, MATCH_OPTIONS);

    match matcher.best(posts.iter().map(|post| post.title.as_str())) {
        Some(best) => {
            let post = &posts[best.index];
            debug!(series = %series, title = %post.title, score = best.score, "Matched post");
            Some(post)
        }
        None => {
            debug!(
                series = %series,
                candidates = ?posts.iter().map(|p| p.title.as_str()).collect::<Vec<_>>(),
                "No matching post"
            );
            None
        }
    }
}
