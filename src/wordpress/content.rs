// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use crate::name::{episode_number, season_episode};

static EPISODE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[maxbutton id="2" text="Episode \d+" url="[^"]+"\s*\]"#)
        .expect("valid marker pattern")
});

static EPISODE_BUTTON_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[maxbutton id="2" text="Episode [^"]*" url="([^"]+)"\s*\]"#)
        .expect("valid button pattern")
});

static EPISODE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[S\d+E\d+ Added\]").expect("valid tag pattern"));

static QUALITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{3,4}p\b").expect("valid quality pattern"));

/// Episode button shortcode for a file and its download link
pub fn build_episode_marker(file_name: &str, link: &str) -> String {
    let episode = episode_number(file_name)
        .map(|n| n.to_string())
        .unwrap_or_else(|| "X".to_string());
    format!(r#"[maxbutton id="2" text="Episode {episode}" url="{link}"]"#)
}

/// Whether the post body already has an episode button pointing at `link`
///
/// Spacing before the closing bracket is ignored, so buttons from the embed
/// generator count as well.
pub fn has_episode_link(content: &str, link: &str) -> bool {
    EPISODE_BUTTON_URL
        .captures_iter(content)
        .any(|caps| &caps[1] == link)
}

/// Insert a marker right after the last episode button in a post body
///
/// Content without any episode button is returned unchanged.
pub fn insert_episode_marker(content: &str, marker: &str) -> String {
    let Some(last) = EPISODE_MARKER.find_iter(content).last() else {
        return content.to_string();
    };

    let (before, after) = content.split_at(last.end());
    let separator = if after.starts_with(char::is_whitespace) {
        ""
    } else {
        " "
    };

    format!("{before}{separator}{marker}{after}")
}

/// Put an `[S<season>E<episode> Added]` tag for the file into a post title
///
/// An existing tag is replaced; otherwise the tag goes in front of the first
/// resolution token such as `1080p`. Titles with neither are left as they are.
pub fn update_title(title: &str, file_name: &str) -> String {
    let Some((season, episode)) = season_episode(file_name) else {
        return title.to_string();
    };
    let tag = format!("[S{season}E{episode:02} Added]");

    if EPISODE_TAG.is_match(title) {
        return EPISODE_TAG.replace(title, NoExpand(&tag)).into_owned();
    }

    if let Some(quality) = QUALITY.find(title) {
        let (head, tail) = title.split_at(quality.start());
        return format!("{head}{tag} {tail}");
    }

    title.to_string()
}
