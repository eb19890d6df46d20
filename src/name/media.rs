// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::LazyLock;

use regex::Regex;

static EPISODE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)S\d{2}E(\d{2})").expect("valid episode pattern"));

static SEASON_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)S(\d+)E\d+").expect("valid season pattern"));

// Ordered from most to least specific; the series-with-year form must win over
// the plain movie form or the season marker would end up in the title.
static SERIES_WITH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.*?)\s*\((\d{4})\).*?S(\d+)E\d+").expect("valid series pattern")
});

static MOVIE_WITH_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)\s*\((\d{4})\)").expect("valid movie pattern"));

static DOTTED_SERIES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.*?)\.S(\d+)E\d+").expect("valid dotted pattern"));

/// Extract the episode number from an `S<DD>E<EE>` code in a file name
pub fn episode_number(name: &str) -> Option<u32> {
    EPISODE_CODE
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Extract the season (digits as written) and the episode number from a file name
pub fn season_episode(name: &str) -> Option<(String, u32)> {
    let episode = episode_number(name)?;
    let season = SEASON_CODE.captures(name)?.get(1)?.as_str().to_string();
    Some((season, episode))
}

/// Derive the URL-encoded WordPress search term for a file name
pub fn search_term(file_name: &str) -> String {
    if let Some(caps) = SERIES_WITH_YEAR.captures(file_name) {
        return urlencoding::encode(dots_to_spaces(&caps[1]).trim()).into_owned();
    }

    if let Some(caps) = MOVIE_WITH_YEAR.captures(file_name) {
        let term = format!("{}-{}", caps[1].trim(), &caps[2]);
        return urlencoding::encode(&term).into_owned();
    }

    if let Some(caps) = DOTTED_SERIES.captures(file_name) {
        return urlencoding::encode(dots_to_spaces(&caps[1]).trim()).into_owned();
    }

    urlencoding::encode(&file_name.replace('.', "-")).into_owned()
}

fn dots_to_spaces(s: &str) -> String {
    s.replace('.', " ")
}
