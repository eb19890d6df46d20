// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! WordPress shortcode snippets for the video files of a folder.

use std::sync::LazyLock;

use regex::Regex;

use crate::drive::FileEntry;
use crate::name::{episode_number, human_readable_size};

/// Mime types that count as video files
pub const VIDEO_MIME_TYPES: [&str; 13] = [
    "video/mp4",
    "video/x-msvideo",
    "video/quicktime",
    "video/x-ms-wmv",
    "video/x-flv",
    "video/x-matroska",
    "video/webm",
    "video/mpeg",
    "video/mp2t",
    "video/3gpp",
    "video/3gpp2",
    "video/ogg",
    "application/vnd.rn-realmedia",
];

const THICK_SEPARATOR: &str =
    r#"<p style="text-align: center;">[mks_separator style="solid" height="5"]</p>"#;
const THIN_SEPARATOR: &str =
    r#"<p style="text-align: center;">[mks_separator style="solid" height="2"]</p>"#;

static EPISODE_IN_STEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(S\d+)\s*E\d+").expect("valid stem pattern"));

/// Which snippet layout to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedKind {
    Series,
    Movie,
}

#[derive(Debug, Clone, Default)]
pub struct EmbedOptions {
    /// Add a header with the season name and the average episode size
    pub title: bool,
    /// Number episodes consecutively from here instead of parsing file names
    pub start_episode: Option<u32>,
}

pub fn is_video(file: &FileEntry) -> bool {
    VIDEO_MIME_TYPES.contains(&file.mime_type.as_str())
}

/// Build the snippet for `files`, ignoring anything that is not a video
pub fn embed_code(files: &[FileEntry], kind: EmbedKind, options: &EmbedOptions) -> String {
    let mut videos: Vec<&FileEntry> = files.iter().filter(|f| is_video(f)).collect();
    videos.sort_by(|a, b| a.name.cmp(&b.name));

    match kind {
        EmbedKind::Series => series_code(&videos, options),
        EmbedKind::Movie => {
            videos.sort_by(|a, b| b.size.cmp(&a.size));
            movie_code(&videos)
        }
    }
}

fn link(file: &FileEntry) -> &str {
    file.web_content_link.as_deref().unwrap_or_default()
}

fn series_code(videos: &[&FileEntry], options: &EmbedOptions) -> String {
    let buttons: Vec<String> = videos
        .iter()
        .enumerate()
        .map(|(index, file)| {
            let episode = match options.start_episode {
                Some(start) => u32::try_from(index)
                    .ok()
                    .and_then(|offset| start.checked_add(offset))
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "X".to_string()),
                None => episode_number(&file.name)
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "X".to_string()),
            };
            format!(
                r#"[maxbutton id="2" text="Episode {episode}" url="{}" ]"#,
                link(file)
            )
        })
        .collect();

    let body = format!(
        r#"<p style="text-align: center;">{}</p>"#,
        buttons.join(" ")
    );

    match videos.first() {
        Some(first) if options.title => {
            let header = season_header(first, videos);
            format!("{THICK_SEPARATOR}\n{header}\n{body}\n{THICK_SEPARATOR}\n")
        }
        _ => body,
    }
}

fn season_header(first: &FileEntry, videos: &[&FileEntry]) -> String {
    let stem: String = {
        let count = first.name.chars().count();
        first.name.chars().take(count.saturating_sub(4)).collect()
    };
    let season = EPISODE_IN_STEM.replace(&stem, "$1");

    let total: u64 = videos.iter().map(|f| f.size).sum();
    let average = human_readable_size(total as f64 / videos.len() as f64);

    format!(
        concat!(
            r#"<p style="text-align: center;"><span style="color: #000000;"><strong>{}"#,
            "\n",
            r#"[<span style="color: #ff0000;">{}/<span style="color: #0000ff;">E</span></span>]</strong></span></p>"#
        ),
        html_escape::encode_text(&season),
        average
    )
}

fn movie_code(videos: &[&FileEntry]) -> String {
    let mut out = String::new();

    for (index, file) in videos.iter().enumerate() {
        if index == 0 {
            out.push_str(THICK_SEPARATOR);
            out.push('\n');
        }

        let name = file.name.replacen(".mkv", "", 1);
        out.push_str(&format!(
            r#"<p style="text-align: center;"><strong><span style="color: #000000;">{}</span>"#,
            html_escape::encode_text(&name)
        ));
        out.push_str(&format!(
            concat!(
                "\n",
                r#"<span style="color: #000000;">[</span><span style="color: #ff0000;">{}</span><span style="color: #000000;">]</span></strong></p>"#
            ),
            human_readable_size(file.size as f64)
        ));
        out.push_str(&format!(
            concat!(
                "\n",
                r#"<p style="text-align: center;">[maxbutton id="1" url="{}" ]</p>"#
            ),
            link(file)
        ));
        out.push('\n');
        out.push_str(if index == videos.len() - 1 {
            THICK_SEPARATOR
        } else {
            THIN_SEPARATOR
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(name: &str, size: u64) -> FileEntry {
        FileEntry {
            id: name.to_string(),
            name: name.to_string(),
            size,
            mime_type: "video/x-matroska".to_string(),
            web_content_link: Some(format!("https://dl/{name}")),
        }
    }

    #[test]
    fn series_buttons_sorted_by_name() {
        let files = vec![
            video("Dark.S01E02.mkv", 1),
            FileEntry {
                mime_type: "text/plain".to_string(),
                ..video("notes.txt", 1)
            },
            video("Dark.S01E01.mkv", 1),
        ];

        let code = embed_code(&files, EmbedKind::Series, &EmbedOptions::default());

        assert_eq!(
            code,
            concat!(
                r#"<p style="text-align: center;">"#,
                r#"[maxbutton id="2" text="Episode 1" url="https://dl/Dark.S01E01.mkv" ] "#,
                r#"[maxbutton id="2" text="Episode 2" url="https://dl/Dark.S01E02.mkv" ]"#,
                "</p>"
            )
        );
    }

    #[test]
    fn series_numbering_from_start_episode() {
        let files = vec![video("a.mkv", 1), video("b.mkv", 1)];
        let options = EmbedOptions {
            title: false,
            start_episode: Some(9),
        };

        let code = embed_code(&files, EmbedKind::Series, &options);

        assert!(code.contains(r#"text="Episode 9" url="https://dl/a.mkv""#));
        assert!(code.contains(r#"text="Episode 10" url="https://dl/b.mkv""#));
    }

    #[test]
    fn series_numbering_past_u32_uses_placeholder() {
        let files = vec![video("a.mkv", 1), video("b.mkv", 1)];
        let options = EmbedOptions {
            title: false,
            start_episode: Some(u32::MAX),
        };

        let code = embed_code(&files, EmbedKind::Series, &options);

        assert!(code.contains(&format!(r#"text="Episode {}" url="https://dl/a.mkv""#, u32::MAX)));
        assert!(code.contains(r#"text="Episode X" url="https://dl/b.mkv""#));
    }

    #[test]
    fn series_without_episode_code_uses_placeholder() {
        let code = embed_code(
            &[video("Extras.mkv", 1)],
            EmbedKind::Series,
            &EmbedOptions::default(),
        );
        assert!(code.contains(r#"text="Episode X""#));
    }

    #[test]
    fn series_title_header() {
        let files = vec![
            video("Dark S01E01 1080p.mkv", 1024),
            video("Dark S01E02 1080p.mkv", 3072),
        ];
        let options = EmbedOptions {
            title: true,
            start_episode: None,
        };

        let code = embed_code(&files, EmbedKind::Series, &options);

        assert!(code.starts_with(THICK_SEPARATOR));
        assert!(code.ends_with(&format!("{THICK_SEPARATOR}\n")));
        assert!(code.contains("<strong>Dark S01 1080p\n"));
        assert!(code.contains(r#"<span style="color: #ff0000;">2.00 KB/"#));
    }

    #[test]
    fn series_title_skipped_without_videos() {
        let options = EmbedOptions {
            title: true,
            start_episode: None,
        };
        assert_eq!(
            embed_code(&[], EmbedKind::Series, &options),
            r#"<p style="text-align: center;"></p>"#
        );
    }

    #[test]
    fn movie_blocks_largest_first() {
        let files = vec![video("Film.720p.mkv", 1024), video("Film.1080p.mkv", 2048)];

        let code = embed_code(&files, EmbedKind::Movie, &EmbedOptions::default());

        let big = code.find("Film.1080p</span>").unwrap();
        let small = code.find("Film.720p</span>").unwrap();
        assert!(big < small);
        assert!(code.starts_with(THICK_SEPARATOR));
        assert!(code.ends_with(THICK_SEPARATOR));
        assert_eq!(code.matches(THIN_SEPARATOR).count(), 1);
        assert!(code.contains(r#"[maxbutton id="1" url="https://dl/Film.1080p.mkv" ]"#));
        assert!(code.contains(r#"<span style="color: #ff0000;">2.00 KB</span>"#));
    }

    #[test]
    fn movie_names_are_escaped() {
        let code = embed_code(
            &[video("Tom & Jerry.mkv", 1)],
            EmbedKind::Movie,
            &EmbedOptions::default(),
        );
        assert!(code.contains("Tom &amp; Jerry</span>"));
    }

    #[test]
    fn movie_without_videos_is_empty() {
        assert_eq!(embed_code(&[], EmbedKind::Movie, &EmbedOptions::default()), "");
    }
}
