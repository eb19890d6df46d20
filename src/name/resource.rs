// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Bounds for a bare Drive resource ID
const MIN_ID_LENGTH: usize = 10;
const MAX_ID_LENGTH: usize = 100;

static DRIVE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://drive\.google\.com/(?:drive(.*?)/folders/|file(.*?)?/d/)([-\w]+)")
        .expect("valid drive link pattern")
});

/// Check whether the input already looks like a bare Drive resource ID
pub fn is_resource_id(input: &str) -> bool {
    (MIN_ID_LENGTH..=MAX_ID_LENGTH).contains(&input.len())
        && input
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
}

/// Extract a Drive file or folder ID from a share link, an `?id=` URL or a bare ID
///
/// Returns `None` when the input is not a recognized resource reference.
pub fn extract_resource_id(url_or_id: &str) -> Option<String> {
    let input = url_or_id.trim();

    if is_resource_id(input) {
        return Some(input.to_string());
    }

    if (input.contains("folders") || input.contains("file"))
        && let Some(id) = DRIVE_LINK.captures(input).and_then(|caps| caps.get(3))
    {
        return Some(id.as_str().to_string());
    }

    let url = Url::parse(input).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "1AbC-dEf_GhIjKlMnOp";

    #[test]
    fn bare_id_is_returned_unchanged() {
        assert_eq!(extract_resource_id(ID).as_deref(), Some(ID));
    }

    #[test]
    fn bare_id_length_bounds() {
        assert!(is_resource_id(&"a".repeat(10)));
        assert!(is_resource_id(&"a".repeat(100)));
        assert!(!is_resource_id(&"a".repeat(9)));
        assert!(!is_resource_id(&"a".repeat(101)));
    }

    #[test]
    fn folder_link() {
        let url = format!("https://drive.google.com/drive/folders/{ID}");
        assert_eq!(extract_resource_id(&url).as_deref(), Some(ID));
    }

    #[test]
    fn folder_link_with_user_segment() {
        let url = format!("https://drive.google.com/drive/u/0/folders/{ID}?usp=sharing");
        assert_eq!(extract_resource_id(&url).as_deref(), Some(ID));
    }

    #[test]
    fn file_view_link() {
        let url = format!("https://drive.google.com/file/d/{ID}/view");
        assert_eq!(extract_resource_id(&url).as_deref(), Some(ID));
    }

    #[test]
    fn id_query_parameter() {
        let url = format!("https://x/y?id={ID}");
        assert_eq!(extract_resource_id(&url).as_deref(), Some(ID));
    }

    #[test]
    fn open_link_with_id_parameter() {
        let url = format!("https://drive.google.com/open?id={ID}&authuser=0");
        assert_eq!(extract_resource_id(&url).as_deref(), Some(ID));
    }

    #[test]
    fn garbage_returns_none() {
        assert_eq!(extract_resource_id("not a drive link!"), None);
        assert_eq!(extract_resource_id(""), None);
        assert_eq!(extract_resource_id("https://example.com/page"), None);
    }
}
