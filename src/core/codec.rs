//! Document codec: packs a note's title and body into the single text blob
//! the store indexes, and unpacks it again.
//!
//! Format: `"{title}\n\n{content}"` when the title is non-empty, otherwise the
//! bare content. Decoding splits on the first blank line, so a title-less
//! body that contains `"\n\n"` decodes as if its first paragraph were a title.

use lazy_static::lazy_static;
use regex::Regex;

const SEPARATOR: &str = "\n\n";

lazy_static! {
    static ref HEADING_MARKERS_RE: Regex = Regex::new(r"^#+").unwrap();
}

/// Pack title and content into one blob
pub fn encode(title: &str, content: &str) -> String {
    if title.is_empty() {
        content.to_string()
    } else {
        format!("{}{}{}", title, SEPARATOR, content)
    }
}

/// Unpack a blob into `(title, content)`
///
/// Never fails: a blob without a blank line is all content.
pub fn decode(blob: &str) -> (String, String) {
    match blob.split_once(SEPARATOR) {
        Some((title, content)) => (clean_title(title), content.to_string()),
        None => (String::new(), blob.to_string()),
    }
}

/// Strip markdown heading markers (`# Title` -> `Title`)
fn clean_title(raw: &str) -> String {
    if raw.starts_with('#') {
        HEADING_MARKERS_RE.replace(raw, "").trim().to_string()
    } else {
        raw.to_string()
    }
}
