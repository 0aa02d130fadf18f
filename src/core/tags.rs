//! Tag frequency counting over note metadata
//!
//! There is no persistent tag index: tag filters are pushed down to the store
//! as `tags contains X` predicates, and counts come from a bounded scan.

use std::collections::HashMap;

use serde::Serialize;

use super::note::NoteMetadata;

/// Maximum number of notes inspected by a tag count
pub const TAG_SCAN_LIMIT: usize = 1_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagCounts {
    pub tags: Vec<TagCount>,
    /// Notes whose metadata was inspected
    pub scanned: usize,
    /// Set when more notes exist than were scanned
    pub approximate: bool,
}

/// Aggregate tag frequencies
///
/// Sorted by count descending; equal counts keep first-seen order.
pub fn count_tags<'a, I>(metadata: I) -> Vec<TagCount>
where
    I: IntoIterator<Item = &'a NoteMetadata>,
{
    let mut counts: Vec<TagCount> = Vec::new();
    let mut position: HashMap<&str, usize> = HashMap::new();

    for meta in metadata {
        for tag in &meta.tags {
            match position.get(tag.as_str()) {
                Some(&i) => counts[i].count += 1,
                None => {
                    position.insert(tag.as_str(), counts.len());
                    counts.push(TagCount {
                        name: tag.clone(),
                        count: 1,
                    });
                }
            }
        }
    }

    // stable
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}
