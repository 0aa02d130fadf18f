//! Reciprocal Rank Fusion
//!
//! Merges independently ranked candidate lists using only rank positions, so
//! the keyword and semantic scores never need calibrating against each other.

use std::collections::{HashMap, HashSet};

/// Damping constant `k` in `1 / (k + rank)`
pub const RRF_K: f64 = 60.0;

#[derive(Debug, Clone, PartialEq)]
pub struct FusedCandidate {
    pub id: String,
    pub score: f64,
}

/// Fuse ranked id lists, best first, keeping at most `limit` candidates
///
/// A candidate at 1-indexed rank `r` of a list contributes `1 / (k + r)`.
/// Only the first occurrence of an id within one list counts. Equal scores
/// keep first-seen order, walking `lists` in the order given.
pub fn reciprocal_rank_fusion(lists: &[&[String]], k: f64, limit: usize) -> Vec<FusedCandidate> {
    let mut fused: Vec<FusedCandidate> = Vec::new();
    let mut position: HashMap<&str, usize> = HashMap::new();

    for list in lists {
        let mut seen_in_list: HashSet<&str> = HashSet::with_capacity(list.len());
        for (rank, id) in list.iter().enumerate() {
            if !seen_in_list.insert(id.as_str()) {
                continue;
            }
            let contribution = 1.0 / (k + rank as f64 + 1.0);
            match position.get(id.as_str()) {
                Some(&i) => fused[i].score += contribution,
                None => {
                    position.insert(id.as_str(), fused.len());
                    fused.push(FusedCandidate {
                        id: id.clone(),
                        score: contribution,
                    });
                }
            }
        }
    }

    // sort_by is stable, which gives the first-seen tie-break
    fused.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    fused.truncate(limit);
    fused
}
