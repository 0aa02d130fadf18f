//! Hybrid search: keyword + semantic candidates fused with RRF

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Serialize;

use super::fusion::{reciprocal_rank_fusion, RRF_K};
use super::store::{NoteFilter, NoteStore};
use crate::core::note::Note;

/// Candidates requested from each retrieval method
pub const CANDIDATE_POOL: usize = 50;

#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: String,
    pub tag: Option<String>,
    pub limit: Option<usize>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A decoded note with its semantic relevance, when it had one
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub note: Note,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub results: Vec<SearchHit>,
    pub total: usize,
}

/// Ranked candidates from both retrieval methods, before fusion
#[derive(Debug, Default)]
pub struct Candidates {
    pub keyword: Vec<String>,
    pub semantic: Vec<(String, f32)>,
}

pub struct SearchEngine {
    pub keyword_candidates: usize,
    pub semantic_candidates: usize,
    pub rrf_k: f64,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self {
            keyword_candidates: CANDIDATE_POOL,
            semantic_candidates: CANDIDATE_POOL,
            rrf_k: RRF_K,
        }
    }
}

impl SearchEngine {
    /// Run the substring and nearest-neighbour queries
    pub fn retrieve<S: NoteStore + ?Sized>(
        &self,
        store: &S,
        query: &str,
        filter: &NoteFilter,
    ) -> Result<Candidates> {
        let keyword = store
            .query(filter, query, self.keyword_candidates)
            .context("Keyword query failed")?;
        let semantic = store
            .knn(query, filter, self.semantic_candidates)
            .context("Semantic query failed")?;

        log::debug!(
            "search {:?}: {} keyword / {} semantic candidates",
            query,
            keyword.len(),
            semantic.len()
        );

        Ok(Candidates { keyword, semantic })
    }

    /// Retrieve, fuse and decode the top `limit` notes for `query`
    pub fn search<S: NoteStore + ?Sized>(
        &self,
        store: &S,
        query: &str,
        filter: &NoteFilter,
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        let candidates = self.retrieve(store, query, filter)?;

        let semantic_ids: Vec<String> = candidates.semantic.iter().map(|(id, _)| id.clone()).collect();
        let fused = reciprocal_rank_fusion(
            &[&candidates.keyword[..], &semantic_ids[..]],
            self.rrf_k,
            limit,
        );

        // First occurrence wins, matching how fusion ranks duplicates
        let mut distances: HashMap<&str, f32> = HashMap::new();
        for (id, distance) in &candidates.semantic {
            distances.entry(id.as_str()).or_insert(*distance);
        }

        let ids: Vec<String> = fused.into_iter().map(|c| c.id).collect();
        let mut records: HashMap<String, Note> = store
            .get_by_ids(&ids)
            .context("Failed to load matched notes")?
            .into_iter()
            .map(|stored| (stored.id.clone(), Note::from(stored)))
            .collect();

        // Notes deleted since retrieval are dropped
        let hits = ids
            .iter()
            .filter_map(|id| {
                let note = records.remove(id)?;
                let score = distances.get(id.as_str()).map(|d| relevance(*d));
                Some(SearchHit { note, score })
            })
            .collect();

        Ok(hits)
    }
}

/// `1 / (1 + distance)` rounded to 4 decimals
pub fn relevance(distance: f32) -> f64 {
    let score = 1.0 / (1.0 + distance as f64);
    (score * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::note::NoteMetadata;
    use crate::search::store::StoredNote;
    use crate::search::vectordb::VectorDB;

    fn put(db: &VectorDB, id: &str, document: &str, tags: &[&str], updated_at: i64) -> Result<()> {
        db.put(&StoredNote {
            id: id.to_string(),
            document: document.to_string(),
            metadata: NoteMetadata {
                tags: tags.iter().map(|t| t.to_string()).collect(),
                created_at: updated_at,
                updated_at,
            },
        })
    }

    #[test]
    fn test_relevance_rounding() {
        assert_eq!(relevance(0.0), 1.0);
        assert_eq!(relevance(1.0), 0.5);
        assert_eq!(relevance(2.0), 0.3333);
        assert_eq!(relevance(0.25), 0.8);
    }

    #[test]
    fn test_keyword_and_semantic_candidates() -> Result<()> {
        let db = VectorDB::open_in_memory()?;
        put(&db, "a", "Recipe\n\nPasta with garlic", &["food"], 10)?;
        put(&db, "b", "Deploy checklist", &["work"], 20)?;

        let engine = SearchEngine::default();
        let candidates = engine.retrieve(&db, "garlic", &NoteFilter::any())?;
        assert_eq!(candidates.keyword, vec!["a"]);
        assert_eq!(candidates.semantic.len(), 2);
        assert_eq!(candidates.semantic[0].0, "a");
        Ok(())
    }

    #[test]
    fn test_search_decodes_and_scores() -> Result<()> {
        let db = VectorDB::open_in_memory()?;
        put(&db, "a", "Recipe\n\nPasta with garlic", &["food"], 10)?;
        put(&db, "b", "Deploy checklist", &["work"], 20)?;

        let hits = SearchEngine::default().search(&db, "garlic", &NoteFilter::any(), 5)?;
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].note.id, "a");
        assert_eq!(hits[0].note.title, "Recipe");
        assert_eq!(hits[0].note.content, "Pasta with garlic");
        assert!(hits.iter().all(|h| h.score.is_some()));

        let only_work = SearchEngine::default().search(&db, "garlic", &NoteFilter::tag(Some("work")), 5)?;
        assert_eq!(only_work.len(), 1);
        assert_eq!(only_work[0].note.id, "b");
        Ok(())
    }

    #[test]
    fn test_score_omitted_without_semantic_rank() -> Result<()> {
        let db = VectorDB::open_in_memory()?;
        put(&db, "a", "garlic", &[], 10)?;
        put(&db, "b", "garlic and more garlic", &[], 20)?;

        // No semantic candidates at all: keyword-only hits carry no score
        let engine = SearchEngine {
            semantic_candidates: 0,
            ..Default::default()
        };
        let hits = engine.search(&db, "garlic", &NoteFilter::any(), 10)?;
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].note.id, "b");
        assert!(hits.iter().all(|h| h.score.is_none()));
        Ok(())
    }

    #[test]
    fn test_hit_serializes_flat() -> Result<()> {
        let hit = SearchHit {
            note: Note {
                id: "n".to_string(),
                title: String::new(),
                content: "body".to_string(),
                tags: vec![],
                created_at: 1,
                updated_at: 2,
            },
            score: None,
        };
        let json = serde_json::to_value(&hit)?;
        assert_eq!(json["title"], "");
        assert!(json.get("score").is_none());
        Ok(())
    }
}
