//! Backing store contract consumed by the repository and search engine

use anyhow::Result;
use serde::Serialize;

use crate::core::note::NoteMetadata;

/// What the store persists per note: encoded blob plus metadata
#[derive(Debug, Clone, PartialEq)]
pub struct StoredNote {
    pub id: String,
    pub document: String,
    pub metadata: NoteMetadata,
}

/// Metadata predicate pushed down to the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteFilter {
    pub tag: Option<String>,
}

impl NoteFilter {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn tag(tag: Option<&str>) -> Self {
        Self {
            tag: tag.map(String::from),
        }
    }
}

/// Row order for `NoteStore::scan`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOrder {
    /// Most recently updated first
    Recent,
    /// Order the notes were first stored
    Insertion,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub note_count: usize,
    pub embedding_count: usize,
    pub last_indexed: Option<i64>,
}

/// Document + vector store capabilities
pub trait NoteStore: Send + Sync {
    /// Insert or replace a note (blob, metadata and embedding)
    fn put(&self, note: &StoredNote) -> Result<()>;

    /// Fetch notes by id; unknown ids are skipped
    fn get_by_ids(&self, ids: &[String]) -> Result<Vec<StoredNote>>;

    /// Remove notes by id, returning how many existed
    fn delete_by_ids(&self, ids: &[String]) -> Result<usize>;

    fn scan(&self, filter: &NoteFilter, order: ScanOrder, limit: usize) -> Result<Vec<StoredNote>>;

    /// Ids of notes whose blob contains `needle`, best first
    fn query(&self, filter: &NoteFilter, needle: &str, limit: usize) -> Result<Vec<String>>;

    /// `(id, distance)` of the `k` nearest notes to `query_text`, nearest first
    fn knn(&self, query_text: &str, filter: &NoteFilter, k: usize) -> Result<Vec<(String, f32)>>;

    fn stats(&self) -> Result<StoreStats>;
}
