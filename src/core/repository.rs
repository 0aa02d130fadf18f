//! Note repository: CRUD, listing, tag counts, export and hybrid search over
//! a [`NoteStore`].
//!
//! Callers construct one explicitly and share it (it is `Send + Sync`).
//! Validation happens before the store is touched, and `NotFound` is checked
//! before every update or delete.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use uuid::Uuid;

use super::error::{NoteError, NoteResult};
use super::note::{NewNote, Note, NoteUpdate};
use super::schema::{self, SchemaViolation};
use super::tags::{count_tags, TagCounts, TAG_SCAN_LIMIT};
use crate::search::engine::{SearchEngine, SearchRequest, SearchResults};
use crate::search::store::{NoteFilter, NoteStore, ScanOrder};
use crate::search::vectordb::VectorDB;

/// Maximum number of notes returned by `export`
pub const EXPORT_LIMIT: usize = 10_000;

pub const EXPORT_FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize)]
pub struct Export {
    pub version: String,
    pub exported_at: i64,
    pub notes: Vec<Note>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub status: String,
    pub database: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embeddings: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_indexed: Option<i64>,
}

/// Per-note locks serialising read-modify-write sequences on one id
///
/// An entry lives only while some caller holds or waits on it.
#[derive(Default)]
struct IdLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl IdLocks {
    /// Run `f` while holding the lock for `id`
    fn with_lock<T>(&self, id: &str, f: impl FnOnce() -> T) -> T {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.entry(id.to_string()).or_default().clone()
        };

        let result = {
            let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
            f()
        };

        self.release(id, &lock);
        result
    }

    fn release(&self, id: &str, lock: &Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        // Only the map and this caller still reference it
        if Arc::strong_count(lock) == 2 {
            locks.remove(id);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Repository over the shipped SQLite store
pub type Notebook = NoteRepository<VectorDB>;

pub struct NoteRepository<S: NoteStore> {
    store: S,
    engine: SearchEngine,
    locks: IdLocks,
    clock: fn() -> i64,
}

impl NoteRepository<VectorDB> {
    /// Open (creating if absent) the SQLite-backed repository at `db_path`
    pub fn open(db_path: &Path) -> NoteResult<Self> {
        let store = VectorDB::open(db_path)
            .map_err(|e| NoteError::store("Failed to open database", e))?;
        log::info!("Opened note database at {}", db_path.display());
        Ok(Self::new(store))
    }

    pub fn in_memory() -> NoteResult<Self> {
        let store = VectorDB::open_in_memory()
            .map_err(|e| NoteError::store("Failed to open database", e))?;
        Ok(Self::new(store))
    }
}

impl<S: NoteStore> NoteRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            engine: SearchEngine::default(),
            locks: IdLocks::default(),
            clock: now,
        }
    }

    /// Replace the timestamp source
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub fn create(&self, input: NewNote) -> NoteResult<Note> {
        let title = input.title.unwrap_or_default();

        let mut violations = Vec::new();
        schema::check_title(&title, &mut violations);
        schema::check_content(&input.content, &mut violations);
        schema::check_tags(&input.tags, &mut violations);
        reject(violations)?;

        let now = (self.clock)();
        let note = Note {
            id: Uuid::new_v4().to_string(),
            title,
            content: input.content,
            tags: input.tags,
            created_at: now,
            updated_at: now,
        };

        self.store
            .put(&note.to_stored())
            .map_err(|e| NoteError::store("Failed to create note", e))?;

        log::info!("Created note {}", note.id);
        Ok(note)
    }

    pub fn get(&self, id: &str) -> NoteResult<Note> {
        self.find(id, "Failed to get note")?
            .ok_or_else(|| NoteError::NotFound(id.to_string()))
    }

    /// Notes ordered by `updated_at` descending, optionally restricted to a tag
    pub fn list(&self, tag: Option<&str>, limit: Option<usize>) -> NoteResult<Vec<Note>> {
        let mut violations = Vec::new();
        let limit = schema::resolve_limit(
            limit,
            schema::DEFAULT_LIST_LIMIT,
            schema::MAX_LIST_LIMIT,
            &mut violations,
        );
        reject(violations)?;

        let notes = self
            .store
            .scan(&NoteFilter::tag(tag), ScanOrder::Recent, limit)
            .map_err(|e| NoteError::store("Failed to list notes", e))?;

        Ok(notes.into_iter().map(Note::from).collect())
    }

    /// Apply a partial update; omitted fields keep their stored values
    pub fn update(&self, id: &str, changes: NoteUpdate) -> NoteResult<Note> {
        let mut violations = Vec::new();
        if let Some(title) = &changes.title {
            schema::check_title(title, &mut violations);
        }
        if let Some(content) = &changes.content {
            schema::check_content(content, &mut violations);
        }
        if let Some(tags) = &changes.tags {
            schema::check_tags(tags, &mut violations);
        }
        reject(violations)?;

        self.locks.with_lock(id, || {
            let existing = self
                .find(id, "Failed to update note")?
                .ok_or_else(|| NoteError::NotFound(id.to_string()))?;

            // Timestamps are whole seconds; keep updated_at strictly increasing
            let updated_at = (self.clock)().max(existing.updated_at + 1);

            let note = Note {
                id: existing.id,
                title: changes.title.unwrap_or(existing.title),
                content: changes.content.unwrap_or(existing.content),
                tags: changes.tags.unwrap_or(existing.tags),
                created_at: existing.created_at,
                updated_at,
            };

            self.store
                .put(&note.to_stored())
                .map_err(|e| NoteError::store("Failed to update note", e))?;

            log::info!("Updated note {}", note.id);
            Ok(note)
        })
    }

    pub fn delete(&self, id: &str) -> NoteResult<()> {
        self.locks.with_lock(id, || {
            if self.find(id, "Failed to delete note")?.is_none() {
                return Err(NoteError::NotFound(id.to_string()));
            }

            self.store
                .delete_by_ids(&[id.to_string()])
                .map_err(|e| NoteError::store("Failed to delete note", e))?;

            log::info!("Deleted note {}", id);
            Ok(())
        })
    }

    /// Dump up to [`EXPORT_LIMIT`] notes, in no particular order
    pub fn export(&self) -> NoteResult<Export> {
        let notes: Vec<Note> = self
            .store
            .scan(&NoteFilter::any(), ScanOrder::Insertion, EXPORT_LIMIT)
            .map_err(|e| NoteError::store("Export failed", e))?
            .into_iter()
            .map(Note::from)
            .collect();

        Ok(Export {
            version: EXPORT_FORMAT_VERSION.to_string(),
            exported_at: (self.clock)(),
            total: notes.len(),
            notes,
        })
    }

    /// Tag frequencies over at most [`TAG_SCAN_LIMIT`] notes
    ///
    /// Counts are approximate when the collection is larger than the scan.
    pub fn tag_counts(&self) -> NoteResult<TagCounts> {
        let mut notes = self
            .store
            .scan(&NoteFilter::any(), ScanOrder::Insertion, TAG_SCAN_LIMIT + 1)
            .map_err(|e| NoteError::store("Failed to list tags", e))?;

        let approximate = notes.len() > TAG_SCAN_LIMIT;
        notes.truncate(TAG_SCAN_LIMIT);
        if approximate {
            log::warn!(
                "Tag counts cover only the first {} notes",
                TAG_SCAN_LIMIT
            );
        }

        Ok(TagCounts {
            tags: count_tags(notes.iter().map(|n| &n.metadata)),
            scanned: notes.len(),
            approximate,
        })
    }

    /// Hybrid keyword + semantic search
    pub fn search(&self, request: &SearchRequest) -> NoteResult<SearchResults> {
        let mut violations = Vec::new();
        if request.query.trim().is_empty() {
            violations.push(SchemaViolation::EmptyQuery);
        }
        let limit = schema::resolve_limit(
            request.limit,
            schema::DEFAULT_SEARCH_LIMIT,
            schema::MAX_SEARCH_LIMIT,
            &mut violations,
        );
        reject(violations)?;

        let filter = NoteFilter::tag(request.tag.as_deref());
        let results = self
            .engine
            .search(&self.store, &request.query, &filter, limit)
            .map_err(NoteError::search)?;

        Ok(SearchResults {
            query: request.query.clone(),
            total: results.len(),
            results,
        })
    }

    pub fn health(&self) -> Health {
        let version = env!("CARGO_PKG_VERSION").to_string();
        match self.store.stats() {
            Ok(stats) => Health {
                status: "healthy".to_string(),
                database: "connected".to_string(),
                version,
                notes: Some(stats.note_count),
                embeddings: Some(stats.embedding_count),
                last_indexed: stats.last_indexed,
            },
            Err(e) => Health {
                status: "degraded".to_string(),
                database: format!("error: {:#}", e),
                version,
                notes: None,
                embeddings: None,
                last_indexed: None,
            },
        }
    }

    fn find(&self, id: &str, context: &str) -> NoteResult<Option<Note>> {
        let found = self
            .store
            .get_by_ids(&[id.to_string()])
            .map_err(|e| NoteError::store(context, e))?;
        Ok(found.into_iter().next().map(Note::from))
    }
}

fn reject(violations: Vec<SchemaViolation>) -> NoteResult<()> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(NoteError::Validation(violations))
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use std::thread;

    use crate::core::note::NoteMetadata;
    use crate::search::store::{StoreStats, StoredNote};

    fn fixed_clock() -> i64 {
        1_704_067_200
    }

    fn repo() -> NoteRepository<VectorDB> {
        Notebook::in_memory().unwrap().with_clock(fixed_clock)
    }

    fn tags(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("t{}", i)).collect()
    }

    #[test]
    fn test_create_sets_fields() {
        let repo = repo();
        let note = repo
            .create(NewNote::new("Pasta with garlic").title("Recipe").tags(["food"]))
            .unwrap();

        assert!(Uuid::parse_str(&note.id).is_ok());
        assert_eq!(note.title, "Recipe");
        assert_eq!(note.created_at, fixed_clock());
        assert_eq!(note.created_at, note.updated_at);
        assert_eq!(repo.get(&note.id).unwrap(), note);
    }

    #[test]
    fn test_absent_title_is_empty_string() {
        let repo = repo();
        let note = repo.create(NewNote::new("no title here")).unwrap();
        assert_eq!(repo.get(&note.id).unwrap().title, "");
    }

    #[test]
    fn test_tag_bound() {
        let repo = repo();

        let err = repo.create(NewNote::new("x").tags(tags(21))).unwrap_err();
        assert!(matches!(err, NoteError::Validation(_)));
        assert!(repo.list(None, None).unwrap().is_empty());

        let note = repo.create(NewNote::new("x").tags(tags(20))).unwrap();

        let err = repo
            .update(&note.id, NoteUpdate { tags: Some(tags(21)), ..Default::default() })
            .unwrap_err();
        assert!(matches!(err, NoteError::Validation(_)));

        let updated = repo
            .update(&note.id, NoteUpdate { tags: Some(tags(20)), ..Default::default() })
            .unwrap();
        assert_eq!(updated.tags.len(), 20);
    }

    #[test]
    fn test_oversized_fields_rejected() {
        let repo = repo();
        let err = repo
            .create(NewNote::new("c".repeat(100_001)).title("t".repeat(201)))
            .unwrap_err();
        match err {
            NoteError::Validation(v) => assert_eq!(v.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_not_found() {
        let repo = repo();
        assert!(matches!(repo.get("nope"), Err(NoteError::NotFound(_))));
        assert!(matches!(
            repo.update("nope", NoteUpdate::default()),
            Err(NoteError::NotFound(_))
        ));
        assert!(matches!(repo.delete("nope"), Err(NoteError::NotFound(_))));
        // update must not have created it
        assert!(repo.list(None, None).unwrap().is_empty());
    }

    #[test]
    fn test_timestamps_across_updates() {
        let repo = repo();
        let note = repo.create(NewNote::new("v0")).unwrap();

        let mut last = note.updated_at;
        for i in 1..5 {
            let updated = repo
                .update(&note.id, NoteUpdate { content: Some(format!("v{}", i)), ..Default::default() })
                .unwrap();
            assert_eq!(updated.created_at, note.created_at);
            assert!(updated.updated_at > last);
            last = updated.updated_at;

            let read = repo.get(&note.id).unwrap();
            assert_eq!(read.created_at, note.created_at);
            assert_eq!(read.updated_at, last);
        }
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let repo = repo();
        let note = repo
            .create(NewNote::new("Pasta with garlic").title("Recipe").tags(["food"]))
            .unwrap();

        let updated = repo
            .update(&note.id, NoteUpdate { content: Some("Pasta with lemon".into()), ..Default::default() })
            .unwrap();
        assert_eq!(updated.title, "Recipe");
        assert_eq!(updated.tags, vec!["food"]);

        let updated = repo
            .update(&note.id, NoteUpdate { title: Some("Dinner".into()), ..Default::default() })
            .unwrap();
        assert_eq!(updated.content, "Pasta with lemon");
        assert_eq!(repo.get(&note.id).unwrap(), updated);

        // Clearing the title stores the bare content
        let updated = repo
            .update(&note.id, NoteUpdate { title: Some(String::new()), ..Default::default() })
            .unwrap();
        assert_eq!(updated.title, "");
        assert_eq!(repo.get(&note.id).unwrap().content, "Pasta with lemon");
    }

    #[test]
    fn test_list_order_filter_and_limit() {
        let repo = Notebook::in_memory().unwrap();
        let a = repo.create(NewNote::new("a").tags(["x"])).unwrap();
        let b = repo.create(NewNote::new("b")).unwrap();
        let c = repo.create(NewNote::new("c").tags(["x"])).unwrap();
        // Touching a makes it the most recent
        repo.update(&a.id, NoteUpdate { content: Some("a2".into()), ..Default::default() })
            .unwrap();

        let all = repo.list(None, None).unwrap();
        assert_eq!(all[0].id, a.id);
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].updated_at >= w[1].updated_at));

        let tagged: Vec<String> = repo.list(Some("x"), None).unwrap().into_iter().map(|n| n.id).collect();
        assert_eq!(tagged.len(), 2);
        assert!(tagged.contains(&c.id) && !tagged.contains(&b.id));

        assert_eq!(repo.list(None, Some(1)).unwrap().len(), 1);
        assert!(matches!(repo.list(None, Some(501)), Err(NoteError::Validation(_))));
        assert!(matches!(repo.list(None, Some(0)), Err(NoteError::Validation(_))));
    }

    #[test]
    fn test_tag_counts() {
        let repo = repo();
        repo.create(NewNote::new("1").tags(["work", "rust"])).unwrap();
        repo.create(NewNote::new("2").tags(["life"])).unwrap();
        repo.create(NewNote::new("3").tags(["rust", "life"])).unwrap();

        let counts = repo.tag_counts().unwrap();
        assert!(!counts.approximate);
        assert_eq!(counts.scanned, 3);
        let names: Vec<&str> = counts.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["rust", "life", "work"]);
    }

    #[test]
    fn test_tag_counts_flag_approximate_past_scan_cap() {
        let repo = repo();
        for i in 0..=TAG_SCAN_LIMIT {
            repo.create(NewNote::new(format!("note {}", i)).tags(["bulk"])).unwrap();
        }

        let counts = repo.tag_counts().unwrap();
        assert!(counts.approximate);
        assert_eq!(counts.scanned, TAG_SCAN_LIMIT);
        assert_eq!(counts.tags[0].count, TAG_SCAN_LIMIT);
    }

    #[test]
    fn test_end_to_end() {
        let repo = repo();
        let note = repo
            .create(NewNote::new("Pasta with garlic").title("Recipe").tags(["food"]))
            .unwrap();

        let listed = repo.list(Some("food"), None).unwrap();
        assert_eq!(listed, vec![note.clone()]);

        let found = repo.search(&SearchRequest::new("garlic")).unwrap();
        assert_eq!(found.total, 1);
        assert_eq!(found.results[0].note.id, note.id);
        assert!(found.results[0].score.is_some());

        let filtered = repo
            .search(&SearchRequest::new("pasta").tag("other"))
            .unwrap();
        assert!(filtered.results.is_empty());

        repo.delete(&note.id).unwrap();
        assert!(matches!(repo.get(&note.id), Err(NoteError::NotFound(_))));
    }

    #[test]
    fn test_search_validation() {
        let repo = repo();
        assert!(matches!(
            repo.search(&SearchRequest::new("   ")),
            Err(NoteError::Validation(_))
        ));
        assert!(matches!(
            repo.search(&SearchRequest::new("x").limit(101)),
            Err(NoteError::Validation(_))
        ));
        assert!(repo.search(&SearchRequest::new("x").limit(100)).is_ok());
    }

    #[test]
    fn test_search_limit_defaults_to_one() {
        let repo = repo();
        repo.create(NewNote::new("garlic soup")).unwrap();
        repo.create(NewNote::new("garlic bread")).unwrap();

        assert_eq!(repo.search(&SearchRequest::new("garlic")).unwrap().total, 1);
        assert_eq!(repo.search(&SearchRequest::new("garlic").limit(5)).unwrap().total, 2);
    }

    #[test]
    fn test_export_cap() {
        let repo = repo();
        for i in 0..=EXPORT_LIMIT {
            repo.create(NewNote::new(format!("n{}", i))).unwrap();
        }

        let export = repo.export().unwrap();
        assert_eq!(export.total, EXPORT_LIMIT);
        assert_eq!(export.notes.len(), EXPORT_LIMIT);
        assert_eq!(export.version, "1.0");
    }

    #[test]
    fn test_concurrent_partial_updates_do_not_lose_fields() {
        let repo = Arc::new(repo());
        let note = repo.create(NewNote::new("body").title("Title")).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let repo = Arc::clone(&repo);
                let id = note.id.clone();
                thread::spawn(move || {
                    let changes = if i % 2 == 0 {
                        NoteUpdate { tags: Some(vec![format!("t{}", i)]), ..Default::default() }
                    } else {
                        NoteUpdate { content: Some(format!("body {}", i)), ..Default::default() }
                    };
                    repo.update(&id, changes).unwrap()
                })
            })
            .collect();

        let mut stamps: Vec<i64> = handles.into_iter().map(|h| h.join().unwrap().updated_at).collect();
        stamps.sort();
        stamps.dedup();
        // Every update observed the previous one
        assert_eq!(stamps.len(), 8);

        let final_note = repo.get(&note.id).unwrap();
        assert_eq!(final_note.title, "Title");
        assert_eq!(final_note.tags.len(), 1);
        assert!(final_note.content.starts_with("body "));
        assert_eq!(repo.locks.len(), 0);
    }

    struct BrokenStore;

    impl NoteStore for BrokenStore {
        fn put(&self, _note: &StoredNote) -> Result<()> {
            Err(anyhow!("disk full"))
        }
        fn get_by_ids(&self, _ids: &[String]) -> Result<Vec<StoredNote>> {
            Err(anyhow!("io error"))
        }
        fn delete_by_ids(&self, _ids: &[String]) -> Result<usize> {
            Err(anyhow!("io error"))
        }
        fn scan(&self, _f: &NoteFilter, _o: ScanOrder, _l: usize) -> Result<Vec<StoredNote>> {
            Err(anyhow!("io error"))
        }
        fn query(&self, _f: &NoteFilter, _n: &str, _l: usize) -> Result<Vec<String>> {
            Err(anyhow!("fts unavailable"))
        }
        fn knn(&self, _q: &str, _f: &NoteFilter, _k: usize) -> Result<Vec<(String, f32)>> {
            Ok(Vec::new())
        }
        fn stats(&self) -> Result<StoreStats> {
            Err(anyhow!("locked"))
        }
    }

    #[test]
    fn test_store_failures_are_typed() {
        let repo = NoteRepository::new(BrokenStore);

        let err = repo.create(NewNote::new("x")).unwrap_err();
        assert!(matches!(err, NoteError::Store(_)));
        assert_eq!(err.to_string(), "Failed to create note: disk full");

        assert!(matches!(repo.get("id"), Err(NoteError::Store(_))));
        assert!(matches!(repo.export(), Err(NoteError::Store(_))));
        assert!(matches!(repo.tag_counts(), Err(NoteError::Store(_))));

        let err = repo.search(&SearchRequest::new("q")).unwrap_err();
        assert!(matches!(err, NoteError::Search(_)));
        assert!(err.to_string().contains("fts unavailable"));

        let health = repo.health();
        assert_eq!(health.status, "degraded");
        assert!(health.notes.is_none());
    }

    /// SQLite store with switchable faults on the search path
    struct FlakyStore {
        db: VectorDB,
        withheld: Option<String>,
        fail_knn: bool,
        fail_fetch: bool,
    }

    impl FlakyStore {
        fn seeded(docs: &[(&str, &str)]) -> Self {
            let db = VectorDB::open_in_memory().unwrap();
            for (i, (id, document)) in docs.iter().enumerate() {
                db.put(&StoredNote {
                    id: id.to_string(),
                    document: document.to_string(),
                    metadata: NoteMetadata {
                        tags: vec![],
                        created_at: i as i64,
                        updated_at: i as i64,
                    },
                })
                .unwrap();
            }
            Self {
                db,
                withheld: None,
                fail_knn: false,
                fail_fetch: false,
            }
        }
    }

    impl NoteStore for FlakyStore {
        fn put(&self, note: &StoredNote) -> Result<()> {
            self.db.put(note)
        }
        fn get_by_ids(&self, ids: &[String]) -> Result<Vec<StoredNote>> {
            if self.fail_fetch {
                return Err(anyhow!("connection reset"));
            }
            let mut found = self.db.get_by_ids(ids)?;
            found.retain(|n| Some(&n.id) != self.withheld.as_ref());
            Ok(found)
        }
        fn delete_by_ids(&self, ids: &[String]) -> Result<usize> {
            self.db.delete_by_ids(ids)
        }
        fn scan(&self, f: &NoteFilter, o: ScanOrder, l: usize) -> Result<Vec<StoredNote>> {
            self.db.scan(f, o, l)
        }
        fn query(&self, f: &NoteFilter, n: &str, l: usize) -> Result<Vec<String>> {
            self.db.query(f, n, l)
        }
        fn knn(&self, q: &str, f: &NoteFilter, k: usize) -> Result<Vec<(String, f32)>> {
            if self.fail_knn {
                return Err(anyhow!("index offline"));
            }
            self.db.knn(q, f, k)
        }
        fn stats(&self) -> Result<StoreStats> {
            self.db.stats()
        }
    }

    #[test]
    fn test_search_skips_notes_gone_before_refetch() {
        let mut store = FlakyStore::seeded(&[("a", "garlic soup"), ("b", "garlic bread")]);
        store.withheld = Some("b".to_string());
        let repo = NoteRepository::new(store);

        let found = repo.search(&SearchRequest::new("garlic").limit(10)).unwrap();
        assert_eq!(found.total, 1);
        assert_eq!(found.results.len(), 1);
        assert_eq!(found.results[0].note.id, "a");
        assert!(found.results[0].score.is_some());
    }

    #[test]
    fn test_semantic_failure_is_search_error() {
        let mut store = FlakyStore::seeded(&[("a", "garlic soup")]);
        store.fail_knn = true;
        let repo = NoteRepository::new(store);

        let err = repo.search(&SearchRequest::new("garlic")).unwrap_err();
        assert!(matches!(err, NoteError::Search(_)));
        assert_eq!(err.code(), "SEARCH_ERROR");
        assert!(err.to_string().contains("index offline"));
    }

    #[test]
    fn test_refetch_failure_is_search_error() {
        let mut store = FlakyStore::seeded(&[("a", "garlic soup")]);
        store.fail_fetch = true;
        let repo = NoteRepository::new(store);

        let err = repo.search(&SearchRequest::new("garlic")).unwrap_err();
        assert!(matches!(err, NoteError::Search(_)));
        assert!(err.to_string().contains("Failed to load matched notes"));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_health() {
        let repo = repo();
        repo.create(NewNote::new("x")).unwrap();
        let health = repo.health();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.notes, Some(1));
        assert_eq!(health.embeddings, Some(1));
        assert!(health.last_indexed.is_some());
    }

    #[test]
    fn test_lock_entries_released_after_use() {
        let repo = repo();
        for i in 0..1000 {
            let missing = format!("missing-{}", i);
            assert!(matches!(
                repo.update(&missing, NoteUpdate::default()),
                Err(NoteError::NotFound(_))
            ));
            assert!(matches!(repo.delete(&missing), Err(NoteError::NotFound(_))));
        }
        assert_eq!(repo.locks.len(), 0);

        let note = repo.create(NewNote::new("body")).unwrap();
        repo.update(&note.id, NoteUpdate { content: Some("edited".into()), ..Default::default() })
            .unwrap();
        assert_eq!(repo.locks.len(), 0);

        repo.delete(&note.id).unwrap();
        assert_eq!(repo.locks.len(), 0);
    }

    #[test]
    fn test_lock_entry_released_when_store_fails() {
        let repo = NoteRepository::new(BrokenStore);
        assert!(matches!(
            repo.update("id", NoteUpdate::default()),
            Err(NoteError::Store(_))
        ));
        assert!(matches!(repo.delete("id"), Err(NoteError::Store(_))));
        assert_eq!(repo.locks.len(), 0);
    }
}
