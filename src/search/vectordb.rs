//! Note store on SQLite
//!
//! Stores the encoded blob, JSON metadata and an embedding per note.
//! Substring matching runs in SQL; nearest-neighbour search is an exact
//! cosine scan in Rust, which is fine for a personal-sized collection.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, bail, Context, Result};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::embedding::{cosine_distance, Embedder, EmbeddingModel};
use super::store::{NoteFilter, NoteStore, ScanOrder, StoreStats, StoredNote};
use crate::core::note::NoteMetadata;

/// Matches rows whose tag array contains `?1`, or all rows when `?1` is NULL
const TAG_PREDICATE: &str =
    "(?1 IS NULL OR EXISTS (SELECT 1 FROM json_each(n.tags) WHERE json_each.value = ?1))";

const NOTE_COLUMNS: &str = "n.id, n.document, n.tags, n.created_at, n.updated_at";

pub struct VectorDB {
    conn: Mutex<Connection>,
    embedder: Box<dyn Embedder>,
}

impl VectorDB {
    /// Open or create the database at `db_path`, creating parent directories
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database {}", db_path.display()))?;
        Self::with_embedder(conn, Box::new(EmbeddingModel::new()))
    }

    /// Open in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::with_embedder(Connection::open_in_memory()?, Box::new(EmbeddingModel::new()))
    }

    pub fn with_embedder(conn: Connection, embedder: Box<dyn Embedder>) -> Result<Self> {
        let db = Self {
            conn: Mutex::new(conn),
            embedder,
        };
        db.init_schema()?;
        Ok(db)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))
    }

    fn init_schema(&self) -> Result<()> {
        self.conn()?.execute_batch(
            r#"
            -- Encoded note blob + metadata
            CREATE TABLE IF NOT EXISTS notes (
                id TEXT PRIMARY KEY,
                document TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]',  -- JSON array
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                indexed_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS embeddings (
                note_id TEXT PRIMARY KEY,
                embedding BLOB NOT NULL,
                FOREIGN KEY (note_id) REFERENCES notes(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS index_meta (
                key TEXT PRIMARY KEY,
                value TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_notes_updated ON notes(updated_at);
            "#,
        )?;

        let dim = self.embedder.dimension().to_string();
        match self.get_meta("embedding_dim")? {
            Some(stored) if stored != dim => bail!(
                "Index was built with {}-dimensional embeddings, embedder produces {}",
                stored,
                dim
            ),
            Some(_) => {}
            None => self.set_meta("embedding_dim", &dim)?,
        }

        Ok(())
    }

    pub fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO index_meta (key, value) VALUES (?1, ?2) ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn get_meta(&self, key: &str) -> Result<Option<String>> {
        self.conn()?
            .query_row(
                "SELECT value FROM index_meta WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| e.into())
    }
}

impl NoteStore for VectorDB {
    fn put(&self, note: &StoredNote) -> Result<()> {
        let tags_json = serde_json::to_string(&note.metadata.tags)?;
        let embedding_blob = embedding_to_blob(&self.embedder.embed(&note.document));
        let now = chrono::Utc::now().timestamp();

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO notes (id, document, tags, created_at, updated_at, indexed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                document = excluded.document,
                tags = excluded.tags,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at,
                indexed_at = excluded.indexed_at
            "#,
            params![
                note.id,
                note.document,
                tags_json,
                note.metadata.created_at,
                note.metadata.updated_at,
                now,
            ],
        )?;

        tx.execute(
            r#"
            INSERT INTO embeddings (note_id, embedding)
            VALUES (?1, ?2)
            ON CONFLICT(note_id) DO UPDATE SET embedding = excluded.embedding
            "#,
            params![note.id, embedding_blob],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn get_by_ids(&self, ids: &[String]) -> Result<Vec<StoredNote>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM notes n WHERE n.id = ?1",
            NOTE_COLUMNS
        ))?;

        let mut notes = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(note) = stmt.query_row(params![id], note_from_row).optional()? {
                notes.push(note);
            }
        }
        Ok(notes)
    }

    fn delete_by_ids(&self, ids: &[String]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let mut deleted = 0;
        for id in ids {
            tx.execute("DELETE FROM embeddings WHERE note_id = ?1", params![id])?;
            deleted += tx.execute("DELETE FROM notes WHERE id = ?1", params![id])?;
        }

        tx.commit()?;
        Ok(deleted)
    }

    fn scan(&self, filter: &NoteFilter, order: ScanOrder, limit: usize) -> Result<Vec<StoredNote>> {
        let order_by = match order {
            ScanOrder::Recent => "n.updated_at DESC, n.id",
            ScanOrder::Insertion => "n.rowid",
        };

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM notes n WHERE {} ORDER BY {} LIMIT ?2",
            NOTE_COLUMNS, TAG_PREDICATE, order_by
        ))?;

        let rows = stmt.query_map(params![filter.tag, limit as i64], note_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read notes")
    }

    fn query(&self, filter: &NoteFilter, needle: &str, limit: usize) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT n.id FROM notes n
            WHERE {} AND instr(lower(n.document), lower(?2)) > 0
            ORDER BY n.updated_at DESC, n.id
            LIMIT ?3
            "#,
            TAG_PREDICATE
        ))?;

        let rows = stmt.query_map(params![filter.tag, needle, limit as i64], |row| row.get(0))?;
        rows.collect::<rusqlite::Result<Vec<String>>>()
            .context("Keyword query failed")
    }

    fn knn(&self, query_text: &str, filter: &NoteFilter, k: usize) -> Result<Vec<(String, f32)>> {
        let query_embedding = self.embedder.embed(query_text);

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT n.id, e.embedding
            FROM notes n
            JOIN embeddings e ON n.id = e.note_id
            WHERE {}
            "#,
            TAG_PREDICATE
        ))?;

        let rows = stmt.query_map(params![filter.tag], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Vec<u8>>(1)?))
        })?;

        let mut results: Vec<(String, f32)> = Vec::new();
        for row in rows {
            let (id, blob) = row?;
            let distance = cosine_distance(&query_embedding, &blob_to_embedding(&blob));
            results.push((id, distance));
        }

        // Nearest first; ids break ties so the order is stable across calls
        results.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        results.truncate(k);

        Ok(results)
    }

    fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn()?;

        let note_count: i64 = conn.query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))?;
        let embedding_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM embeddings", [], |row| row.get(0))?;
        let last_indexed: Option<i64> =
            conn.query_row("SELECT MAX(indexed_at) FROM notes", [], |row| row.get(0))?;

        Ok(StoreStats {
            note_count: note_count as usize,
            embedding_count: embedding_count as usize,
            last_indexed,
        })
    }
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<StoredNote> {
    let tags_json: String = row.get(2)?;
    let tags: Vec<String> = serde_json::from_str(&tags_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

    Ok(StoredNote {
        id: row.get(0)?,
        document: row.get(1)?,
        metadata: NoteMetadata {
            tags,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        },
    })
}

fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn blob_to_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}
