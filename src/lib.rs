//! smart-notes library
//!
//! Short text notes with hybrid keyword + semantic retrieval.
//!
//! # Modules
//!
//! - `core`: Note model, document codec, validation, tag counts, repository
//! - `search`: Store contract, SQLite vector store, RRF fusion, hybrid search

pub mod core;
pub mod search;

// Re-exports for convenience
pub use crate::core::error::{NoteError, NoteResult};
pub use crate::core::note::{NewNote, Note, NoteUpdate};
pub use crate::core::paths::DataPaths;
pub use crate::core::repository::{Export, Health, NoteRepository, Notebook};
pub use crate::core::tags::{TagCount, TagCounts};
pub use search::{SearchHit, SearchRequest, SearchResults};
