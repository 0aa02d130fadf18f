//! Retrieval and ranking
//!
//! - `store`: backing store contract (substring query, k-NN, CRUD)
//! - `vectordb`: SQLite implementation of the store
//! - `embedding`: text embeddings used by the store's k-NN
//! - `fusion`: Reciprocal Rank Fusion
//! - `engine`: hybrid search over a store

pub mod embedding;
pub mod engine;
pub mod fusion;
pub mod store;
pub mod vectordb;

pub use embedding::{Embedder, EmbeddingModel};
pub use engine::{SearchEngine, SearchHit, SearchRequest, SearchResults};
pub use store::{NoteFilter, NoteStore, ScanOrder, StoredNote};
pub use vectordb::VectorDB;
