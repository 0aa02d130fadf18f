use thiserror::Error;

use super::schema::SchemaViolation;

/// Errors surfaced by the note repository
///
/// Store internals report `anyhow` errors; they are flattened into
/// `Store`/`Search` messages at the repository boundary.
#[derive(Debug, Error)]
pub enum NoteError {
    #[error("Invalid input: {}", join_violations(.0))]
    Validation(Vec<SchemaViolation>),

    #[error("Note with ID '{0}' not found")]
    NotFound(String),

    #[error("Search failed: {0}")]
    Search(String),

    #[error("{0}")]
    Store(String),
}

impl NoteError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOTE_NOT_FOUND",
            Self::Search(_) => "SEARCH_ERROR",
            Self::Store(_) => "DATABASE_ERROR",
        }
    }

    pub(crate) fn store(context: &str, err: anyhow::Error) -> Self {
        Self::Store(format!("{}: {:#}", context, err))
    }

    pub(crate) fn search(err: anyhow::Error) -> Self {
        Self::Search(format!("{:#}", err))
    }
}

fn join_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type NoteResult<T> = std::result::Result<T, NoteError>;
