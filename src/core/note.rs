use serde::{Deserialize, Serialize};

use super::codec;
use crate::search::store::StoredNote;

/// A decoded note as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Metadata record persisted next to the encoded blob
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteMetadata {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

/// Input for `NoteRepository::create`
#[derive(Debug, Clone, Default)]
pub struct NewNote {
    pub title: Option<String>,
    pub content: String,
    pub tags: Vec<String>,
}

/// Input for `NoteRepository::update`; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl NewNote {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

impl NoteUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.tags.is_none()
    }
}

impl Note {
    pub fn document(&self) -> String {
        codec::encode(&self.title, &self.content)
    }

    pub fn metadata(&self) -> NoteMetadata {
        NoteMetadata {
            tags: self.tags.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn to_stored(&self) -> StoredNote {
        StoredNote {
            id: self.id.clone(),
            document: self.document(),
            metadata: self.metadata(),
        }
    }
}

impl From<StoredNote> for Note {
    fn from(stored: StoredNote) -> Self {
        let (title, content) = codec::decode(&stored.document);
        Self {
            id: stored.id,
            title,
            content,
            tags: stored.metadata.tags,
            created_at: stored.metadata.created_at,
            updated_at: stored.metadata.updated_at,
        }
    }
}
