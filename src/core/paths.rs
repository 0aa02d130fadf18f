use std::path::{Path, PathBuf};

pub const DATA_DIR: &str = ".smart-notes";
pub const DB_FILE: &str = "notes.db";
pub const DB_ENV: &str = "SMART_NOTES_DB";

/// Default on-disk locations, resolved relative to a root directory
pub struct DataPaths {
    pub root: PathBuf,
    pub data: PathBuf,
    pub db: PathBuf,
}

impl DataPaths {
    pub fn new() -> Self {
        let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::from_root(root)
    }

    pub fn from_root(root: PathBuf) -> Self {
        let data = root.join(DATA_DIR);
        Self {
            db: data.join(DB_FILE),
            data,
            root,
        }
    }

    /// Use an explicit database path if given, else the default one
    pub fn resolve_db(explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(path) => path.to_path_buf(),
            None => Self::new().db,
        }
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::new()
    }
}
