//! Durable storage for the attribution token.
//!
//! The token lives outside the database, under a fixed key, so it survives
//! page navigation. Reads and writes are unsynchronized; last-writer-wins is
//! acceptable because at most one session drives a given submission.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Raw storage seam. The raw value is the serialized token JSON; parsing is
/// deferred to read time so a corrupt record can be treated as absent.
pub trait AttributionStore: Send + Sync {
    /// The stored raw record, if any.
    fn read_raw(&self) -> Option<String>;

    /// Overwrite the stored record unconditionally.
    fn write_raw(&self, raw: &str) -> io::Result<()>;
}

/// File-backed store under the platform data directory.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default platform location:
    /// `$APP_DATA/quotedesk/referral.json`.
    pub fn default_location() -> Option<Self> {
        let dir = dirs::data_dir()?.join("quotedesk");
        Some(Self::new(dir.join("referral.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AttributionStore for FileStore {
    fn read_raw(&self) -> Option<String> {
        std::fs::read_to_string(&self.path).ok()
    }

    fn write_raw(&self, raw: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, raw)
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryStore {
    value: Mutex<Option<String>>,
}

impl AttributionStore for MemoryStore {
    fn read_raw(&self) -> Option<String> {
        self.value.lock().unwrap().clone()
    }

    fn write_raw(&self, raw: &str) -> io::Result<()> {
        *self.value.lock().unwrap() = Some(raw.to_string());
        Ok(())
    }
}
