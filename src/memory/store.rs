// Memory persistence. The engine talks to a small store trait so tests can
// swap the backing file out; the default is a JSON document on disk.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::memory::state::MemoryState;

/// Load/save port for the memory document. Load failures are recovered by
/// starting from a fresh state; save failures surface to the caller.
pub trait MemoryStore: Send {
    fn load(&self) -> Option<MemoryState>;
    fn save(&self, state: &MemoryState) -> Result<()>;
}

/// JSON file store, one document per file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Default memory location: GOLDENDOG_MEMORY_PATH if set, otherwise
    /// ~/.goldendog/memory.json.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("GOLDENDOG_MEMORY_PATH") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        Path::new(&home).join(".goldendog").join("memory.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MemoryStore for FileStore {
    fn load(&self) -> Option<MemoryState> {
        if !self.path.exists() {
            debug!("No memory file at {:?}, starting fresh", self.path);
            return None;
        }
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read memory file {:?}: {}", self.path, e);
                return None;
            }
        };
        match serde_json::from_str::<MemoryState>(&contents) {
            Ok(state) => {
                debug!(
                    "Loaded memory: {} outcomes, {} feedbacks",
                    state.outcomes.len(),
                    state.feedbacks.len()
                );
                Some(state)
            }
            Err(e) => {
                warn!(
                    "Memory file {:?} is corrupt ({}), starting fresh",
                    self.path, e
                );
                None
            }
        }
    }

    fn save(&self, state: &MemoryState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create memory directory {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(state).context("Failed to serialize memory")?;

        // Write to temp file first, then rename (atomic on the same filesystem)
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, json)
            .with_context(|| format!("Failed to write memory file {:?}", temp_path))?;
        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to move memory file to {:?}", self.path))?;
        Ok(())
    }
}
