// src/checkpoint.rs
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::file::ensure_parent;

/// Next listing page to fetch. Persisted as `{"next_page": N}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub next_page: u32,
}

impl Checkpoint {
    pub fn new(next_page: u32) -> Self {
        Self { next_page }
    }

    /// The checkpoint after `page` has been written. Saturates at `u32::MAX`.
    pub fn after(page: u32) -> Self {
        Self { next_page: page.saturating_add(1) }
    }
}

pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored checkpoint, or `None` when absent. An unreadable or invalid file
    /// is logged and treated as absent.
    pub fn load(&self) -> Option<Checkpoint> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                logw!("Could not read checkpoint {}: {e}", self.path.display());
                return None;
            }
        };
        match serde_json::from_str::<Checkpoint>(&text) {
            Ok(cp) if cp.next_page >= 1 => Some(cp),
            Ok(cp) => {
                logw!("Ignoring checkpoint {} with next_page={}", self.path.display(), cp.next_page);
                None
            }
            Err(e) => {
                logw!("Could not parse checkpoint {}: {e}", self.path.display());
                None
            }
        }
    }

    /// Write to a temp file beside the target, fsync, then rename over it.
    pub fn save(&self, cp: Checkpoint) -> io::Result<()> {
        ensure_parent(&self.path)?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let json = serde_json::to_string_pretty(&cp).map_err(io::Error::other)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        logd!("checkpoint -> next_page={}", cp.next_page);
        Ok(())
    }
}
