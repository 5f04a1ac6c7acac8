//! Append-only JSON-lines journal.
//!
//! Every accepted record is appended as one line and flushed before the
//! store makes it visible. On startup the journal is replayed to rebuild the
//! in-memory indexes.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::store::types::StoreResult;

pub struct Journal {
    path: PathBuf,
    file: Mutex<File>,
}

impl Journal {
    /// Open (or create) a journal and return its existing entries.
    ///
    /// A malformed final line is treated as a torn write and ignored; a
    /// malformed line anywhere else is an error.
    pub fn open<T: DeserializeOwned>(path: impl AsRef<Path>) -> StoreResult<(Self, Vec<T>)> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut entries = Vec::new();
        let mut valid_len = None;
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let lines: Vec<&str> = content.split_inclusive('\n').collect();
            let last = lines.len().saturating_sub(1);
            let mut offset = 0u64;
            for (i, line) in lines.iter().enumerate() {
                if !line.trim().is_empty() {
                    match serde_json::from_str(line.trim_end()) {
                        Ok(entry) => entries.push(entry),
                        Err(e) if i == last => {
                            tracing::warn!(path = %path.display(), error = %e, "Dropping torn journal tail");
                            valid_len = Some(offset);
                            break;
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                offset += line.len() as u64;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        if let Some(len) = valid_len {
            file.set_len(len)?;
        }
        tracing::info!(path = %path.display(), entries = entries.len(), "Journal opened");

        Ok((
            Self {
                path,
                file: Mutex::new(file),
            },
            entries,
        ))
    }

    /// Append one entry and flush it to the OS.
    pub fn append<T: Serialize>(&self, entry: &T) -> StoreResult<()> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let mut file = self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        file.write_all(&line)?;
        file.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for Journal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Journal").field("path", &self.path).finish()
    }
}
