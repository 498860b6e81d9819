//! File-backed ledger.
//!
//! The whole key/value state is kept in memory and written out as one
//! MessagePack snapshot on [`Ledger::sync`] and [`Ledger::commit`]. Writes go
//! to a temporary file in the same directory which is then renamed over the
//! target, so a crash leaves either the old or the new snapshot on disk.
//!
//! A commit stages the write set on a copy of the state and only replaces the
//! served state once the new snapshot is in place. A failed commit changes
//! neither the file nor what readers see.

use super::{Ledger, MemoryLedger, StateIter, WriteSet};
use crate::core::{DbError, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
struct LedgerSnapshot {
    version: u32,
    state: BTreeMap<String, Vec<u8>>,
}

// Same layout as `LedgerSnapshot`, borrowing the state being written.
#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    state: &'a BTreeMap<String, Vec<u8>>,
}

pub struct FileLedger {
    path: PathBuf,
    inner: MemoryLedger,
    dirty: bool,
}

impl FileLedger {
    /// Open the snapshot at `path`, starting empty if the file does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let inner = if path.exists() {
            let data = fs::read(&path)
                .map_err(|e| DbError::IoError(format!("Failed to read ledger {}: {}", path.display(), e)))?;
            let snapshot: LedgerSnapshot = rmp_serde::from_slice(&data)?;
            if snapshot.version != SNAPSHOT_VERSION {
                return Err(DbError::Codec(format!(
                    "Unsupported ledger snapshot version {} (expected {})",
                    snapshot.version, SNAPSHOT_VERSION
                )));
            }
            debug!("Loaded {} ledger entries from {}", snapshot.state.len(), path.display());
            MemoryLedger::from_state(snapshot.state)
        } else {
            MemoryLedger::new()
        };

        Ok(Self {
            path,
            inner,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn write_snapshot(&self, state: &BTreeMap<String, Vec<u8>>) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)
            .map_err(|e| DbError::IoError(format!("Failed to create ledger directory: {}", e)))?;

        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            state,
        };
        let serialized = rmp_serde::to_vec(&snapshot)?;

        let mut temp = NamedTempFile::new_in(&dir)
            .map_err(|e| DbError::IoError(format!("Failed to create temporary ledger file: {}", e)))?;
        temp.write_all(&serialized)
            .map_err(|e| DbError::IoError(format!("Failed to write ledger: {}", e)))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| DbError::IoError(format!("Failed to sync ledger: {}", e)))?;
        temp.persist(&self.path)
            .map_err(|e| DbError::IoError(format!("Failed to replace ledger: {}", e)))?;
        Ok(())
    }
}

impl Ledger for FileLedger {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner.get_state(key)
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        self.dirty = true;
        self.inner.put_state(key, value)
    }

    fn range_scan<'a>(&'a self, start: &str, end: &str) -> Result<StateIter<'a>> {
        self.inner.range_scan(start, end)
    }

    fn sync(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        self.write_snapshot(self.inner.state())?;
        self.dirty = false;
        debug!("Synced {} ledger entries to {}", self.inner.len(), self.path.display());
        Ok(())
    }

    fn commit(&mut self, writes: WriteSet) -> Result<()> {
        if writes.is_empty() {
            return self.sync();
        }

        let tx_id = writes.tx_id();
        let count = writes.len();
        let mut staged = self.inner.clone();
        writes.apply(&mut staged)?;
        self.write_snapshot(staged.state())?;

        self.inner = staged;
        self.dirty = false;
        debug!(
            "Committed {} writes of transaction {} to {}",
            count,
            tx_id,
            self.path.display()
        );
        Ok(())
    }
}
