//! Draw Record Store
//!
//! In-memory ordered collection of historical draws backed by a JSON
//! snapshot file. The store works at whole-data-set granularity only:
//! `replace` swaps the entire sequence and persists it, there are no
//! partial updates. A missing or corrupt snapshot reads as "no data",
//! never as a fatal error.

use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use crate::domain::DrawRecord;
use crate::error::Result;

pub struct DrawStore {
    snapshot_path: PathBuf,
    records: RwLock<Vec<DrawRecord>>,
}

impl DrawStore {
    /// Create a store over the given snapshot path. No I/O happens here;
    /// the first `history()` call pulls the snapshot in.
    pub fn new<P: AsRef<Path>>(snapshot_path: P) -> Self {
        Self {
            snapshot_path: snapshot_path.as_ref().to_path_buf(),
            records: RwLock::new(Vec::new()),
        }
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, Vec<DrawRecord>> {
        self.records.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, Vec<DrawRecord>> {
        self.records.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Read the persisted snapshot. Missing or unparseable files yield an
    /// empty sequence.
    pub fn load(&self) -> Vec<DrawRecord> {
        match std::fs::read_to_string(&self.snapshot_path) {
            Ok(contents) => match serde_json::from_str::<Vec<DrawRecord>>(&contents) {
                Ok(records) => {
                    debug!(
                        count = records.len(),
                        path = %self.snapshot_path.display(),
                        "loaded draw snapshot"
                    );
                    records
                }
                Err(e) => {
                    warn!(error = %e, path = %self.snapshot_path.display(), "snapshot unreadable; treating as no data");
                    Vec::new()
                }
            },
            Err(e) => {
                debug!(error = %e, path = %self.snapshot_path.display(), "no snapshot file; treating as no data");
                Vec::new()
            }
        }
    }

    /// Current in-memory records, falling back to the snapshot when memory
    /// is empty (first access after startup). Returns an owned copy so the
    /// backtest can run without holding the lock.
    pub fn history(&self) -> Vec<DrawRecord> {
        {
            let records = self.read_guard();
            if !records.is_empty() {
                return records.clone();
            }
        }

        let loaded = self.load();
        if !loaded.is_empty() {
            let mut records = self.write_guard();
            // Another request may have raced us here; last writer wins,
            // matching the store's replace semantics.
            *records = loaded.clone();
            info!(count = loaded.len(), "initialized draw store from snapshot");
        }
        loaded
    }

    /// Swap the in-memory sequence and persist it. The snapshot write goes
    /// through a temp file and rename so a crash mid-write leaves the old
    /// snapshot intact; on a failed write the in-memory sequence is left
    /// unchanged. Concurrent callers serialize on the write lock and the
    /// last one wins wholesale.
    pub fn replace(&self, records: Vec<DrawRecord>) -> Result<()> {
        let mut guard = self.write_guard();
        self.persist(&records)?;
        *guard = records;
        info!(count = guard.len(), "replaced draw store contents");
        Ok(())
    }

    fn persist(&self, records: &[DrawRecord]) -> Result<()> {
        if let Some(parent) = self.snapshot_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let payload = serde_json::to_vec_pretty(records)?;
        let tmp_path = self.snapshot_path.with_extension("json.tmp");
        std::fs::write(&tmp_path, payload)?;
        std::fs::rename(&tmp_path, &self.snapshot_path)?;
        debug!(
            count = records.len(),
            path = %self.snapshot_path.display(),
            "persisted draw snapshot"
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.read_guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_guard().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, numbers: Vec<u8>, extra: u8) -> DrawRecord {
        DrawRecord {
            draw_date: date.parse().unwrap(),
            numbers,
            extra_number: extra,
            draw_no: "24/001".to_string(),
        }
    }

    #[test]
    fn test_missing_snapshot_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = DrawStore::new(dir.path().join("none.json"));
        assert!(store.load().is_empty());
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_corrupt_snapshot_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = DrawStore::new(&path);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_replace_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = DrawStore::new(dir.path().join("draws.json"));
        let records = vec![
            record("2024-01-02", vec![1, 2, 3, 4, 5, 6], 7),
            record("2024-01-05", vec![10, 20, 30, 40, 41, 42], 11),
        ];
        store.replace(records.clone()).unwrap();

        // Fresh store over the same path sees the persisted data by value.
        let reopened = DrawStore::new(dir.path().join("draws.json"));
        assert_eq!(reopened.load(), records);
        assert_eq!(store.history(), records);
    }

    #[test]
    fn test_replace_is_whole_data_set() {
        let dir = tempfile::tempdir().unwrap();
        let store = DrawStore::new(dir.path().join("draws.json"));
        store
            .replace(vec![record("2024-01-02", vec![1, 2, 3, 4, 5, 6], 7)])
            .unwrap();
        store
            .replace(vec![record("2024-02-02", vec![7, 8, 9, 10, 11, 12], 13)])
            .unwrap();
        let history = store.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].draw_date.to_string(), "2024-02-02");
    }

    #[test]
    fn test_concurrent_replace_is_last_writer_wins() {
        use std::sync::Arc;

        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(DrawStore::new(dir.path().join("draws.json")));

        let mut handles = Vec::new();
        for extra in 1..=8u8 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                store
                    .replace(vec![record("2024-01-02", vec![1, 2, 3, 4, 5, 6], extra)])
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        // No merged state: exactly one writer's data set survives intact.
        let history = store.history();
        assert_eq!(history.len(), 1);
        assert!((1..=8).contains(&history[0].extra_number));
    }
}
