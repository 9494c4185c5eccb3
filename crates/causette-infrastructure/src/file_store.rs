//! File-backed key-value store with atomic writes.
//!
//! Persists the store's keys as a single JSON object file. The backend is
//! best-effort: every failure is swallowed and logged, reads degrade to
//! `None`. A corrupt or unreadable file is treated as an empty store.

use causette_core::StoreBackend;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A [`StoreBackend`] over one JSON file.
///
/// Updates are all-or-nothing via tmp file + fsync + atomic rename, so a
/// crash mid-write leaves the previous state intact.
pub struct FileStoreBackend {
    path: PathBuf,
    map: Mutex<BTreeMap<String, String>>,
}

impl FileStoreBackend {
    /// Opens (or initializes) the store at `path`.
    ///
    /// Never fails: a missing, unreadable or corrupt file yields an empty
    /// store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let map = Self::read_map(&path);
        Self {
            path,
            map: Mutex::new(map),
        }
    }

    fn read_map(path: &Path) -> BTreeMap<String, String> {
        if !path.exists() {
            return BTreeMap::new();
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "failed to read store file");
                return BTreeMap::new();
            }
        };

        match serde_json::from_str::<BTreeMap<String, JsonValue>>(&content) {
            Ok(raw) => raw
                .into_iter()
                .filter_map(|(key, value)| match value {
                    JsonValue::String(s) => Some((key, s)),
                    _ => None,
                })
                .collect(),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "store file corrupt, starting empty");
                BTreeMap::new()
            }
        }
    }

    /// Writes the full map to disk atomically. Failures are logged and
    /// swallowed; the in-memory state stays authoritative.
    fn persist(&self, map: &BTreeMap<String, String>) {
        if let Err(err) = self.try_persist(map) {
            tracing::warn!(path = %self.path.display(), %err, "failed to persist store file");
        }
    }

    fn try_persist(&self, map: &BTreeMap<String, String>) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(map).map_err(std::io::Error::other)?;

        // Write to a temporary file in the same directory, then rename.
        let tmp_path = self.path.with_extension("json.tmp");
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(json.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl StoreBackend for FileStoreBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.map.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut map = self.map.lock().unwrap();
        map.insert(key.to_string(), value.to_string());
        self.persist(&map);
    }

    fn remove(&self, key: &str) {
        let mut map = self.map.lock().unwrap();
        if map.remove(key).is_some() {
            self.persist(&map);
        }
    }
}
