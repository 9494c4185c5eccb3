//! In-memory store backend.

use causette_core::StoreBackend;
use std::collections::HashMap;
use std::sync::Mutex;

/// A [`StoreBackend`] held entirely in memory.
///
/// Used by tests and by embedders that do not want history to survive the
/// process.
#[derive(Default)]
pub struct MemoryStoreBackend {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStoreBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoreBackend for MemoryStoreBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.map.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.map
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.map.lock().unwrap().remove(key);
    }
}
