//! In-memory template resolver.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::CodeResolver;

struct Entry {
    source: String,
    modified: SystemTime,
}

/// Thread-safe in-memory sources with a logical modification clock.
///
/// Every insert or [`touch`](Self::touch) advances the clock by one second,
/// so modification times are strictly increasing.
#[derive(Default)]
pub struct MemoryResolver {
    entries: RwLock<FxHashMap<String, Entry>>,
    clock: AtomicU64,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(self, name: &str, source: &str) -> Self {
        self.insert(name, source);
        self
    }

    /// Insert or replace a source, advancing its modification time.
    pub fn insert(&self, name: &str, source: &str) {
        let modified = self.tick();
        self.entries.write().insert(
            name.to_string(),
            Entry {
                source: source.to_string(),
                modified,
            },
        );
    }

    /// Advance the modification time of an existing source.
    ///
    /// Returns `false` if `name` does not exist.
    pub fn touch(&self, name: &str) -> bool {
        let modified = self.tick();
        match self.entries.write().get_mut(name) {
            Some(entry) => {
                entry.modified = modified;
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, name: &str) -> bool {
        self.entries.write().remove(name).is_some()
    }

    fn tick(&self) -> SystemTime {
        let seconds = self.clock.fetch_add(1, Ordering::SeqCst) + 1;
        UNIX_EPOCH + Duration::from_secs(seconds)
    }
}

impl CodeResolver for MemoryResolver {
    fn resolve(&self, name: &str) -> Option<String> {
        self.entries.read().get(name).map(|e| e.source.clone())
    }

    fn last_modified(&self, name: &str) -> Option<SystemTime> {
        self.entries.read().get(name).map(|e| e.modified)
    }

    fn resolve_all_template_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }
}
