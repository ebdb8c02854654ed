//! File-backed JSON caches — wholesale load and save, age-based invalidation.
//!
//! Each cache is one JSON object file: human-readable and safe to delete at
//! any time. A missing, stale, or unparsable file just means an empty cache;
//! cache errors never abort the run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use serde_json::Value;

/// A named, file-backed mapping from string keys to JSON values.
///
/// Workers share one instance behind an `Arc`; the inner map is guarded by
/// its own lock so concurrent inserts from parallel batches stay safe.
pub struct FileCache {
    path: PathBuf,
    name: String,
    entries: Mutex<HashMap<String, Value>>,
}

impl FileCache {
    /// Open a cache, loading its backing file if present and fresh.
    ///
    /// With `max_age_days = Some(n)`, a file whose age exceeds `n` whole
    /// days is discarded without reading its content.
    pub fn open(path: &Path, name: &str, max_age_days: Option<u64>) -> Self {
        let entries = load_entries(path, name, max_age_days);
        if !entries.is_empty() {
            tracing::info!("cache '{name}' loaded from {} with {} entries", path.display(), entries.len());
        }
        Self {
            path: path.to_path_buf(),
            name: name.to_string(),
            entries: Mutex::new(entries),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: Value) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Persist the whole map, overwriting the backing file. Best-effort:
    /// failures are logged and the run continues.
    pub fn save(&self) {
        let json = match self.entries.lock() {
            Ok(entries) => match serde_json::to_string(&*entries) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("failed to serialize cache '{}': {e}", self.name);
                    return;
                }
            },
            Err(_) => return,
        };
        match std::fs::write(&self.path, json) {
            Ok(()) => tracing::info!(
                "cache '{}' saved to {} with {} entries",
                self.name,
                self.path.display(),
                self.len()
            ),
            Err(e) => tracing::error!("failed to save cache '{}' to {}: {e}", self.name, self.path.display()),
        }
    }
}

fn load_entries(path: &Path, name: &str, max_age_days: Option<u64>) -> HashMap<String, Value> {
    if !path.exists() {
        return HashMap::new();
    }
    if let Some(max_days) = max_age_days
        && let Some(age) = file_age(path)
        && is_stale(age, max_days)
    {
        tracing::info!("cache '{name}' is older than {max_days} day(s), discarding");
        return HashMap::new();
    }
    match std::fs::read_to_string(path) {
        Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
            tracing::error!("failed to parse cache '{name}' from {}: {e}", path.display());
            HashMap::new()
        }),
        Err(e) => {
            tracing::error!("failed to read cache '{name}' from {}: {e}", path.display());
            HashMap::new()
        }
    }
}

fn file_age(path: &Path) -> Option<Duration> {
    let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok()?;
    SystemTime::now().duration_since(modified).ok()
}

/// Whole-day comparison: a cache is stale once its age exceeds the
/// threshold by at least one full day.
fn is_stale(age: Duration, max_age_days: u64) -> bool {
    age.as_secs() / 86_400 > max_age_days
}
