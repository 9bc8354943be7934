// ── Persisted selection ──
//
// A small key-value seam so the in-progress beverage survives restarts.
// The store saves one JSON value under its store name.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::model::Temperature;

/// Synchronous key-value storage for small JSON values.
pub trait KeyValueStore: Send + Sync + 'static {
    fn load(&self, key: &str) -> Result<Option<Value>, CoreError>;
    fn save(&self, key: &str, value: Value) -> Result<(), CoreError>;
}

/// The selection fields that survive a restart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedSelection {
    pub beverage_name: String,
    pub current_temp: Option<Temperature>,
}

impl PersistedSelection {
    pub(crate) fn load(kv: &dyn KeyValueStore, key: &str) -> Result<Option<Self>, CoreError> {
        let Some(value) = kv.load(key)? else {
            return Ok(None);
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| persistence(format!("invalid saved selection under '{key}': {e}")))
    }

    pub(crate) fn save(&self, kv: &dyn KeyValueStore, key: &str) -> Result<(), CoreError> {
        let value = serde_json::to_value(self)
            .map_err(|e| persistence(format!("failed to encode selection: {e}")))?;
        kv.save(key, value)
    }
}

fn persistence(message: impl Into<String>) -> CoreError {
    CoreError::Persistence {
        message: message.into(),
    }
}

// ── JSON file ────────────────────────────────────────────────────────

/// All keys in one pretty-printed JSON object on disk.
///
/// Writes go to a sibling temp file first, then replace the original.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Arc<Mutex<()>>,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<serde_json::Map<String, Value>, CoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(serde_json::Map::new()),
            Err(e) => return Err(persistence(format!("{}: {e}", self.path.display()))),
        };

        if contents.trim().is_empty() {
            return Ok(serde_json::Map::new());
        }

        match serde_json::from_str(&contents) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(persistence(format!(
                "{}: expected a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(persistence(format!("{}: {e}", self.path.display()))),
        }
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn load(&self, key: &str) -> Result<Option<Value>, CoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_all()?.remove(key))
    }

    fn save(&self, key: &str, value: Value) -> Result<(), CoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut all = self.read_all()?;
        all.insert(key.to_owned(), value);

        let io_err = |e: std::io::Error| persistence(format!("{}: {e}", self.path.display()));
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let body = serde_json::to_string_pretty(&Value::Object(all))
            .map_err(|e| persistence(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, body).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }
}

// ── In memory ────────────────────────────────────────────────────────

/// Process-local store. Clones share contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    values: Arc<Mutex<HashMap<String, Value>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn load(&self, key: &str) -> Result<Option<Value>, CoreError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn save(&self, key: &str, value: Value) -> Result<(), CoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_owned(), value);
        Ok(())
    }
}
