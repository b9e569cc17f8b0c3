use kitty_domain::setting::KeyValueStorage;
use kitty_domain::DomainError;
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, warn};

pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Key/value settings persisted as one JSON object.
///
/// The whole document is rewritten on every change. A missing or unreadable
/// file starts out empty.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    entries: RwLock<Map<String, Value>>,
}

impl JsonFileStorage {
    /// Open `settings.json` inside `data_dir`
    pub fn in_dir(data_dir: &Path) -> Result<Self, DomainError> {
        Self::open(data_dir.join(SETTINGS_FILE_NAME))
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                DomainError::Storage(format!(
                    "Failed to create settings directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let entries = Self::read_entries(&path)?;
        debug!(path = %path.display(), keys = entries.len(), "Settings file opened");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(path: &Path) -> Result<Map<String, Value>, DomainError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(DomainError::Storage(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(entries)) => Ok(entries),
            Ok(_) => {
                warn!(path = %path.display(), "Settings file is not a JSON object, using defaults");
                Ok(Map::new())
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Settings file is corrupt, using defaults");
                Ok(Map::new())
            }
        }
    }

    fn persist(&self, entries: &Map<String, Value>) -> Result<(), DomainError> {
        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| DomainError::Serialization(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)
            .and_then(|_| fs::rename(&tmp, &self.path))
            .map_err(|e| {
                DomainError::Storage(format!("Failed to write {}: {}", self.path.display(), e))
            })
    }
}

impl KeyValueStorage for JsonFileStorage {
    fn load(&self, key: &str) -> Result<Option<Value>, DomainError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: Value) -> Result<(), DomainError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        entries.insert(key.to_string(), value);
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), DomainError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::in_dir(dir.path()).unwrap();
        storage
            .save("setting", json!({"autoUpdate": 5, "port": 11080}))
            .unwrap();

        let reopened = JsonFileStorage::in_dir(dir.path()).unwrap();
        assert_eq!(
            reopened.load("setting").unwrap(),
            Some(json!({"autoUpdate": 5, "port": 11080}))
        );
        assert_eq!(reopened.load("proxy").unwrap(), None);
    }

    #[test]
    fn test_remove_persists() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::in_dir(dir.path()).unwrap();
        storage.save("proxy", json!({"currentProxy": "xray"})).unwrap();
        storage.remove("proxy").unwrap();
        storage.remove("never-set").unwrap();

        let reopened = JsonFileStorage::in_dir(dir.path()).unwrap();
        assert_eq!(reopened.load("proxy").unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, "{not json").unwrap();

        let storage = JsonFileStorage::open(&path).unwrap();
        assert_eq!(storage.load("setting").unwrap(), None);

        storage.save("setting", json!({"port": 1})).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"port\": 1"));
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let storage = JsonFileStorage::in_dir(&nested).unwrap();
        storage.save("k", json!(true)).unwrap();
        assert!(nested.join(SETTINGS_FILE_NAME).exists());
        assert_eq!(storage.path(), nested.join(SETTINGS_FILE_NAME));
    }
}
