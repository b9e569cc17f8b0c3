use kitty_domain::setting::KeyValueStorage;
use kitty_domain::DomainError;
use serde_json::{Map, Value};
use std::sync::RwLock;

/// Non-persistent storage for tests and throwaway contexts
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    entries: RwLock<Map<String, Value>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for InMemoryStorage {
    fn load(&self, key: &str) -> Result<Option<Value>, DomainError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: Value) -> Result<(), DomainError> {
        self.entries
            .write()
            .map_err(|e| DomainError::Storage(e.to_string()))?
            .insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DomainError> {
        self.entries
            .write()
            .map_err(|e| DomainError::Storage(e.to_string()))?
            .remove(key);
        Ok(())
    }
}
