use kitty_domain::setting::{validate_hour, KeyValueStorage, LocalSettings};
use kitty_domain::DomainError;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

use super::{load_or_default, persist};

pub const SETTING_KEY: &str = "setting";

/// Local preferences: refresh hour, system proxy flag and local port
pub struct SettingStore {
    storage: Arc<dyn KeyValueStorage>,
    state: RwLock<LocalSettings>,
}

impl SettingStore {
    pub fn load(storage: Arc<dyn KeyValueStorage>) -> Result<Self, DomainError> {
        let mut state: LocalSettings = load_or_default(storage.as_ref(), SETTING_KEY)?;
        if validate_hour(state.auto_update).is_err() {
            let fallback = LocalSettings::default().auto_update;
            warn!(
                stored = state.auto_update,
                fallback, "Stored auto-update hour out of range, using default"
            );
            state.auto_update = fallback;
        }
        Ok(Self {
            storage,
            state: RwLock::new(state),
        })
    }

    pub fn get(&self) -> LocalSettings {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn auto_update(&self) -> u32 {
        self.get().auto_update
    }

    /// Apply `change` and write the result through to storage.
    ///
    /// The in-memory value is only replaced once the write succeeded.
    pub fn update(
        &self,
        change: impl FnOnce(&mut LocalSettings),
    ) -> Result<LocalSettings, DomainError> {
        let mut state = self
            .state
            .write()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let mut next = *state;
        change(&mut next);
        persist(self.storage.as_ref(), SETTING_KEY, &next)?;
        *state = next;
        debug!(?next, "Settings saved");
        Ok(next)
    }

    pub fn set_auto_update(&self, hour: u32) -> Result<LocalSettings, DomainError> {
        let hour = validate_hour(hour)?;
        self.update(|s| s.auto_update = hour)
    }

    pub fn set_sysproxy_flag(&self, enabled: bool) -> Result<LocalSettings, DomainError> {
        self.update(|s| s.sysproxy_flag = enabled)
    }
}
